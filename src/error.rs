use std::time::Duration;

use thiserror::Error;

/// Failure captured for a single request.
///
/// Errors are recorded per execution unit and routed to the caller's
/// exception handler; they never abort the surrounding batch or stream.
/// Non-2xx statuses are not errors at this layer: if the transport produced
/// a response, the request succeeded.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Anything the transport raised: connect failures, DNS errors, broken
    /// connections, unparsable URLs, body-read failures.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The per-request deadline elapsed before a response arrived.
    #[error("request timed out after {:.2}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// A header name stored on the descriptor is not a valid HTTP header name.
    #[error("invalid header name `{0}`")]
    HeaderName(String),

    /// The value stored for this header contains bytes that cannot go on the wire.
    #[error("invalid value for header `{0}`")]
    HeaderValue(String),

    /// The response body could not be decoded as the requested type.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}
