//! reqpool
//!
//! Bounded-concurrency execution of HTTP requests on top of [`reqwest`].
//! A collection of [`RequestItem`] descriptors is dispatched across a fixed
//! number of concurrent in-flight requests; results come back either as a
//! completed batch in input order ([`map`]) or as a lazy stream in completion
//! order ([`imap`]).
//!
//! Per-request failures never abort a batch or a stream: each failed request
//! is handed to the optional exception handler and omitted from the output.
//! Callers that need strict failure visibility must supply a handler.
//!
//! ```no_run
//! use futures::StreamExt;
//!
//! # async fn run() {
//! // Batch: blocks until every request has completed, input order preserved.
//! let requests = vec![
//!     reqpool::get("https://example.com/a"),
//!     reqpool::get("https://example.com/b"),
//! ];
//! let responses = reqpool::map(requests, false, None, None).await;
//!
//! // Stream: successes are yielded as they complete, at most 5 in flight.
//! let requests = (0..100).map(|i| reqpool::get(format!("https://example.com/{i}")));
//! let mut stream = reqpool::imap(requests, false, None, None);
//! while let Some(response) = stream.next().await {
//!     println!("{}", response.status());
//! }
//! # }
//! ```

use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::Client;

mod error;
mod request;
mod response;

pub use error::RequestError;
pub use request::{
    imap, map, CompletedRequest, ExceptionHandler, RequestItem, ResponseHook,
    DEFAULT_STREAM_CONCURRENCY,
};
pub use response::Response;

pub use reqwest::{Method, StatusCode};

// Shared client used by every request that was not given one explicitly.
// `reqwest::Client` is a handle around its connection pool, so handing out
// clones across concurrent executions is the intended usage.
static DEFAULT_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .expect("failed to build default HTTP client")
});

pub(crate) fn default_client() -> Client {
    DEFAULT_CLIENT.clone()
}

/// Builds a `GET` request descriptor.
pub fn get(url: impl Into<String>) -> RequestItem {
    RequestItem::new(Method::GET, url)
}

/// Builds an `OPTIONS` request descriptor.
pub fn options(url: impl Into<String>) -> RequestItem {
    RequestItem::new(Method::OPTIONS, url)
}

/// Builds a `HEAD` request descriptor.
pub fn head(url: impl Into<String>) -> RequestItem {
    RequestItem::new(Method::HEAD, url)
}

/// Builds a `POST` request descriptor.
pub fn post(url: impl Into<String>) -> RequestItem {
    RequestItem::new(Method::POST, url)
}

/// Builds a `PUT` request descriptor.
pub fn put(url: impl Into<String>) -> RequestItem {
    RequestItem::new(Method::PUT, url)
}

/// Builds a `PATCH` request descriptor.
pub fn patch(url: impl Into<String>) -> RequestItem {
    RequestItem::new(Method::PATCH, url)
}

/// Builds a `DELETE` request descriptor.
pub fn delete(url: impl Into<String>) -> RequestItem {
    RequestItem::new(Method::DELETE, url)
}

/// Builds a request descriptor with an explicit method.
pub fn request(method: Method, url: impl Into<String>) -> RequestItem {
    RequestItem::new(method, url)
}
