use std::fmt;

use bytes::Bytes;
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::RequestError;

/// A completed HTTP exchange.
///
/// Status, headers and final URL are always available. The body is either
/// already buffered (the default) or still on the wire when the request was
/// executed with the streaming flag set; the consuming accessors work for
/// both forms.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Body,
}

enum Body {
    Buffered(Bytes),
    Streaming(reqwest::Response),
}

impl Response {
    pub(crate) fn buffered(status: StatusCode, headers: HeaderMap, url: Url, bytes: Bytes) -> Self {
        Self { status, headers, url, body: Body::Buffered(bytes) }
    }

    pub(crate) fn streaming(
        status: StatusCode,
        headers: HeaderMap,
        url: Url,
        inner: reqwest::Response,
    ) -> Self {
        Self { status, headers, url, body: Body::Streaming(inner) }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Final URL of the exchange, after any transport-level redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn content_length(&self) -> Option<u64> {
        match &self.body {
            Body::Buffered(bytes) => Some(bytes.len() as u64),
            Body::Streaming(inner) => inner.content_length(),
        }
    }

    /// Full response body. For a streaming response this reads the rest of
    /// the wire; read failures surface as [`RequestError::Transport`].
    pub async fn bytes(self) -> Result<Bytes, RequestError> {
        match self.body {
            Body::Buffered(bytes) => Ok(bytes),
            Body::Streaming(inner) => Ok(inner.bytes().await?),
        }
    }

    /// Body as text. Invalid UTF-8 sequences are replaced, not rejected.
    pub async fn text(self) -> Result<String, RequestError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Body deserialized from JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, RequestError> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Body as a stream of chunks. A buffered body yields a single chunk.
    pub fn bytes_stream(self) -> impl Stream<Item = Result<Bytes, RequestError>> {
        match self.body {
            Body::Buffered(bytes) => stream::once(future::ready(Ok(bytes))).left_stream(),
            Body::Streaming(inner) => inner
                .bytes_stream()
                .map(|chunk| chunk.map_err(RequestError::from))
                .right_stream(),
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("url", &self.url.as_str())
            .field("buffered", &matches!(self.body, Body::Buffered(_)))
            .finish()
    }
}
