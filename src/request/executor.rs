use std::time::Instant;

use chrono::{DateTime, Local};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::error::RequestError;
use crate::request::request_item::RequestItem;
use crate::response::Response;

/// An executed request: the original descriptor plus its resolved outcome.
///
/// Exactly one of the two outcome variants is ever populated; the descriptor
/// is kept alongside so failure handlers retain full context.
#[derive(Debug)]
pub struct CompletedRequest {
    request: RequestItem,
    outcome: Result<Response, RequestError>,
    started_at: DateTime<Local>,
    elapsed: std::time::Duration,
}

impl CompletedRequest {
    pub fn request(&self) -> &RequestItem {
        &self.request
    }

    pub fn response(&self) -> Option<&Response> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&RequestError> {
        self.outcome.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.elapsed
    }

    pub fn into_parts(self) -> (RequestItem, Result<Response, RequestError>) {
        (self.request, self.outcome)
    }
}

impl RequestItem {
    /// Executes this request, capturing the outcome instead of raising it.
    ///
    /// `stream_override` takes precedence over the descriptor's own stream
    /// flag; pass `None` to use the stored one. The response hook, if any,
    /// runs exactly once on success before this returns.
    pub async fn send(self, stream_override: Option<bool>) -> CompletedRequest {
        let started_at = Local::now();
        let start = Instant::now();
        let stream = stream_override.unwrap_or(self.options.stream);

        let outcome = execute(&self, stream).await;
        let elapsed = start.elapsed();

        match &outcome {
            Ok(response) => debug!(
                method = %self.method(),
                url = %self.url(),
                tag = self.tag.as_deref(),
                status = response.status().as_u16(),
                elapsed_ms = elapsed.as_millis() as u64,
                "request completed"
            ),
            Err(error) => debug!(
                method = %self.method(),
                url = %self.url(),
                tag = self.tag.as_deref(),
                error = %error,
                elapsed_ms = elapsed.as_millis() as u64,
                "request failed"
            ),
        }

        CompletedRequest { request: self, outcome, started_at, elapsed }
    }
}

async fn execute(item: &RequestItem, stream: bool) -> Result<Response, RequestError> {
    let client = item.client.clone().unwrap_or_else(crate::default_client);

    let mut builder = client.request(item.method().clone(), item.url());
    if !item.options.headers.is_empty() {
        builder = builder.headers(build_headers(&item.options.headers)?);
    }
    if !item.options.query.is_empty() {
        builder = builder.query(&item.options.query);
    }
    if let Some(json) = &item.options.json {
        builder = builder.json(json);
    }
    if let Some(form) = &item.options.form {
        builder = builder.form(form);
    }
    if let Some(body) = &item.options.body {
        builder = builder.body(body.clone());
    }
    if let Some((username, password)) = &item.options.basic_auth {
        builder = builder.basic_auth(username, password.as_deref());
    }
    if let Some(token) = &item.options.bearer_auth {
        builder = builder.bearer_auth(token);
    }

    let result = match item.options.timeout {
        Some(deadline) => tokio::time::timeout(deadline, builder.send())
            .await
            .map_err(|_| RequestError::Timeout(deadline))?,
        None => builder.send().await,
    };
    let upstream = result?;

    let status = upstream.status();
    let headers = upstream.headers().clone();
    let url = upstream.url().clone();

    let response = if stream {
        Response::streaming(status, headers, url, upstream)
    } else {
        let bytes = upstream.bytes().await?;
        Response::buffered(status, headers, url, bytes)
    };

    if let Some(hook) = &item.options.callback {
        hook(&response);
    }

    Ok(response)
}

fn build_headers(pairs: &[(String, String)]) -> Result<HeaderMap, RequestError> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RequestError::HeaderName(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| RequestError::HeaderValue(name.clone()))?;
        headers.append(header_name, header_value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    #[test]
    fn build_headers_rejects_bad_names() {
        let pairs = vec![("bad name".to_string(), "v".to_string())];
        assert!(matches!(
            build_headers(&pairs),
            Err(RequestError::HeaderName(name)) if name == "bad name"
        ));
    }

    #[test]
    fn build_headers_rejects_bad_values() {
        let pairs = vec![("x-probe".to_string(), "bad\nvalue".to_string())];
        assert!(matches!(
            build_headers(&pairs),
            Err(RequestError::HeaderValue(name)) if name == "x-probe"
        ));
    }

    #[tokio::test]
    async fn unparsable_url_is_captured_not_raised() {
        let done = RequestItem::new(Method::GET, "definitely not a url").send(None).await;
        assert!(!done.is_success());
        assert!(matches!(done.error(), Some(RequestError::Transport(_))));
        assert_eq!(done.request().url(), "definitely not a url");
    }

    #[tokio::test]
    async fn invalid_header_is_captured_not_raised() {
        let done = RequestItem::new(Method::GET, "http://localhost/")
            .header("bad name", "v")
            .send(None)
            .await;
        assert!(matches!(done.error(), Some(RequestError::HeaderName(_))));
        assert!(done.response().is_none());
    }
}
