use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, Method};

use crate::response::Response;

/// Callback invoked with the finished response when a request succeeds.
/// Never invoked for failed requests.
pub type ResponseHook = Arc<dyn Fn(&Response) + Send + Sync>;

/// Immutable specification of one HTTP call.
///
/// Method and URL are fixed at construction; everything else is set through
/// the consuming builder methods. A descriptor is executed at most once —
/// the pool takes ownership and hands back a
/// [`CompletedRequest`](crate::CompletedRequest) carrying the outcome.
#[derive(Clone)]
pub struct RequestItem {
    method: Method,
    url: String,
    /// Free-form label carried into log events, useful for correlating
    /// entries of a large batch.
    pub tag: Option<String>,
    pub(crate) options: RequestOptions,
    pub(crate) client: Option<Client>,
}

#[derive(Clone, Default)]
pub(crate) struct RequestOptions {
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) json: Option<serde_json::Value>,
    pub(crate) form: Option<Vec<(String, String)>>,
    pub(crate) body: Option<Bytes>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) basic_auth: Option<(String, Option<String>)>,
    pub(crate) bearer_auth: Option<String>,
    pub(crate) stream: bool,
    pub(crate) callback: Option<ResponseHook>,
}

impl RequestItem {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            tag: None,
            options: RequestOptions::default(),
            client: None,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Adds one request header. Names and values are validated at execution
    /// time; invalid ones become a captured failure rather than a panic.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.push((name.into(), value.into()));
        self
    }

    /// Appends a query-string parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.query.push((name.into(), value.into()));
        self
    }

    /// JSON request body. Replaces any previously set body form.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.options.json = Some(body);
        self.options.form = None;
        self.options.body = None;
        self
    }

    /// URL-encoded form body. Replaces any previously set body form.
    pub fn form(mut self, fields: impl IntoIterator<Item = (String, String)>) -> Self {
        self.options.form = Some(fields.into_iter().collect());
        self.options.json = None;
        self.options.body = None;
        self
    }

    /// Raw request body. Replaces any previously set body form.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.options.body = Some(body.into());
        self.options.json = None;
        self.options.form = None;
        self
    }

    /// Deadline for the whole exchange of this one request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.options.basic_auth = Some((username.into(), password));
        self
    }

    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.options.bearer_auth = Some(token.into());
        self
    }

    /// When set, the response body is left on the wire instead of being
    /// buffered eagerly. The pool-level stream flag of `map`/`imap` takes
    /// precedence over this value.
    pub fn stream(mut self, stream: bool) -> Self {
        self.options.stream = stream;
        self
    }

    /// Installs a response hook, invoked exactly once if this request
    /// succeeds. A panicking hook is the caller's responsibility.
    pub fn callback(mut self, hook: impl Fn(&Response) + Send + Sync + 'static) -> Self {
        self.options.callback = Some(Arc::new(hook));
        self
    }

    /// Uses the given client (session) instead of the shared default one.
    /// The client may be shared freely across descriptors.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

impl fmt::Debug for RequestItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestItem")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_and_url_are_fixed_at_creation() {
        let item = RequestItem::new(Method::POST, "http://localhost/submit");
        assert_eq!(item.method(), &Method::POST);
        assert_eq!(item.url(), "http://localhost/submit");
    }

    #[test]
    fn body_forms_are_mutually_exclusive() {
        let item = RequestItem::new(Method::POST, "http://localhost/")
            .json(serde_json::json!({"a": 1}))
            .body("raw");
        assert!(item.options.json.is_none());
        assert!(item.options.body.is_some());

        let item = item.form(vec![("k".to_string(), "v".to_string())]);
        assert!(item.options.body.is_none());
        assert!(item.options.form.is_some());
    }

    #[test]
    fn stream_flag_defaults_off() {
        let item = RequestItem::new(Method::GET, "http://localhost/");
        assert!(!item.options.stream);
        assert!(item.stream(true).options.stream);
    }

    #[test]
    fn tag_field_and_builder_coexist() {
        let item = RequestItem::new(Method::GET, "http://localhost/").tag("probe");
        assert_eq!(item.tag.as_deref(), Some("probe"));
    }
}
