//! The structured request handed to handlers.
//!
//! A [`ParsedRequest`] is produced by [`parse_request`](crate::parser::parse_request) from a
//! framed [`RawMessage`](crate::protocol::RawMessage) and owned by the connection task.

use std::collections::HashMap;
use std::time::SystemTime;

use bytes::Bytes;

use crate::protocol::{Headers, Method};

/// Decoded request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Fields decoded from `application/x-www-form-urlencoded` or `multipart/form-data`
    Form(HashMap<String, String>),
    /// Any other content type, left undecoded
    Raw(Bytes),
}

impl RequestBody {
    pub fn as_form(&self) -> Option<&HashMap<String, String>> {
        match self {
            RequestBody::Form(form) => Some(form),
            RequestBody::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&Bytes> {
        match self {
            RequestBody::Form(_) => None,
            RequestBody::Raw(bytes) => Some(bytes),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) version: String,
    pub(crate) query: HashMap<String, String>,
    pub(crate) headers: Headers,
    pub(crate) body: Option<RequestBody>,
    pub(crate) received_at: SystemTime,
}

impl ParsedRequest {
    /// Starts a request by hand, mostly useful in tests and for internal redirects.
    pub fn builder(method: Method, path: impl Into<String>) -> ParsedRequestBuilder {
        ParsedRequestBuilder {
            inner: ParsedRequest {
                method,
                path: path.into(),
                version: "HTTP/1.1".into(),
                query: HashMap::new(),
                headers: Headers::new(),
                body: None,
                received_at: SystemTime::now(),
            },
        }
    }

    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    /// The decoded path, never containing `?`.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[inline]
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    #[inline]
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// The form mapping, if the body was form-encoded.
    pub fn form(&self) -> Option<&HashMap<String, String>> {
        self.body.as_ref().and_then(RequestBody::as_form)
    }

    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form().and_then(|form| form.get(name)).map(String::as_str)
    }

    /// When the request finished parsing.
    #[inline]
    pub fn received_at(&self) -> SystemTime {
        self.received_at
    }

    /// Returns true if the client asked for the connection to be closed after this request.
    pub fn wants_close(&self) -> bool {
        match self.headers.get_ignore_case("Connection") {
            Some(value) => value.trim().eq_ignore_ascii_case("close"),
            None => self.version == "HTTP/1.0",
        }
    }
}

#[derive(Debug)]
pub struct ParsedRequestBuilder {
    inner: ParsedRequest,
}

impl ParsedRequestBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.inner.version = version.into();
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.query.insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.headers.insert(name, value);
        self
    }

    pub fn form(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self.inner.body {
            Some(RequestBody::Form(form)) => {
                form.insert(name.into(), value.into());
            }
            body => {
                *body = Some(RequestBody::Form(HashMap::from([(name.into(), value.into())])));
            }
        }
        self
    }

    pub fn raw_body(mut self, bytes: impl Into<Bytes>) -> Self {
        self.inner.body = Some(RequestBody::Raw(bytes.into()));
        self
    }

    pub fn build(self) -> ParsedRequest {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_form_fields() {
        let request = ParsedRequest::builder(Method::Post, "/login").form("user", "a").form("pass", "b").build();
        assert_eq!(request.form_value("user"), Some("a"));
        assert_eq!(request.form_value("pass"), Some("b"));
        assert_eq!(request.query_param("user"), None);
    }

    #[test]
    fn connection_close_detection() {
        let close = ParsedRequest::builder(Method::Get, "/").header("connection", "Close").build();
        assert!(close.wants_close());

        let keep = ParsedRequest::builder(Method::Get, "/").build();
        assert!(!keep.wants_close());

        let http10 = ParsedRequest::builder(Method::Get, "/").version("HTTP/1.0").build();
        assert!(http10.wants_close());
    }
}
