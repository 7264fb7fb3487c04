//! The response object handlers write into.
//!
//! A [`ResponseMessage`] is created by the connection for every request, mutated by the
//! handler during dispatch and then serialized by the
//! [`ResponseEncoder`](crate::codec::ResponseEncoder). Serialization never mutates it.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use http::StatusCode;
use tracing::warn;

use crate::codec::encode_response;
use crate::protocol::{Headers, ResponseError};

const NOT_FOUND_TEXT: &str = "Request resource not found.";

fn checked_status(status: StatusCode) -> StatusCode {
    if status.as_u16() > 599 {
        warn!(status = status.as_u16(), "status code outside 100..=599, answer 500 instead");
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    status
}

/// Response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Text(String),
    Bytes(Bytes),
}

impl ResponseBody {
    pub fn empty() -> Self {
        ResponseBody::Text(String::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ResponseBody::Text(text) => text.as_bytes(),
            ResponseBody::Bytes(bytes) => bytes,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        ResponseBody::empty()
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        ResponseBody::Text(text)
    }
}

impl From<&str> for ResponseBody {
    fn from(text: &str) -> Self {
        ResponseBody::Text(text.to_string())
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        ResponseBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(bytes: Vec<u8>) -> Self {
        ResponseBody::Bytes(Bytes::from(bytes))
    }
}

/// A file a handler asked to answer with.
///
/// Reading it is left to the layer owning the file system policy: until then the response
/// carries whatever body the handler wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingFile {
    /// path below the configured root directory
    Root(String),
    /// path on the file system
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMessage {
    version: String,
    status: StatusCode,
    reason: String,
    headers: Headers,
    body: ResponseBody,
    pending_file: Option<PendingFile>,
}

impl Default for ResponseMessage {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

impl ResponseMessage {
    /// Creates an empty response. A status above 599 is replaced by `500`, see
    /// [`set_status`](Self::set_status).
    pub fn new(status: StatusCode) -> Self {
        let status = checked_status(status);
        Self {
            version: "HTTP/1.1".into(),
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers: Headers::new(),
            body: ResponseBody::empty(),
            pending_file: None,
        }
    }

    /// A response carrying only `status` and its canonical reason as a plain-text body.
    pub fn with_status_text(status: StatusCode) -> Self {
        let mut response = Self::new(status);
        response.write(status.canonical_reason().unwrap_or_default());
        response
    }

    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The status text written after the code.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Sets the status and resets the status text to its canonical reason.
    ///
    /// `StatusCode` admits codes up to 999; anything above 599 is replaced by `500`.
    pub fn set_status(&mut self, status: StatusCode) {
        let status = checked_status(status);
        self.status = status;
        self.reason = status.canonical_reason().unwrap_or_default().to_string();
    }

    /// Sets the status from a raw code, rejecting anything outside `100..=599`.
    pub fn set_status_code(&mut self, code: u16) -> Result<(), ResponseError> {
        if !(100..=599).contains(&code) {
            return Err(ResponseError::InvalidStatus(code));
        }
        let status = StatusCode::from_u16(code).map_err(|_| ResponseError::InvalidStatus(code))?;
        self.set_status(status);
        Ok(())
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
    }

    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    #[inline]
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<ResponseBody>) {
        self.body = body.into();
    }

    /// Replaces the body with `text`.
    pub fn write(&mut self, text: impl fmt::Display) {
        self.body = ResponseBody::Text(text.to_string());
    }

    /// Appends `text` to the body; a byte body is converted lossily to text first.
    pub fn append(&mut self, text: impl fmt::Display) {
        match &mut self.body {
            ResponseBody::Text(body) => body.push_str(&text.to_string()),
            ResponseBody::Bytes(bytes) => {
                let mut body = String::from_utf8_lossy(bytes).into_owned();
                body.push_str(&text.to_string());
                self.body = ResponseBody::Text(body);
            }
        }
    }

    pub fn clear(&mut self) {
        self.body = ResponseBody::empty();
    }

    /// Points the client at `location` with a 3xx status.
    pub fn redirect(&mut self, location: impl Into<String>, status: StatusCode) -> Result<(), ResponseError> {
        if !(300..=308).contains(&status.as_u16()) {
            return Err(ResponseError::InvalidRedirect(status.as_u16()));
        }
        self.set_status(status);
        self.headers.insert("Location", location);
        Ok(())
    }

    /// Adds a `Set-Cookie` header; earlier cookies are kept.
    pub fn set_cookie(&mut self, cookie: &Cookie) {
        self.headers.append("Set-Cookie", cookie.to_string());
    }

    /// Answers with the file at `path` below the root directory, or 404 when it is missing.
    pub fn send_file(&mut self, path: impl Into<String>) {
        self.pending_file = Some(PendingFile::Root(path.into()));
    }

    /// Answers with the file at `path` on the file system, or 404 when it is missing.
    pub fn send_file_at(&mut self, path: impl Into<PathBuf>) {
        self.pending_file = Some(PendingFile::Path(path.into()));
    }

    pub fn pending_file(&self) -> Option<&PendingFile> {
        self.pending_file.as_ref()
    }

    pub fn take_pending_file(&mut self) -> Option<PendingFile> {
        self.pending_file.take()
    }

    /// Turns this response into the stock 404.
    pub fn not_found(&mut self) {
        self.set_status(StatusCode::NOT_FOUND);
        self.write(NOT_FOUND_TEXT);
    }

    /// Turns this response into the stock 500.
    pub fn internal_error(&mut self) {
        self.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        self.write(StatusCode::INTERNAL_SERVER_ERROR.canonical_reason().unwrap_or_default());
    }

    /// Returns true if the handler asked for the connection to be closed.
    pub fn wants_close(&self) -> bool {
        self.headers.get_ignore_case("Connection").is_some_and(|value| value.trim().eq_ignore_ascii_case("close"))
    }

    /// Drops the body while keeping its length advertised, as required for `HEAD` replies.
    pub fn strip_body(&mut self) {
        let length = self.body.len();
        self.headers.remove_ignore_case("Content-Length");
        self.headers.insert("Content-Length", length.to_string());
        self.body = ResponseBody::empty();
    }

    /// Serializes the response to wire bytes. Identical responses produce identical bytes.
    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::new();
        encode_response(self, &mut dst);
        dst.freeze()
    }
}

/// A `Set-Cookie` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    path: Option<String>,
    max_age: Option<Duration>,
    secure: bool,
    http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), path: None, max_age: None, secure: false, http_only: false }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(path) = &self.path {
            write!(f, "; Path={path}")?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age.as_secs())?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_append_clear() {
        let mut response = ResponseMessage::default();
        response.write("Hello");
        response.append(", world");
        assert_eq!(response.body(), &ResponseBody::Text("Hello, world".into()));

        response.clear();
        assert!(response.body().is_empty());
    }

    #[test]
    fn status_code_range() {
        let mut response = ResponseMessage::default();
        assert_eq!(response.set_status_code(99), Err(ResponseError::InvalidStatus(99)));
        assert_eq!(response.set_status_code(600), Err(ResponseError::InvalidStatus(600)));
        response.set_status_code(418).unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.reason(), "I'm a teapot");
    }

    #[test]
    fn status_above_599_becomes_500() {
        let unassigned = StatusCode::from_u16(700).unwrap();

        let response = ResponseMessage::new(unassigned);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.reason(), "Internal Server Error");

        let mut response = ResponseMessage::default();
        response.set_status(unassigned);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.to_bytes().starts_with(b"HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn pending_file_is_taken_once() {
        let mut response = ResponseMessage::default();
        assert_eq!(response.pending_file(), None);

        response.send_file("docs/index.html");
        response.send_file_at("/etc/hostname");
        assert_eq!(response.take_pending_file(), Some(PendingFile::Path("/etc/hostname".into())));
        assert_eq!(response.take_pending_file(), None);
    }

    #[test]
    fn redirect_requires_3xx() {
        let mut response = ResponseMessage::default();
        assert_eq!(response.redirect("/x", StatusCode::OK), Err(ResponseError::InvalidRedirect(200)));

        response.redirect("https://example.com/", StatusCode::FOUND).unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get("Location"), Some("https://example.com/"));
    }

    #[test]
    fn cookie_attributes() {
        let cookie = Cookie::new("sid", "abc").path("/").max_age(Duration::from_secs(60)).secure(true).http_only(true);
        assert_eq!(cookie.to_string(), "sid=abc; Path=/; Max-Age=60; Secure; HttpOnly");

        let mut response = ResponseMessage::default();
        response.set_cookie(&cookie);
        response.set_cookie(&Cookie::new("theme", "dark"));
        let cookies = response.headers().iter().filter(|(n, _)| *n == "Set-Cookie").map(|(_, v)| v).collect::<Vec<_>>();
        assert_eq!(cookies, vec!["sid=abc; Path=/; Max-Age=60; Secure; HttpOnly", "theme=dark"]);
    }

    #[test]
    fn not_found_body() {
        let mut response = ResponseMessage::default();
        response.not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body().as_bytes(), NOT_FOUND_TEXT.as_bytes());
    }

    #[test]
    fn strip_body_keeps_length() {
        let mut response = ResponseMessage::default();
        response.write("12345");
        response.strip_body();
        assert!(response.body().is_empty());
        assert_eq!(response.headers().get("Content-Length"), Some("5"));
    }
}
