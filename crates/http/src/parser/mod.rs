//! Message parser turning framed bytes into structured requests.
//!
//! [`parse_request`] works on a complete [`RawMessage`] produced by the
//! [`RequestDecoder`](crate::codec::RequestDecoder). It never reads from the network and never
//! panics on malformed input: every problem is reported as a [`ParseError`].
//!
//! The steps are:
//!
//! 1. the head must be UTF-8; lines end with `\r\n` or a bare `\n`
//! 2. the request line is split into method, target and version ([`request_line`])
//! 3. the target is split at the first `?` into the percent-decoded path and the query
//! 4. headers are split on the first `": "` ([`header`])
//! 5. the body is decoded by `Content-Type`: urlencoded ([`form`]), multipart
//!    ([`multipart`]) or kept raw. `GET` and `HEAD` bodies are dropped.

pub(crate) mod decode;
mod form;
mod header;
mod multipart;
mod query;
mod request_line;

use std::time::SystemTime;

use http::StatusCode;
use memchr::memmem;
use mime::Mime;
use tracing::trace;

use crate::ensure;
use crate::protocol::{Headers, ParseError, ParsedRequest, RawMessage, RequestBody};

pub use decode::{form_decode, html_unescape, percent_decode};
pub use query::{encode_query, parse_query};

/// Parses a framed request.
pub fn parse_request(raw: RawMessage) -> Result<ParsedRequest, ParseError> {
    let head = std::str::from_utf8(raw.head()).map_err(|_| ParseError::InvalidEncoding)?;
    let mut lines = split_lines(head);

    let request_line = request_line::parse_request_line(lines.next().unwrap_or_default())?;

    let (path, query) = match request_line.target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (request_line.target, None),
    };
    let path = percent_decode(path).map_err(|e| ParseError::invalid_uri(format!("path {path:?}: {e}")))?.into_owned();
    // an encoded `?` must not smuggle a query into the path
    ensure!(!path.contains('?'), ParseError::invalid_uri(format!("path {path:?} contains '?'")));
    let query = match query {
        Some(query) => parse_query(query)?,
        None => Default::default(),
    };

    let headers = parse_headers(lines)?;

    let method = request_line.method;
    let body = if method.ignores_body() { None } else { parse_body(&headers, raw.body())? };

    trace!(%method, path = %path, "parsed request");

    Ok(ParsedRequest {
        method,
        path,
        version: request_line.version.to_string(),
        query,
        headers,
        body,
        received_at: SystemTime::now(),
    })
}

/// Status line and headers of a serialized response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    version: String,
    status: StatusCode,
    reason: String,
    headers: Headers,
    header_len: usize,
}

impl ResponseHead {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Offset of the first body byte in the parsed input.
    pub fn header_len(&self) -> usize {
        self.header_len
    }
}

/// Parses the status line and headers at the start of a serialized response.
///
/// Input without a blank line is treated as a head without body.
pub fn parse_response_head(bytes: &[u8]) -> Result<ResponseHead, ParseError> {
    let header_len = memmem::find(bytes, b"\r\n\r\n").map_or(bytes.len(), |pos| pos + 4);
    let head = std::str::from_utf8(&bytes[..header_len]).map_err(|_| ParseError::InvalidEncoding)?;
    let mut lines = split_lines(head);

    let status_line = lines.next().unwrap_or_default();
    let mut tokens = status_line.splitn(3, ' ');
    let (Some(version), Some(code)) = (tokens.next(), tokens.next()) else {
        return Err(ParseError::invalid_status_line(status_line));
    };
    let status = code
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| ParseError::invalid_status_line(status_line))?;
    let reason = tokens.next().unwrap_or_default().to_string();

    let headers = parse_headers(lines)?;

    Ok(ResponseHead { version: version.to_string(), status, reason, headers, header_len })
}

fn split_lines(head: &str) -> impl Iterator<Item = &str> {
    head.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Headers, ParseError> {
    let mut headers = Headers::with_capacity(16);
    for line in lines.take_while(|line| !line.is_empty()) {
        let (name, value) = header::parse_header_line(line)?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn parse_body(headers: &Headers, body: bytes::Bytes) -> Result<Option<RequestBody>, ParseError> {
    let content_type = headers.get_ignore_case("Content-Type").and_then(|value| value.trim().parse::<Mime>().ok());

    match content_type {
        Some(ty) if ty.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() => {
            form::parse_urlencoded(&body).map(|form| Some(RequestBody::Form(form)))
        }
        Some(ty) if ty.type_() == mime::MULTIPART && ty.subtype() == mime::FORM_DATA => {
            let boundary = ty
                .get_param(mime::BOUNDARY)
                .map(|boundary| boundary.as_str().trim_matches('"').to_string())
                .ok_or_else(|| ParseError::malformed_multipart("content-type without boundary"))?;
            multipart::parse_multipart(&body, &boundary).map(|form| Some(RequestBody::Form(form)))
        }
        _ if body.is_empty() => Ok(None),
        _ => Ok(Some(RequestBody::Raw(body))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RequestDecoder;
    use crate::protocol::Method;
    use bytes::BytesMut;
    use indoc::indoc;
    use tokio_util::codec::Decoder;

    fn frame(str: &str) -> RawMessage {
        let mut buf = BytesMut::from(str.replace('\n', "\r\n").as_str());
        RequestDecoder::new().decode(&mut buf).unwrap().unwrap()
    }

    #[test]
    fn simple_get() {
        let raw = frame(indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##});

        let request = parse_request(raw).unwrap();
        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.path(), "/index.html");
        assert_eq!(request.version(), "HTTP/1.1");
        assert!(request.query().is_empty());
        assert_eq!(request.headers().len(), 3);
        assert_eq!(request.header("Host"), Some("127.0.0.1:8080"));
        assert_eq!(request.header("User-Agent"), Some("curl/7.79.1"));
        assert!(request.body().is_none());
    }

    #[test]
    fn path_and_query_are_split() {
        let raw = frame("GET /test/My%20Page?a=1&b=two+words&flag HTTP/1.1\n\n");
        let request = parse_request(raw).unwrap();
        assert_eq!(request.path(), "/test/My Page");
        assert!(!request.path().contains('?'));
        assert_eq!(request.query_param("a"), Some("1"));
        assert_eq!(request.query_param("b"), Some("two words"));
        assert_eq!(request.query_param("flag"), Some(""));
    }

    #[test]
    fn encoded_question_mark_in_path_is_rejected() {
        let result = parse_request(frame("GET /a%3Fb=1 HTTP/1.1\n\n"));
        assert!(matches!(result, Err(ParseError::InvalidUri { .. })));

        // still fine inside the query
        let request = parse_request(frame("GET /a?q=what%3F HTTP/1.1\n\n")).unwrap();
        assert_eq!(request.path(), "/a");
        assert_eq!(request.query_param("q"), Some("what?"));
    }

    #[test]
    fn empty_query_after_question_mark() {
        let request = parse_request(frame("GET /home? HTTP/1.1\n\n")).unwrap();
        assert_eq!(request.path(), "/home");
        assert!(request.query().is_empty());
    }

    #[test]
    fn bare_newlines_are_accepted() {
        let raw = RawMessage::new(bytes::Bytes::from_static(b"GET / HTTP/1.1\nHost: a\n\n"), 24);
        let request = parse_request(raw).unwrap();
        assert_eq!(request.header("Host"), Some("a"));
    }

    #[test]
    fn urlencoded_post() {
        let raw = frame(indoc! {r##"
        POST /login HTTP/1.1
        Content-Type: application/x-www-form-urlencoded
        Content-Length: 17

        a=1&b=two%20words"##});

        let request = parse_request(raw).unwrap();
        assert_eq!(request.form_value("a"), Some("1"));
        assert_eq!(request.form_value("b"), Some("two words"));
        assert_eq!(request.form().unwrap().len(), 2);
    }

    #[test]
    fn content_type_is_case_insensitive() {
        let raw = frame("POST / HTTP/1.1\ncontent-type:  Application/X-WWW-Form-Urlencoded \nContent-Length: 3\n\nx=1");
        let request = parse_request(raw).unwrap();
        assert_eq!(request.form_value("x"), Some("1"));
    }

    #[test]
    fn multipart_post() {
        let body = "--XYZ\r\nContent-Disposition: form-data; name=\"firstName\"\r\n\r\nJohn\r\n--XYZ--\r\n";
        let str = format!(
            "POST /form HTTP/1.1\r\nContent-Type: multipart/form-data; boundary=XYZ\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        let mut buf = BytesMut::from(str.as_str());
        let raw = RequestDecoder::new().decode(&mut buf).unwrap().unwrap();

        let request = parse_request(raw).unwrap();
        assert_eq!(request.form_value("firstName"), Some("John"));
        assert_eq!(request.form().unwrap().len(), 1);
    }

    #[test]
    fn multipart_quoted_boundary() {
        let body = "--abc\r\nContent-Disposition: form-data; name=\"k\"\r\n\r\nv\r\n--abc--\r\n";
        let str = format!(
            "POST / HTTP/1.1\r\nContent-Type: multipart/form-data; boundary=\"abc\"\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        let mut buf = BytesMut::from(str.as_str());
        let raw = RequestDecoder::new().decode(&mut buf).unwrap().unwrap();
        assert_eq!(parse_request(raw).unwrap().form_value("k"), Some("v"));
    }

    #[test]
    fn multipart_without_boundary() {
        let raw = frame("POST / HTTP/1.1\nContent-Type: multipart/form-data\nContent-Length: 2\n\nab");
        assert!(matches!(parse_request(raw), Err(ParseError::MalformedMultipart { .. })));
    }

    #[test]
    fn other_content_type_is_raw() {
        let raw = frame("PUT /data HTTP/1.1\nContent-Type: application/json\nContent-Length: 7\n\n{\"a\":1}");
        let request = parse_request(raw).unwrap();
        assert_eq!(request.body().and_then(RequestBody::as_raw).map(|b| &b[..]), Some(&b"{\"a\":1}"[..]));
    }

    #[test]
    fn get_body_is_dropped() {
        let raw = frame("GET /x HTTP/1.1\nContent-Type: application/x-www-form-urlencoded\nContent-Length: 3\n\na=1");
        let request = parse_request(raw).unwrap();
        assert!(request.body().is_none());
    }

    #[test]
    fn error_kinds() {
        assert!(matches!(parse_request(frame("GET / HTTP/1.1 extra\n\n")), Err(ParseError::InvalidRequestLine { .. })));
        assert!(matches!(parse_request(frame("FETCH / HTTP/1.1\n\n")), Err(ParseError::InvalidMethod { .. })));
        assert!(matches!(parse_request(frame("GET / HTTP/1.1\nBroken\n\n")), Err(ParseError::InvalidHeader { .. })));
        assert!(matches!(parse_request(frame("GET /%FF HTTP/1.1\n\n")), Err(ParseError::InvalidUri { .. })));

        let raw = RawMessage::new(bytes::Bytes::from_static(b"GET /\xff HTTP/1.1\r\n\r\n"), 19);
        assert_eq!(parse_request(raw).unwrap_err(), ParseError::InvalidEncoding);
    }

    #[test]
    fn response_head_parsing() {
        let head = parse_response_head(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n").unwrap();
        assert_eq!(head.status(), StatusCode::NOT_FOUND);
        assert_eq!(head.reason(), "Not Found");
        assert_eq!(head.headers().get("Content-Length"), Some("0"));

        assert!(matches!(parse_response_head(b"HTTP/1.1 abc\r\n\r\n"), Err(ParseError::InvalidStatusLine { .. })));
        assert!(matches!(parse_response_head(b"garbage\r\n\r\n"), Err(ParseError::InvalidStatusLine { .. })));
    }
}
