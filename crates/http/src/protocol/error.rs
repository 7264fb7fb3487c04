use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("framing error: {source}")]
    FramingError {
        #[from]
        source: FramingError,
    },

    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },

    #[error("connection idle for more than {millis}ms")]
    Timeout { millis: u128 },
}

/// Failures while cutting a request out of the byte stream.
///
/// Any of these aborts the connection without a response.
#[derive(Error, Debug)]
pub enum FramingError {
    #[error("body-bearing {method} request without content-length header")]
    MissingContentLength { method: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("stream closed after {received} of {expected} body bytes")]
    TruncatedBody { expected: usize, received: usize },

    #[error("stream closed before the header block was terminated ({received} bytes buffered)")]
    IncompleteHeader { received: usize },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    HeaderTooLarge { current_size: usize, max_size: usize },

    #[error("body size too large, declared: {declared} exceed the limit {max_size}")]
    BodyTooLarge { declared: usize, max_size: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl FramingError {
    pub fn missing_content_length<S: ToString>(method: S) -> Self {
        Self::MissingContentLength { method: method.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn truncated_body(expected: usize, received: usize) -> Self {
        Self::TruncatedBody { expected, received }
    }

    pub fn header_too_large(current_size: usize, max_size: usize) -> Self {
        Self::HeaderTooLarge { current_size, max_size }
    }

    pub fn body_too_large(declared: usize, max_size: usize) -> Self {
        Self::BodyTooLarge { declared, max_size }
    }
}

/// Failures while turning a framed message into a [`ParsedRequest`](crate::protocol::ParsedRequest).
///
/// These are answered with a `400 Bad Request` when the connection is still writable.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("request head is not valid utf-8")]
    InvalidEncoding,

    #[error("invalid request line: {line:?}")]
    InvalidRequestLine { line: String },

    #[error("invalid http method: {method:?}")]
    InvalidMethod { method: String },

    #[error("invalid status line: {line:?}")]
    InvalidStatusLine { line: String },

    #[error("invalid http uri: {reason}")]
    InvalidUri { reason: String },

    #[error("invalid header line: {line:?}")]
    InvalidHeader { line: String },

    #[error("malformed form body: {reason}")]
    MalformedFormBody { reason: String },

    #[error("malformed multipart body: {reason}")]
    MalformedMultipart { reason: String },
}

impl ParseError {
    pub fn invalid_request_line<S: ToString>(line: S) -> Self {
        Self::InvalidRequestLine { line: line.to_string() }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn invalid_status_line<S: ToString>(line: S) -> Self {
        Self::InvalidStatusLine { line: line.to_string() }
    }

    pub fn invalid_uri<S: ToString>(str: S) -> Self {
        Self::InvalidUri { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(line: S) -> Self {
        Self::InvalidHeader { line: line.to_string() }
    }

    pub fn malformed_form<S: ToString>(str: S) -> Self {
        Self::MalformedFormBody { reason: str.to_string() }
    }

    pub fn malformed_multipart<S: ToString>(str: S) -> Self {
        Self::MalformedMultipart { reason: str.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_response<S: ToString>(str: S) -> Self {
        Self::InvalidResponse { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors raised by the response helpers on [`ResponseMessage`](crate::protocol::ResponseMessage).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResponseError {
    #[error("status code {0} is outside 100..=599")]
    InvalidStatus(u16),

    #[error("status code {0} is not a redirect code (300..=308)")]
    InvalidRedirect(u16),
}
