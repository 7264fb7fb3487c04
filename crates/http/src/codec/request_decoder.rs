//! HTTP request framer
//!
//! This module cuts complete request messages out of a byte stream that arrives in arbitrary
//! pieces. It is a [`Decoder`] so it can be driven by [`FramedRead`](tokio_util::codec::FramedRead),
//! which keeps reading from the socket for as long as the decoder answers `Ok(None)`.
//!
//! # Framing rules
//!
//! 1. The header block ends at the first `\r\n\r\n`. Until it shows up more data is needed,
//!    bounded by [`FrameLimits::max_header_bytes`].
//! 2. The head is then inspected shallowly for the method token and `Content-Length`.
//! 3. POST, PUT and PATCH without `Content-Length` fail with
//!    [`FramingError::MissingContentLength`].
//! 4. With a `Content-Length` the decoder waits for exactly that many body bytes.
//! 5. Otherwise the message is complete at the header terminator.
//!
//! # Example
//!
//! ```
//! use backed_http::codec::RequestDecoder;
//! use bytes::BytesMut;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /index.html HTTP/1.1\r\nHost: a\r\n\r\n");
//! let raw = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(raw.header_len(), raw.len());
//! ```

use bytes::BytesMut;
use memchr::memmem;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{FramingError, Method, RawMessage};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Default maximum size in bytes of the header block
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

/// Default maximum declared body size in bytes
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Size cut-offs applied while framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self { max_header_bytes: DEFAULT_MAX_HEADER_BYTES, max_body_bytes: DEFAULT_MAX_BODY_BYTES }
    }
}

/// A decoder producing one [`RawMessage`] per request.
///
/// # State Machine
///
/// - `Head`: looking for the header terminator; `scanned` remembers how far the previous
///   attempt searched so byte-at-a-time input is not rescanned from the start
/// - `Body`: terminator found, waiting until `content_length` body bytes are buffered
#[derive(Debug)]
pub struct RequestDecoder {
    limits: FrameLimits,
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Head { scanned: usize },
    Body { header_len: usize, content_length: usize },
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` with the default limits
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_limits(limits: FrameLimits) -> Self {
        Self { limits, state: State::Head { scanned: 0 } }
    }

    pub fn limits(&self) -> FrameLimits {
        self.limits
    }

    fn find_header_end(&mut self, src: &BytesMut, scanned: usize) -> Result<Option<usize>, FramingError> {
        // the terminator may straddle the previous scan boundary
        let start = scanned.saturating_sub(HEADER_TERMINATOR.len() - 1);
        match memmem::find(&src[start..], HEADER_TERMINATOR) {
            Some(pos) => {
                let header_len = start + pos + HEADER_TERMINATOR.len();
                ensure!(
                    header_len <= self.limits.max_header_bytes,
                    FramingError::header_too_large(header_len, self.limits.max_header_bytes)
                );
                Ok(Some(header_len))
            }
            None => {
                ensure!(
                    src.len() <= self.limits.max_header_bytes,
                    FramingError::header_too_large(src.len(), self.limits.max_header_bytes)
                );
                self.state = State::Head { scanned: src.len() };
                Ok(None)
            }
        }
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_limits(FrameLimits::default())
    }
}

impl Decoder for RequestDecoder {
    type Item = RawMessage;
    type Error = FramingError;

    /// Attempts to frame one request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(raw))`: a complete message; its bytes are removed from `src`
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the stream cannot be framed, the connection must be dropped
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let (header_len, content_length) = match self.state {
            State::Body { header_len, content_length } => (header_len, content_length),
            State::Head { scanned } => {
                let Some(header_len) = self.find_header_end(src, scanned)? else {
                    return Ok(None);
                };

                let head = inspect_head(&src[..header_len])?;
                let content_length = match (head.content_length, head.method) {
                    (Some(length), _) => {
                        ensure!(
                            length <= self.limits.max_body_bytes,
                            FramingError::body_too_large(length, self.limits.max_body_bytes)
                        );
                        length
                    }
                    (None, Some(method)) if method.is_body_bearing() => {
                        return Err(FramingError::missing_content_length(method));
                    }
                    (None, _) => 0,
                };

                trace!(header_len, content_length, "framed request head");
                self.state = State::Body { header_len, content_length };
                (header_len, content_length)
            }
        };

        let total = header_len + content_length;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        self.state = State::Head { scanned: 0 };
        let bytes = src.split_to(total).freeze();
        Ok(Some(RawMessage::new(bytes, header_len)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(raw) = self.decode(src)? {
            return Ok(Some(raw));
        }

        if src.is_empty() {
            return Ok(None);
        }

        match self.state {
            State::Body { header_len, content_length } => {
                Err(FramingError::truncated_body(content_length, src.len().saturating_sub(header_len)))
            }
            State::Head { .. } => Err(FramingError::IncompleteHeader { received: src.len() }),
        }
    }
}

/// What the framer needs to know about a head before the full parse.
#[derive(Debug, PartialEq, Eq)]
struct HeadInfo {
    method: Option<Method>,
    content_length: Option<usize>,
}

/// Shallow parse of a header block: the method token and `Content-Length`, nothing else.
///
/// An unknown method is not a framing problem; the parser will reject it later.
fn inspect_head(head: &[u8]) -> Result<HeadInfo, FramingError> {
    let mut lines = head.split(|b| *b == b'\n').map(|line| line.strip_suffix(b"\r").unwrap_or(line));

    let method = lines
        .next()
        .and_then(|request_line| request_line.split(|b| *b == b' ').next())
        .and_then(|token| Method::try_from(token).ok());

    let mut content_length = None;
    for line in lines.filter(|line| !line.is_empty()) {
        let Some(colon) = memchr::memchr(b':', line) else {
            continue;
        };
        if !line[..colon].trim_ascii().eq_ignore_ascii_case(b"content-length") {
            continue;
        }

        let value = std::str::from_utf8(line[colon + 1..].trim_ascii())
            .map_err(|_| FramingError::invalid_content_length("value is not utf-8"))?;
        let length = value
            .parse::<usize>()
            .map_err(|_| FramingError::invalid_content_length(format!("value {value} is not a non-negative integer")))?;

        match content_length {
            Some(existing) if existing != length => {
                return Err(FramingError::invalid_content_length(format!("conflicting values {existing} and {length}")));
            }
            _ => content_length = Some(length),
        }
    }

    Ok(HeadInfo { method, content_length })
}
