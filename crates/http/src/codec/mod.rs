//! Codecs turning socket bytes into messages and responses back into bytes.
//!
//! - [`RequestDecoder`]: frames complete requests out of a byte stream, see the module docs
//!   of the decoder for the exact rules
//! - [`ResponseEncoder`]: serializes a [`ResponseMessage`](crate::protocol::ResponseMessage)
//!
//! Both plug into [`FramedRead`](tokio_util::codec::FramedRead) and
//! [`FramedWrite`](tokio_util::codec::FramedWrite), which absorb short reads and retry
//! partial writes.
//!
//! # Example
//!
//! ```
//! use backed_http::codec::{RequestDecoder, ResponseEncoder};
//! use backed_http::protocol::ResponseMessage;
//! use bytes::BytesMut;
//! use tokio_util::codec::{Decoder, Encoder};
//!
//! let mut decoder = RequestDecoder::new();
//! let mut request_buffer = BytesMut::from("GET / HTTP/1.1\r\n\r\n");
//! let raw = decoder.decode(&mut request_buffer).unwrap();
//! assert!(raw.is_some());
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut response_buffer = BytesMut::new();
//! encoder.encode(ResponseMessage::default(), &mut response_buffer).unwrap();
//! assert!(response_buffer.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

mod request_decoder;
mod response_encoder;

pub use request_decoder::DEFAULT_MAX_BODY_BYTES;
pub use request_decoder::DEFAULT_MAX_HEADER_BYTES;
pub use request_decoder::FrameLimits;
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
pub use response_encoder::encode_response;
