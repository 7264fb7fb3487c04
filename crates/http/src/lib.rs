//! A minimal asynchronous HTTP/1.1 protocol stack
//!
//! This crate turns raw socket bytes into structured requests and responses back into bytes,
//! without relying on an external HTTP parser. It is built on tokio and `tokio-util` codecs.
//!
//! # Features
//!
//! - Framing of requests arriving in arbitrary pieces, with size limits
//! - Request line, query string and header parsing
//! - `application/x-www-form-urlencoded` and `multipart/form-data` form decoding
//! - Deterministic response serialization
//! - Keep-alive connections with an idle cut-off
//!
//! # Example
//!
//! ```no_run
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use backed_http::connection::HttpConnection;
//! use backed_http::handler::make_handler;
//! use backed_http::protocol::{ParsedRequest, ResponseMessage};
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//!
//! #[tokio::main]
//! async fn main() {
//!     info!(port = 8080, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             if let Err(e) = connection.process(handler).await {
//!                 error!(cause = %e, "connection shutdown with error");
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: ParsedRequest) -> Result<ResponseMessage, Infallible> {
//!     info!(path = request.path(), "receive request");
//!     let mut response = ResponseMessage::default();
//!     response.add_header("Content-Type", "text/plain");
//!     response.write("Hello World!\r\n");
//!     Ok(response)
//! }
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: the request framer and the response encoder
//! - [`parser`]: request line, query, header and form parsing
//! - [`protocol`]: message types and errors
//! - [`connection`]: the per-connection request loop
//! - [`handler`]: the [`handler::Handler`] trait the application implements
//!
//! # Error Handling
//!
//! - [`protocol::FramingError`]: the byte stream can't be cut into messages, the connection is
//!   dropped without a response
//! - [`protocol::ParseError`]: a framed message is malformed, answered with `400`
//! - [`protocol::SendError`]: writing the response failed
//! - [`protocol::HttpError`]: the aggregate returned by [`connection::HttpConnection::process`]
//!
//! # Limitations
//!
//! - `Content-Length` framing only, no chunked transfer encoding
//! - no pipelining, header folding, HTTP/2 or TLS

pub mod codec;
pub mod connection;
pub mod handler;
pub mod parser;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
