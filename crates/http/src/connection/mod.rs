//! Connection driver
//!
//! [`HttpConnection`] serves one accepted stream: it frames requests with
//! [`RequestDecoder`](crate::codec::RequestDecoder), parses them, calls the
//! [`Handler`](crate::handler::Handler) and writes the responses back.
//!
//! Persistent connections are supported. Requests are handled strictly one at a time, a
//! pipelined request is only read after the previous response was written.

mod http_connection;

pub use http_connection::ConnectionOptions;
pub use http_connection::HttpConnection;
