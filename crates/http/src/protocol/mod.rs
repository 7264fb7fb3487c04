//! Core protocol types shared by the framer, the parser and the response builder.
//!
//! - **Messages** ([`message`]): [`RawMessage`], one framed request with its header/body boundary
//! - **Requests** ([`request`]): [`ParsedRequest`] and its decoded [`RequestBody`]
//! - **Responses** ([`response`]): [`ResponseMessage`], mutated by handlers, plus [`Cookie`]
//! - **Headers** ([`headers`]): the ordered, case-preserving [`Headers`] mapping
//! - **Methods** ([`method`]): the nine request [`Method`]s
//! - **Errors** ([`error`]): [`FramingError`], [`ParseError`], [`SendError`] and the
//!   aggregating [`HttpError`]
//!
//! The protocol module is typically used through the connection layer rather than directly,
//! but handlers see [`ParsedRequest`] and [`ResponseMessage`] on every call.

mod message;
pub use message::RawMessage;

mod method;
pub use method::Method;

mod headers;
pub use headers::Headers;

mod request;
pub use request::ParsedRequest;
pub use request::ParsedRequestBuilder;
pub use request::RequestBody;

mod response;
pub use response::Cookie;
pub use response::PendingFile;
pub use response::ResponseBody;
pub use response::ResponseMessage;

mod error;
pub use error::FramingError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::ResponseError;
pub use error::SendError;
