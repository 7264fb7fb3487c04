//! The seam between the connection driver and the application.
//!
//! A [`Handler`] receives every parsed request of a connection and produces the response.
//! Errors are answered with a `500 Internal Server Error` by the connection.
//!
//! Plain async functions can be adapted with [`make_handler`]:
//!
//! ```
//! use backed_http::handler::make_handler;
//! use backed_http::protocol::{ParsedRequest, ResponseMessage};
//! use std::convert::Infallible;
//!
//! async fn hello(request: ParsedRequest) -> Result<ResponseMessage, Infallible> {
//!     let mut response = ResponseMessage::default();
//!     response.write(format!("hello {}", request.path()));
//!     Ok(response)
//! }
//!
//! let handler = make_handler(hello);
//! ```

use std::error::Error;

use async_trait::async_trait;

use crate::protocol::{ParsedRequest, ResponseMessage};

#[async_trait]
pub trait Handler: Send + Sync {
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn call(&self, request: ParsedRequest) -> Result<ResponseMessage, Self::Error>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<Err, F, Fut> Handler for HandlerFn<F>
where
    F: Fn(ParsedRequest) -> Fut + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<ResponseMessage, Err>> + Send,
{
    type Error = Err;

    async fn call(&self, request: ParsedRequest) -> Result<ResponseMessage, Self::Error> {
        (self.f)(request).await
    }
}

pub fn make_handler<F, Err, Ret>(f: F) -> HandlerFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Ret: Future<Output = Result<ResponseMessage, Err>>,
    F: Fn(ParsedRequest) -> Ret,
{
    HandlerFn { f }
}
