use std::error::Error;

use backed_http::protocol::{ResponseError, ResponseMessage};
use thiserror::Error;

use crate::RequestContext;

/// A route handler.
///
/// Handlers are shared by every connection and must not keep per-request state: everything
/// they need arrives through the [`RequestContext`], and everything they produce goes into the
/// [`ResponseMessage`]. They run synchronously on the connection task.
pub trait RouteHandler: Send + Sync {
    fn invoke(&self, request: &RequestContext<'_>, response: &mut ResponseMessage) -> Result<(), HandlerError>;
}

/// Failure reported by a route handler; answered with `500 Internal Server Error`.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("{reason}")]
    Failed { reason: String },

    #[error("invalid response: {source}")]
    Response {
        #[from]
        source: ResponseError,
    },

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

impl HandlerError {
    pub fn failed<S: ToString>(reason: S) -> Self {
        Self::Failed { reason: reason.to_string() }
    }
}

/// A plain function or closure used as a [`RouteHandler`].
#[derive(Debug)]
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&RequestContext<'_>, &mut ResponseMessage) -> Result<(), HandlerError> + Send + Sync,
{
    FnHandler { f }
}

impl<F> RouteHandler for FnHandler<F>
where
    F: Fn(&RequestContext<'_>, &mut ResponseMessage) -> Result<(), HandlerError> + Send + Sync,
{
    fn invoke(&self, request: &RequestContext<'_>, response: &mut ResponseMessage) -> Result<(), HandlerError> {
        (self.f)(request, response)
    }
}
