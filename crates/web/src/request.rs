//! The view of a request handed to route handlers.
//!
//! [`RequestContext`] borrows the [`ParsedRequest`] owned by the connection and carries the
//! [`Args`] bound for the matched entry.

use std::collections::HashMap;
use std::time::SystemTime;

use backed_http::protocol::{Headers, Method, ParsedRequest, RequestBody};

use crate::args::Args;

/// Represents the context of one handler invocation.
///
/// The lifetime ties the context to the request it borrows, so handlers can't keep it around
/// after they return.
#[derive(Debug)]
pub struct RequestContext<'req> {
    request: &'req ParsedRequest,
    args: Args,
}

impl<'req> RequestContext<'req> {
    pub fn new(request: &'req ParsedRequest, args: Args) -> Self {
        Self { request, args }
    }

    /// Returns a reference to the underlying request
    pub fn request(&self) -> &'req ParsedRequest {
        self.request
    }

    pub fn method(&self) -> Method {
        self.request.method()
    }

    /// Returns the decoded request path, without the query
    pub fn path(&self) -> &'req str {
        self.request.path()
    }

    pub fn version(&self) -> &'req str {
        self.request.version()
    }

    pub fn headers(&self) -> &'req Headers {
        self.request.headers()
    }

    pub fn header(&self, name: &str) -> Option<&'req str> {
        self.request.header(name)
    }

    pub fn query(&self) -> &'req HashMap<String, String> {
        self.request.query()
    }

    pub fn body(&self) -> Option<&'req RequestBody> {
        self.request.body()
    }

    pub fn form(&self) -> Option<&'req HashMap<String, String>> {
        self.request.form()
    }

    pub fn received_at(&self) -> SystemTime {
        self.request.received_at()
    }

    /// Returns the parameters bound for the matched handler entry
    pub fn args(&self) -> &Args {
        &self.args
    }
}
