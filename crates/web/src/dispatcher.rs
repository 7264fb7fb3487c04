//! Route dispatcher
//!
//! Resolution of a request against the [`Router`]:
//!
//! 1. the longest base path that prefixes the request path at a `/` boundary is selected; a
//!    single trailing `/` on the remaining suffix is ignored
//! 2. an empty suffix selects the index entry for the request method
//! 3. otherwise the entry whose sub-path equals the suffix and whose method matches
//! 4. otherwise, if the base path has exactly one entry, that entry regardless of method
//! 5. otherwise the entry whose name equals the suffix (without its leading `/`, ignoring
//!    case) and whose method matches
//!
//! Step 4 also applies when the suffix is empty and there is no index entry. It is a
//! compatibility shim: it never applies to the empty base path and can be switched off with
//! [`RouterBuilder::single_handler_fallback`](crate::router::RouterBuilder::single_handler_fallback).
//! The empty base path only resolves exact sub-paths; anything else is [`DispatchError::NoRoute`]
//! so the caller can fall back to static files.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use backed_http::protocol::{Method, ParsedRequest, ResponseMessage};
use thiserror::Error;
use tracing::{debug, error};

use crate::args;
use crate::request::RequestContext;
use crate::router::{HandlerEntry, Router};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no route registered for {path}")]
    NoRoute { path: String },

    #[error("no handler for {method} {path}")]
    NotFound { method: Method, path: String },

    #[error("handler {name} failed: {reason}")]
    HandlerFailed { name: String, reason: String },
}

/// Which resolution step selected the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Index,
    SubPath,
    SingleHandler,
    Name,
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub base_path: String,
    pub name: String,
    pub matched_by: MatchKind,
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Selects the entry for `method` and `path` without invoking it.
    pub fn resolve(&self, method: Method, path: &str) -> Result<(&str, &HandlerEntry, MatchKind), DispatchError> {
        let no_route = || DispatchError::NoRoute { path: path.to_string() };
        let not_found = || DispatchError::NotFound { method, path: path.to_string() };

        let (route, suffix) = self.router.find(path).ok_or_else(no_route)?;
        let suffix = suffix.strip_suffix('/').unwrap_or(suffix);
        let base_path = route.base_path();
        let entries = route.entries();

        if let Some(entry) = entries.iter().find(|e| e.sub_path() == suffix && e.method() == method) {
            let kind = if suffix.is_empty() { MatchKind::Index } else { MatchKind::SubPath };
            return Ok((base_path, entry, kind));
        }

        if base_path.is_empty() {
            return Err(no_route());
        }

        if self.router.single_handler_fallback() && entries.len() == 1 {
            return Ok((base_path, &entries[0], MatchKind::SingleHandler));
        }

        if suffix.is_empty() {
            return Err(not_found());
        }

        let name = &suffix[1..];
        entries
            .iter()
            .find(|e| e.method() == method && e.name().eq_ignore_ascii_case(name))
            .map(|entry| (base_path, entry, MatchKind::Name))
            .ok_or_else(not_found)
    }

    /// Resolves the handler for `request`, binds its parameters and invokes it.
    ///
    /// Handler errors and panics are caught here and reported as
    /// [`DispatchError::HandlerFailed`]; `response` may then hold partial output and should be
    /// replaced by the caller.
    pub fn dispatch(&self, request: &ParsedRequest, response: &mut ResponseMessage) -> Result<Dispatched, DispatchError> {
        let (base_path, entry, matched_by) = self.resolve(request.method(), request.path())?;
        debug!(method = %request.method(), path = request.path(), handler = entry.name(), ?matched_by, "route resolved");

        let args = args::bind(entry.params(), request);
        let context = RequestContext::new(request, args);

        let reason = match catch_unwind(AssertUnwindSafe(|| entry.handler().invoke(&context, response))) {
            Ok(Ok(())) => {
                return Ok(Dispatched { base_path: base_path.to_string(), name: entry.name().to_string(), matched_by });
            }
            Ok(Err(e)) => e.to_string(),
            Err(panic) => panic_message(panic.as_ref()),
        };

        error!(fatal = true, handler = entry.name(), path = request.path(), cause = %reason, "handler failed");
        Err(DispatchError::HandlerFailed { name: entry.name().to_string(), reason })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
