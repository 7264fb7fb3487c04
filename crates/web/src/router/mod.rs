//! Route registry.
//!
//! Routes use a two-level scheme: a *base path* groups handler entries (like a controller), and
//! every entry adds a *sub-path* and a method. Entries are created with the per-method
//! constructors ([`get`], [`post`], ...) and registered through [`RouterBuilder`]:
//!
//! ```
//! use backed_web::router::{get, post, Router};
//! use backed_web::args::ParamType;
//! use backed_web::handler_fn;
//!
//! # fn main() -> Result<(), backed_web::router::RouteError> {
//! let router = Router::builder()
//!     .route("/test", get("cool", handler_fn(|_req, resp| Ok(resp.write("cool")))).at("/cool"))?
//!     .route("/test", post("save", handler_fn(|_req, resp| Ok(resp.write("saved")))).param("id", ParamType::UInt))?
//!     .build();
//!
//! assert_eq!(router.routes().count(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! Registration fails fast: a malformed path or a second entry for the same
//! (base path, sub-path, method) is reported by [`RouterBuilder::route`].

use std::fmt;
use std::sync::Arc;

use backed_http::protocol::Method;
use thiserror::Error;

use crate::args::{Param, ParamType};
use crate::handler::RouteHandler;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouteError {
    #[error("{method} {base_path}{sub_path} is already registered")]
    Duplicate { base_path: String, sub_path: String, method: Method },

    #[error("invalid route path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },
}

impl RouteError {
    fn invalid_path<S: ToString>(path: &str, reason: S) -> Self {
        Self::InvalidPath { path: path.to_string(), reason: reason.to_string() }
    }
}

/// One registered handler: name, sub-path, method, declared parameters and the callable.
pub struct HandlerEntry {
    name: String,
    sub_path: String,
    method: Method,
    params: Vec<Param>,
    handler: Arc<dyn RouteHandler>,
}

impl HandlerEntry {
    pub fn new<H: RouteHandler + 'static>(name: impl Into<String>, method: Method, handler: H) -> Self {
        Self { name: name.into(), sub_path: String::new(), method, params: Vec::new(), handler: Arc::new(handler) }
    }

    /// Sets the sub-path below the base path; without it the entry is the index handler.
    #[must_use]
    pub fn at(mut self, sub_path: impl Into<String>) -> Self {
        self.sub_path = sub_path.into();
        self
    }

    /// Declares a parameter bound from the form body or the query string.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn handler(&self) -> &dyn RouteHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("name", &self.name)
            .field("sub_path", &self.sub_path)
            .field("method", &self.method)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A base path and the entries registered under it.
#[derive(Debug)]
pub struct RouteDescriptor {
    base_path: String,
    entries: Vec<HandlerEntry>,
}

impl RouteDescriptor {
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn entries(&self) -> &[HandlerEntry] {
        &self.entries
    }

    /// Returns the request path below this base path if the base matches at a `/` boundary.
    pub(crate) fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        let suffix = path.strip_prefix(self.base_path.as_str())?;
        (suffix.is_empty() || suffix.starts_with('/')).then_some(suffix)
    }
}

/// The immutable route table, shared by all connections.
#[derive(Debug)]
pub struct Router {
    // longest base path first
    routes: Vec<RouteDescriptor>,
    single_handler_fallback: bool,
}

impl Router {
    /// Creates a new router builder
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Finds the longest base path matching `path` and returns it with the remaining suffix.
    pub fn find<'p>(&self, path: &'p str) -> Option<(&RouteDescriptor, &'p str)> {
        self.routes.iter().find_map(|route| route.strip(path).map(|suffix| (route, suffix)))
    }

    /// Whether a base path with a single entry sends every request under it to that entry.
    pub fn single_handler_fallback(&self) -> bool {
        self.single_handler_fallback
    }

    /// Lists `(base path, sub-path, method, name)` of every entry.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &str, Method, &str)> {
        self.routes.iter().flat_map(|route| {
            route.entries.iter().map(|entry| (route.base_path(), entry.sub_path(), entry.method(), entry.name()))
        })
    }
}

#[derive(Debug)]
pub struct RouterBuilder {
    routes: Vec<RouteDescriptor>,
    single_handler_fallback: bool,
}

impl RouterBuilder {
    fn new() -> Self {
        Self { routes: Vec::new(), single_handler_fallback: true }
    }

    /// Registers `entry` under `base_path`.
    pub fn route(mut self, base_path: impl AsRef<str>, mut entry: HandlerEntry) -> Result<Self, RouteError> {
        let base_path = normalize(base_path.as_ref())?;
        entry.sub_path = normalize(&entry.sub_path)?;

        let index = match self.routes.iter().position(|route| route.base_path == base_path) {
            Some(index) => index,
            None => {
                self.routes.push(RouteDescriptor { base_path: base_path.clone(), entries: Vec::new() });
                self.routes.len() - 1
            }
        };

        let route = &mut self.routes[index];
        if route.entries.iter().any(|e| e.sub_path == entry.sub_path && e.method == entry.method) {
            return Err(RouteError::Duplicate { base_path, sub_path: entry.sub_path, method: entry.method });
        }
        route.entries.push(entry);

        Ok(self)
    }

    /// Registers a group of entries under one base path, stopping at the first error.
    pub fn controller<I>(self, base_path: impl AsRef<str>, entries: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = HandlerEntry>,
    {
        entries.into_iter().try_fold(self, |builder, entry| builder.route(base_path.as_ref(), entry))
    }

    /// Enables or disables dispatching everything under a single-entry base path to that entry.
    #[must_use]
    pub fn single_handler_fallback(mut self, enabled: bool) -> Self {
        self.single_handler_fallback = enabled;
        self
    }

    pub fn build(mut self) -> Router {
        self.routes.sort_by(|a, b| b.base_path.len().cmp(&a.base_path.len()));
        Router { routes: self.routes, single_handler_fallback: self.single_handler_fallback }
    }
}

/// Strips trailing slashes and checks the leading one; `"/"` and `""` both become `""`.
fn normalize(path: &str) -> Result<String, RouteError> {
    if path.is_empty() {
        return Ok(String::new());
    }
    if !path.starts_with('/') {
        return Err(RouteError::invalid_path(path, "must start with '/'"));
    }
    if path.contains(['?', '#']) {
        return Err(RouteError::invalid_path(path, "must not contain a query or fragment"));
    }
    Ok(path.trim_end_matches('/').to_string())
}

macro_rules! method_entry {
    ($fn_name:ident, $method:ident) => {
        pub fn $fn_name<H: RouteHandler + 'static>(name: impl Into<String>, handler: H) -> HandlerEntry {
            HandlerEntry::new(name, Method::$method, handler)
        }
    };
}

method_entry!(get, Get);
method_entry!(head, Head);
method_entry!(post, Post);
method_entry!(put, Put);
method_entry!(delete, Delete);
method_entry!(connect, Connect);
method_entry!(options, Options);
method_entry!(trace, Trace);
method_entry!(patch, Patch);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerError, handler_fn};
    use crate::RequestContext;
    use backed_http::protocol::ResponseMessage;

    fn noop(_request: &RequestContext<'_>, _response: &mut ResponseMessage) -> Result<(), HandlerError> {
        Ok(())
    }

    #[test]
    fn base_paths_are_normalized() {
        let router = Router::builder()
            .route("/", get("index", handler_fn(noop)))
            .unwrap()
            .route("/home/", get("home", handler_fn(noop)).at("/"))
            .unwrap()
            .build();

        let routes = router.routes().collect::<Vec<_>>();
        assert!(routes.contains(&("", "", Method::Get, "index")));
        assert!(routes.contains(&("/home", "", Method::Get, "home")));
    }

    #[test]
    fn duplicates_fail_fast() {
        let result = Router::builder()
            .route("/test", get("a", handler_fn(noop)).at("/cool"))
            .unwrap()
            .route("/test/", get("b", handler_fn(noop)).at("/cool"));

        assert_eq!(
            result.err(),
            Some(RouteError::Duplicate { base_path: "/test".into(), sub_path: "/cool".into(), method: Method::Get })
        );
    }

    #[test]
    fn same_sub_path_other_method_is_fine() {
        let router = Router::builder()
            .controller("/test", [get("a", handler_fn(noop)).at("/cool"), post("b", handler_fn(noop)).at("/cool")])
            .unwrap()
            .build();
        assert_eq!(router.routes().count(), 2);
    }

    #[test]
    fn invalid_paths() {
        assert!(matches!(
            Router::builder().route("test", get("a", handler_fn(noop))).err(),
            Some(RouteError::InvalidPath { .. })
        ));
        assert!(matches!(
            Router::builder().route("/test", get("a", handler_fn(noop)).at("cool")).err(),
            Some(RouteError::InvalidPath { .. })
        ));
    }

    #[test]
    fn longest_base_path_wins() {
        let router = Router::builder()
            .route("/api", get("a", handler_fn(noop)))
            .unwrap()
            .route("/api/users", get("b", handler_fn(noop)))
            .unwrap()
            .route("", get("root", handler_fn(noop)).at("/about"))
            .unwrap()
            .build();

        let (route, suffix) = router.find("/api/users/7").unwrap();
        assert_eq!((route.base_path(), suffix), ("/api/users", "/7"));

        let (route, suffix) = router.find("/api/other").unwrap();
        assert_eq!((route.base_path(), suffix), ("/api", "/other"));

        // no match inside a segment
        let (route, suffix) = router.find("/apis").unwrap();
        assert_eq!((route.base_path(), suffix), ("", "/apis"));
    }

    #[test]
    fn suffix_outlives_router() {
        let path = String::from("/api/users/7");
        let suffix = {
            let router = Router::builder().route("/api", get("a", handler_fn(noop))).unwrap().build();
            router.find(&path).map(|(_, suffix)| suffix)
        };
        assert_eq!(suffix, Some("/users/7"));
    }

    #[test]
    fn no_routes_no_match() {
        let router = Router::builder().build();
        assert!(router.find("/anything").is_none());
    }
}
