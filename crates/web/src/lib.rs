//! Routing and serving on top of `backed-http`.
//!
//! Handlers are registered in a [`Router`] under a base path and a sub-path, the
//! [`dispatcher`] resolves every request to one of them, and the [`Server`] accepts
//! connections and drives them with [`backed_http::connection::HttpConnection`].
//!
//! ```no_run
//! use backed_web::router::{get, Router};
//! use backed_web::{Server, handler_fn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::builder()
//!         .route("/hello", get("hello", handler_fn(|_request, response| Ok(response.write("hello world")))))?
//!         .build();
//!
//!     Server::builder().router(router).address("127.0.0.1:8080").build()?.run_until_ctrl_c().await?;
//!     Ok(())
//! }
//! ```

pub mod args;
pub mod config;
pub mod date;
pub mod dispatcher;
pub mod handler;
pub mod logging;
pub mod request;
pub mod router;
pub mod server;
pub mod static_files;

pub use handler::{FnHandler, HandlerError, RouteHandler, handler_fn};
pub use request::RequestContext;
pub use router::Router;
pub use server::{Server, ServerBuilder, ServerContext, ServerError};
