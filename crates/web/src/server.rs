//! Server context and accept loop.
//!
//! [`ServerContext`] is the application side of every connection: it dispatches the parsed
//! request through the [`Router`], falls back to static files, and decorates the response with
//! the default headers. [`Server`] binds the listener and spawns one
//! [`HttpConnection`] task per accepted stream.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backed_http::connection::{ConnectionOptions, HttpConnection};
use backed_http::handler::Handler;
use backed_http::protocol::{ParsedRequest, PendingFile, ResponseMessage};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{Level, debug, error, info, warn};

use crate::config::{ConfigError, ServerConfig};
use crate::date::DateService;
use crate::dispatcher::{DispatchError, Dispatcher};
use crate::logging;
use crate::router::Router;
use crate::static_files::{self, StaticFiles};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("router must be set")]
    MissingRouter,

    #[error("can't bind {address:?}: {source}")]
    Bind { address: Vec<SocketAddr>, source: std::io::Error },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug)]
pub struct ServerBuilder {
    router: Option<Router>,
    config: ServerConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, config: ServerConfig::default() }
    }

    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Replaces the whole configuration; setters called afterwards adjust it.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.address = address.into();
        self
    }

    #[must_use]
    pub fn root_directory(mut self, root_directory: impl Into<PathBuf>) -> Self {
        self.config.root_directory = Some(root_directory.into());
        self
    }

    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config.api_version = Some(api_version.into());
        self
    }

    #[must_use]
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.config.keep_alive = keep_alive;
        self
    }

    #[must_use]
    pub fn idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.config.idle_timeout_ms = idle_timeout.map_or(0, |timeout| u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn build(self) -> Result<Server, ServerError> {
        let router = self.router.ok_or(ServerError::MissingRouter)?;
        let address = self.config.socket_addrs()?;
        let log_level = self.config.log_level()?;
        let options = self.config.connection_options();

        let context = ServerContext {
            dispatcher: Dispatcher::new(Arc::new(router)),
            static_files: self.config.root_directory.as_ref().map(StaticFiles::new),
            date: DateService::new(),
            config: self.config,
        };

        Ok(Server { context: Arc::new(context), address, log_level, options })
    }
}

/// State shared by all connections of one server.
#[derive(Debug)]
pub struct ServerContext {
    dispatcher: Dispatcher,
    static_files: Option<StaticFiles>,
    date: DateService,
    config: ServerConfig,
}

impl ServerContext {
    pub fn router(&self) -> &Router {
        self.dispatcher.router()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Produces the response for `request`. Never fails: dispatch errors become 404 or 500.
    pub async fn respond(&self, request: &ParsedRequest) -> ResponseMessage {
        let mut response = ResponseMessage::default();

        match self.dispatcher.dispatch(request, &mut response) {
            Ok(_) => {
                if let Some(file) = response.take_pending_file() {
                    self.send_file(file, &mut response).await;
                }
            }
            Err(DispatchError::NoRoute { path }) => {
                response = match self.static_lookup(&path).await {
                    Some(found) => found,
                    None => not_found(),
                };
            }
            Err(DispatchError::NotFound { .. }) => response = not_found(),
            Err(DispatchError::HandlerFailed { .. }) => {
                response = ResponseMessage::default();
                response.internal_error();
                response.add_header("Connection", "close");
            }
        }

        self.add_default_headers(&mut response);
        response
    }

    /// Loads the file a handler asked for; a miss turns the response into a 404.
    async fn send_file(&self, file: PendingFile, response: &mut ResponseMessage) {
        let found = match &file {
            PendingFile::Root(path) => match &self.static_files {
                Some(static_files) => static_files.fill(path, response).await,
                None => {
                    warn!(path = %path, "file requested below the root directory, but none is configured");
                    false
                }
            },
            PendingFile::Path(path) => static_files::fill_from_file(path, response).await,
        };

        if !found {
            debug!(?file, "requested file not found");
            response.not_found();
        }
    }

    async fn static_lookup(&self, path: &str) -> Option<ResponseMessage> {
        self.static_files.as_ref()?.lookup(path).await
    }

    fn add_default_headers(&self, response: &mut ResponseMessage) {
        if response.headers().get_ignore_case("Date").is_none() {
            let date = self.date.with_http_date(str::to_string);
            response.add_header("Date", date);
        }
        if let Some(api_version) = &self.config.api_version {
            response.add_header("X-Api-Version", api_version.as_str());
        }
        if !self.config.keep_alive && !response.wants_close() {
            response.add_header("Connection", "close");
        }
    }
}

fn not_found() -> ResponseMessage {
    let mut response = ResponseMessage::default();
    response.not_found();
    response
}

#[async_trait]
impl Handler for ServerContext {
    type Error = Infallible;

    async fn call(&self, request: ParsedRequest) -> Result<ResponseMessage, Self::Error> {
        Ok(self.respond(&request).await)
    }
}

#[derive(Debug)]
pub struct Server {
    context: Arc<ServerContext>,
    address: Vec<SocketAddr>,
    log_level: Level,
    options: ConnectionOptions,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn context(&self) -> &Arc<ServerContext> {
        &self.context
    }

    /// Installs the logger, binds the listener and serves connections forever.
    pub async fn start(self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener).await;
        Ok(())
    }

    /// Like [`start`](Self::start), but stops accepting once ctrl-c is received.
    /// Connections already accepted finish on their own.
    pub async fn run_until_ctrl_c(self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        tokio::select! {
            () = self.serve(listener) => {}
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => info!("ctrl-c received, stop accepting"),
                Err(e) => error!(cause = %e, "can't listen for ctrl-c, stop accepting"),
            },
        }
        Ok(())
    }

    async fn bind(&self) -> Result<TcpListener, ServerError> {
        if let Err(e) = logging::init(self.log_level) {
            warn!(cause = %e, "logger already installed, keep the existing one");
        }

        for (base_path, sub_path, method, name) in self.context.router().routes() {
            info!(%method, path = %format!("{base_path}{sub_path}"), handler = name, "route registered");
        }

        info!("start listening at {:?}", self.address);
        TcpListener::bind(self.address.as_slice()).await.map_err(|source| {
            error!(cause = %source, "bind server error");
            ServerError::Bind { address: self.address.clone(), source }
        })
    }

    /// Accepts connections from `listener` and spawns one task per connection.
    pub async fn serve(&self, listener: TcpListener) {
        self.context.date.start_refresh();

        loop {
            let (tcp_stream, remote_addr) = match listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let context = Arc::clone(&self.context);
            let options = self.options;

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_options(reader, writer, options);
                match connection.process(context).await {
                    Ok(()) => info!(%remote_addr, "finished process, connection shutdown"),
                    Err(e) => error!(%remote_addr, cause = %e, "service has error, connection shutdown"),
                }
            });
        }
    }
}
