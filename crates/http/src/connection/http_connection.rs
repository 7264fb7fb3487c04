use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};

use crate::codec::{FrameLimits, RequestDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::parser::parse_request;
use crate::protocol::{FramingError, HttpError, Method, ParsedRequest, RawMessage, ResponseMessage};

const INIT_READ_CAPACITY: usize = 8 * 1024;

/// Per-connection settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionOptions {
    pub limits: FrameLimits,
    /// Upper bound on the wait for each request; `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

/// An HTTP connection serving requests one after another until it is closed.
///
/// `HttpConnection` owns both halves of the stream:
/// - the read half is framed by [`RequestDecoder`], each message is parsed and handed to the
///   [`Handler`]
/// - the write half is driven by [`ResponseEncoder`]
///
/// The connection ends when the peer closes, either side sends `Connection: close`, the idle
/// timeout fires or an error occurs. Framing errors end it without a response, parse errors
/// are answered with `400 Bad Request` first.
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
    idle_timeout: Option<Duration>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_options(reader, writer, ConnectionOptions::default())
    }

    pub fn with_options(reader: R, writer: W, options: ConnectionOptions) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::with_limits(options.limits), INIT_READ_CAPACITY),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
            idle_timeout: options.idle_timeout,
        }
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        loop {
            match self.next_message().await? {
                Some(Ok(raw)) => {
                    let request = match parse_request(raw) {
                        Ok(request) => request,
                        Err(e) => {
                            warn!(cause = %e, "can't parse request, answer bad request");
                            let mut response = ResponseMessage::with_status_text(StatusCode::BAD_REQUEST);
                            response.add_header("Connection", "close");
                            self.framed_write.send(response).await?;
                            return Err(e.into());
                        }
                    };

                    if self.do_process(request, &handler).await? {
                        info!("connection close requested, shutdown this connection");
                        return Ok(());
                    }
                }

                Some(Err(e)) => {
                    error!(cause = %e, "can't frame next request, abort this connection");
                    return Err(e.into());
                }

                None => {
                    info!("cant read more request, break this connection down");
                    return Ok(());
                }
            }
        }
    }

    async fn next_message(&mut self) -> Result<Option<Result<RawMessage, FramingError>>, HttpError> {
        let Some(idle_timeout) = self.idle_timeout else {
            return Ok(self.framed_read.next().await);
        };

        match tokio::time::timeout(idle_timeout, self.framed_read.next()).await {
            Ok(next) => Ok(next),
            Err(_) => {
                info!(millis = idle_timeout.as_millis(), "connection idle, shutdown this connection");
                Err(HttpError::Timeout { millis: idle_timeout.as_millis() })
            }
        }
    }

    /// Runs the handler and writes its response. Returns true when the connection must close.
    async fn do_process<H>(&mut self, request: ParsedRequest, handler: &Arc<H>) -> Result<bool, HttpError>
    where
        H: Handler,
    {
        let method = request.method();
        let client_close = request.wants_close();
        debug!(%method, path = request.path(), "dispatch request");

        let mut response = match handler.call(request).await {
            Ok(response) => response,
            Err(e) => {
                let e: Box<dyn std::error::Error + Send + Sync> = e.into();
                error!(cause = %e, "handle request error, close this connection");
                let mut response = ResponseMessage::default();
                response.internal_error();
                response.add_header("Connection", "close");
                response
            }
        };

        if method == Method::Head {
            response.strip_body();
        }

        let close = client_close || response.wants_close();
        if close && !response.wants_close() {
            response.add_header("Connection", "close");
        }

        self.framed_write.send(response).await?;
        Ok(close)
    }
}
