//! Accept loop and per-connection worker.
//!
//! The server accepts TCP connections and hands each one to a worker drawn
//! from a fixed-capacity pool (a semaphore over tokio tasks). A worker runs
//! one connection through a single pass: parse, dispatch, respond, close.
//! There is no keep-alive; every response ends the connection.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::files::StaticFiles;
use crate::http::{ParseError, Responder, StatusCode, parser};
use crate::router::{ResponseSink, Router};

/// Errors produced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// The servlite HTTP server.
///
/// Binds a TCP listener and serves one request per connection: registered
/// handlers first, then the static-file whitelist, then 404.
///
/// # Examples
///
/// ```rust,no_run
/// use servlite::{Request, Responder, ResponseSink, Router, Server, ServerConfig};
/// use servlite::http::StatusCode;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut router = Router::new();
///     router.post("/messages", |_req: Request, mut responder: Responder<ResponseSink>| async move {
///         responder.send_status(StatusCode::Created).await
///     });
///
///     let server = Server::bind(ServerConfig::default()).await?;
///     server.run(router).await?;
///     Ok(())
/// }
/// ```
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: ServerConfig,
}

impl Server {
    /// Binds the listener on the configured port.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound (port in
    /// use, insufficient permissions). Callers should treat this as fatal.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.to_string(),
                source: e,
            })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            config,
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections until the process terminates.
    ///
    /// All registration on `router` must be complete before calling this; the
    /// table is shared read-only across workers from here on. Each accepted
    /// connection becomes a task that first claims a worker-pool permit, so at
    /// most `config.workers` connections are serviced at once and the rest
    /// queue without blocking acceptance.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] only if the listener itself fails
    /// unrecoverably; per-connection failures are logged and absorbed.
    pub async fn run(self, router: Router) -> Result<(), ServerError> {
        let router = Arc::new(router);
        let files = Arc::new(StaticFiles::new(&self.config.static_root));
        let pool = Arc::new(Semaphore::new(self.config.workers));
        let read_limit = self.config.read_limit;

        info!(
            address = %self.local_addr,
            workers = self.config.workers,
            routes = router.len(),
            "servlite listening"
        );

        loop {
            let (stream, peer_addr) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            let router = Arc::clone(&router);
            let files = Arc::clone(&files);
            let pool = Arc::clone(&pool);

            tokio::spawn(async move {
                // Worker-pool slot. Accepted connections wait here, unbounded,
                // while all workers are busy. The semaphore is never closed.
                let Ok(_permit) = pool.acquire_owned().await else {
                    return;
                };
                debug!(peer = %peer_addr, "connection accepted");

                if let Err(e) = handle_connection(stream, peer_addr, router, files, read_limit).await
                {
                    warn!(peer = %peer_addr, error = %e, "connection dropped");
                }
            });
        }
    }
}

/// Runs one connection through the request state machine.
///
/// Parse failures from client input become a single 400; a peer that
/// disconnects without sending anything is closed silently; I/O failures
/// propagate and the connection is dropped without a response. Both socket
/// halves close when this function returns, whichever path was taken.
async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    router: Arc<Router>,
    files: Arc<StaticFiles>,
    read_limit: usize,
) -> std::io::Result<()> {
    let (mut read_half, write_half) = stream.into_split();
    let mut responder = Responder::new(Box::new(write_half) as ResponseSink);

    let request = match parser::read_request(&mut read_half, read_limit).await {
        Ok(request) => request,
        Err(ParseError::ConnectionClosed) => {
            debug!(peer = %peer_addr, "closed by peer before sending a request");
            return Ok(());
        }
        Err(ParseError::Io(e)) => return Err(e),
        Err(e) => {
            warn!(peer = %peer_addr, error = %e, "bad request, sending 400");
            return responder.send_status(StatusCode::BadRequest).await;
        }
    };

    debug!(
        peer = %peer_addr,
        method = %request.method(),
        path = %request.path(),
        "dispatching request"
    );

    if let Some(handler) = router.lookup(request.method(), request.path()) {
        // The handler owns the responder and must write the response.
        return handler(request, responder).await;
    }

    files.serve(request.path(), &mut responder).await
}
