//! HTTP server and the lifecycle that runs it.
//!
//! # One task, one signal, one result
//!
//! [`Server::serve`] is a lifecycle coordinator, not a loop. It spawns the
//! accept-and-serve loop on its own tokio task, then does exactly two things:
//!
//! 1. Wait for the caller's [`CancellationToken`] to fire.
//! 2. Tell the serving task to drain, wait for it to finish, and return its
//!    outcome.
//!
//! The server reacts to cancellation by:
//! 1. Immediately stopping `listener.accept()` — no new connections are made.
//! 2. Letting every in-flight connection task run to completion.
//! 3. Returning from [`Server::serve`], which lets the embedder exit cleanly.
//!
//! Cancelling before the first connection, or several times over, is fine:
//! the token is edge-triggered and idempotent, and a server that has not yet
//! accepted anything drains an empty set and stops.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;

/// Where the server gets its socket from.
///
/// Two constructors, one coordinator: production code binds a fixed address,
/// tests and embedders inject a listener they already own. The lifecycle
/// logic never branches on which one it got.
enum Endpoint {
    /// Bind this address when `serve` starts.
    Addr(SocketAddr),
    /// Use a listener the caller has already bound.
    Bound(TcpListener),
}

impl Endpoint {
    async fn listen(self) -> std::io::Result<TcpListener> {
        match self {
            Self::Addr(addr) => TcpListener::bind(addr).await,
            Self::Bound(listener) => Ok(listener),
        }
    }
}

/// The HTTP server.
pub struct Server {
    endpoint: Endpoint,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// Binding happens inside `serve`, so an occupied port surfaces as an
    /// `Err` there — before any task is spawned — not here.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use moor::Server;
    /// let server = Server::bind("0.0.0.0:18080");
    /// ```
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { endpoint: Endpoint::Addr(addr) }
    }

    /// Configures the server to serve on a listener the caller already bound.
    ///
    /// This is the testable variant: bind `127.0.0.1:0` yourself, keep the
    /// address, hand the listener over.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn run() -> std::io::Result<()> {
    /// use moor::Server;
    /// use tokio::net::TcpListener;
    ///
    /// let listener = TcpListener::bind("127.0.0.1:0").await?;
    /// let server = Server::from_listener(listener);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { endpoint: Endpoint::Bound(listener) }
    }

    /// Serves `handler` until `cancel` fires, then shuts down gracefully.
    ///
    /// Returns the serving task's outcome, folded:
    ///
    /// - `Ok(())` — the loop exited because shutdown closed it.
    /// - `Err(Error::Io)` — binding failed (nothing was spawned), or the
    ///   accept loop died on its own.
    /// - `Err(Error::Task)` — the serving task panicked.
    ///
    /// A failure of the shutdown handoff itself is logged, never returned:
    /// it only happens when the serving task is already gone, and the join
    /// result carries the authoritative error for that.
    pub async fn serve(
        self,
        handler: impl Handler,
        cancel: CancellationToken,
    ) -> Result<(), Error> {
        let listener = self.endpoint.listen().await?;
        let addr = listener.local_addr()?;
        let handler = handler.into_boxed_handler();

        info!(%addr, "moor listening");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let mut serving = tokio::spawn(accept_loop(listener, handler, shutdown_rx));

        // Sole suspension point before shutdown begins. A serving task that
        // dies on its own ends the wait too; otherwise its handle would be
        // joined only after a cancellation that may never come.
        let premature = tokio::select! {
            biased;

            () = cancel.cancelled() => None,
            res = &mut serving => Some(res),
        };

        let outcome = match premature {
            Some(res) => res,
            None => {
                if shutdown_tx.send(()).is_err() {
                    // Receiver dropped: the accept loop already terminated.
                    // Its join result below is the real story.
                    warn!("shutdown requested but the server had already stopped");
                }
                serving.await
            }
        };

        match outcome {
            Ok(Ok(())) => {
                info!("moor stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                error!("serve loop failed: {e}");
                Err(e.into())
            }
            Err(e) => {
                error!("serving task died: {e}");
                Err(Error::Task(e))
            }
        }
    }
}

// ── Accept loop ───────────────────────────────────────────────────────────────

/// Accepts connections and dispatches them until told to shut down.
///
/// Runs on the spawned serving task. Exits `Ok(())` only via the shutdown
/// branch, after draining every in-flight connection; an accept failure exits
/// `Err` immediately.
async fn accept_loop(
    listener: TcpListener,
    handler: BoxedHandler,
    mut shutdown: oneshot::Receiver<()>,
) -> std::io::Result<()> {
    // JoinSet tracks every spawned connection task so we can wait for them
    // all to finish during graceful shutdown.
    let mut conns = tokio::task::JoinSet::new();

    loop {
        tokio::select! {
            // `biased` makes select! check arms top-to-bottom instead of
            // randomly. Shutdown is checked first so it wins even against a
            // backlog of queued connections — and even if it fired before the
            // loop's first poll.
            biased;

            _ = &mut shutdown => {
                info!(in_flight = conns.len(), "shutdown requested, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        return Err(e);
                    }
                };

                let handler = Arc::clone(&handler);
                // TokioIo adapts tokio's AsyncRead/AsyncWrite to the hyper
                // IO traits.
                let io = TokioIo::new(stream);

                conns.spawn(async move {
                    // `service_fn` turns a plain async function into a hyper
                    // `Service`, called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let handler = Arc::clone(&handler);
                        async move { respond(handler, req).await }
                    });

                    // `auto::Builder` transparently handles both HTTP/1.1
                    // and HTTP/2 — whatever the client negotiated.
                    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                        .serve_connection(io, svc)
                        .await
                    {
                        error!(peer = %remote_addr, "connection error: {e}");
                    }
                });
            }

            // Reap finished connection tasks so the JoinSet does not grow
            // without bound on long-running servers.
            Some(_) = conns.join_next(), if !conns.is_empty() => {}
        }
    }

    // Drain: wait for every in-flight connection to finish before we return.
    while conns.join_next().await.is_some() {}

    Ok(())
}

/// Core hot path: hands one request to the handler.
///
/// The error type is [`Infallible`](std::convert::Infallible) — handlers
/// produce responses, never errors, so hyper never sees a failure here.
async fn respond(
    handler: BoxedHandler,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, _body) = req.into_parts();
    let response = handler.call(Request::new(parts)).await;
    Ok(response.into_inner())
}
