//! # moor
//!
//! A minimal HTTP server for services that do not own their lifecycle.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! The embedding process decides *when* to stop — an OS signal handler, a
//! supervisor, an orchestrator, a test harness. moor decides *how* to stop:
//! stop accepting, drain what is in flight, fold everything that happened
//! into a single returned `Result`.
//!
//! What the embedder owns — moor intentionally ignores:
//!
//! - **Shutdown policy** — which signal, which deadline, which supervisor
//! - **Routing and middleware** — moor serves exactly one handler
//! - **TLS termination** — the proxy or ingress in front of you
//! - **Request validation** — your handler's business, not moor's
//!
//! What's left for moor — the only part that is easy to get wrong:
//!
//! - One serving task, spawned once, joined exactly once
//! - A cancellation token as the sole shutdown trigger
//! - Graceful drain — in-flight connections finish before [`Server::serve`]
//!   returns
//! - One terminal error: the serve loop's outcome, never the shutdown's
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use moor::{greet, Server};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cancel = CancellationToken::new();
//!
//!     // Hand `cancel.clone()` to whatever decides when the process stops.
//!     Server::bind("0.0.0.0:18080")
//!         .serve(greet, cancel)
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! Handlers are plain async functions:
//!
//! ```rust
//! use moor::{Request, Response};
//!
//! async fn hello(req: Request) -> Response {
//!     Response::text(format!("you asked for {}", req.path()))
//! }
//! ```

mod error;
mod greet;
mod handler;
mod request;
mod response;
mod server;

pub use error::Error;
pub use greet::greet;
pub use handler::Handler;
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use server::Server;
