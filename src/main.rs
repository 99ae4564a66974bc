//! Process entry point.
//!
//! The binary is deliberately thin: it owns everything the library refuses
//! to — the port argument, the subscriber, the OS signal handler, and the
//! exit code. The library owns the lifecycle in between.
//!
//! Run on the default port, or pass one:
//!
//! ```text
//! moor        # listens on 0.0.0.0:18080
//! moor 8080   # listens on 0.0.0.0:8080
//! ```

use std::env;
use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use moor::{Server, greet};

/// Compiled-in fallback when no port argument is given.
const DEFAULT_PORT: u16 = 18080;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let port = match env::args().nth(1) {
        Some(arg) => match arg.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                error!(%arg, "invalid port argument");
                return ExitCode::from(2);
            }
        },
        None => DEFAULT_PORT,
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            info!("interrupt received, cancelling");
            cancel.cancel();
        }
    });

    if let Err(e) = Server::bind(&format!("0.0.0.0:{port}")).serve(greet, cancel).await {
        error!("failed to terminate server: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by service managers and
/// orchestrators) and **SIGINT** (Ctrl-C, for local dev). On Windows only
/// Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` is a future that never resolves — on non-Unix platforms
    // the SIGTERM arm is effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
