/// Server loop with bounded graceful shutdown
///
/// `axum::serve` drains connections on shutdown but waits indefinitely.
/// [`serve_with_grace`] puts an upper bound on that drain: once the shutdown
/// signal fires, in-flight requests get `grace` to finish before the server
/// task is aborted.

use std::{future::Future, io, time::Duration};

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors from running the server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Accept loop or listener failure
    #[error("server error: {0}")]
    Io(#[from] io::Error),

    /// Requests were still running when the grace period ended
    #[error("graceful shutdown did not finish within {0:?}")]
    GraceExpired(Duration),
}

/// Serves `router` on `listener` until `signal` resolves, then drains
///
/// # Errors
///
/// - [`ServerError::Io`] if the server fails while running
/// - [`ServerError::GraceExpired`] if connections outlive `grace`
pub async fn serve_with_grace<F>(
    listener: TcpListener,
    router: Router,
    signal: F,
    grace: Duration,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let server_token = token.clone();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { server_token.cancelled().await })
            .await
    });

    tokio::select! {
        result = &mut server => {
            // Server stopped before any shutdown signal
            return flatten(result);
        }
        _ = signal => {
            info!(grace_seconds = grace.as_secs_f64(), "Shutdown signal received, draining connections");
        }
    }

    token.cancel();

    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => {
            flatten(result)?;
            info!("Server stopped gracefully");
            Ok(())
        }
        Err(_) => {
            warn!("Grace period expired, aborting remaining connections");
            server.abort();
            Err(ServerError::GraceExpired(grace))
        }
    }
}

fn flatten(result: Result<io::Result<()>, tokio::task::JoinError>) -> Result<(), ServerError> {
    match result {
        Ok(inner) => inner.map_err(ServerError::from),
        Err(join_err) => Err(ServerError::Io(io::Error::new(io::ErrorKind::Other, join_err))),
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
