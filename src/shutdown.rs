//! OS signal handling.
//!
//! SIGINT and SIGTERM both cancel the shared shutdown token. Nothing else
//! happens on the signal path; the console loop and the idle waiter observe
//! the token and drive the teardown.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawn a task that cancels `token` on the first SIGINT or SIGTERM.
pub fn listen_for_signals(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            signal = wait_for_signal() => {
                match signal {
                    Ok(name) => tracing::info!("Received exit signal {}", name),
                    Err(e) => tracing::warn!("Signal listener failed, shutting down: {}", e),
                }
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "SIGINT")
}
