// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! Installs handlers for SIGTERM and SIGINT (Ctrl+C), triggering a
//! [`CancellationToken`] that the dispatcher monitors. Queued uploads and
//! in-flight survey log writes are drained before the process exits.

use std::time::Duration;

use paddy_upload::UploadQueue;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is received.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = sigterm.recv() => {
                            info!("received SIGTERM, initiating shutdown");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Stops the upload queue and waits for detached jobs, up to `timeout`.
///
/// The queue finishes every task enqueued before the stop. Returns `false`
/// when the timeout expired with work still running.
pub async fn drain(uploads: &UploadQueue, jobs: &TaskTracker, timeout: Duration) -> bool {
    jobs.close();
    info!(
        queued_uploads = uploads.depth(),
        background_jobs = jobs.len(),
        "draining background work"
    );

    let drained = tokio::time::timeout(timeout, async {
        uploads.stop().await;
        jobs.wait().await;
    })
    .await
    .is_ok();

    if drained {
        info!("background work drained");
    } else {
        warn!(
            remaining_uploads = uploads.depth(),
            remaining_jobs = jobs.len(),
            "drain timeout reached, abandoning remaining work"
        );
    }
    drained
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn install_signal_handler_returns_token() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }
}
