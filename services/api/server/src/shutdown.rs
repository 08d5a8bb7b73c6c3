use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio::sync::Notify;
use tracing::{info, warn};

/// Flags the service as draining and releases `axum::serve`'s graceful
/// shutdown future. There are no pools or caches to close.
#[derive(Default)]
pub struct ShutdownCoordinator {
    notify: Arc<Notify>,
    shutting_down: AtomicBool,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn wait_for_shutdown(&self) {
        let notified = self.notify.notified();
        if self.is_shutting_down() {
            return;
        }
        notified.await;
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Relaxed)
    }

    pub fn shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::Relaxed) {
            warn!("Shutdown already called");
            return;
        }

        info!("Initiating graceful shutdown sequence");
        self.notify.notify_waiters();
    }
}

pub async fn listen_for_shutdown_signals() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }

    info!("signal received, starting graceful shutdown");
}
