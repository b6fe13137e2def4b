//! Shutdown signaling for the tail loop.

use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;

/// Broadcasts a stop request to the tail loop.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Create a new shutdown signal.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// A receiver that resolves once shutdown has been requested.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Request shutdown.
    pub fn shutdown(&self) {
        let _ = self.sender.send(());
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Block until the process receives SIGINT or SIGTERM.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), stopping tail loop");
        },
        _ = terminate => {
            info!("Received SIGTERM, stopping tail loop");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_reaches_subscriber() {
        let signal = ShutdownSignal::new();
        let mut rx = signal.subscribe();

        signal.shutdown();
        rx.recv().await.expect("subscriber should see the shutdown");
    }

    #[tokio::test]
    async fn test_shutdown_fans_out_to_all_subscribers() {
        let signal = ShutdownSignal::new();
        let mut loop_rx = signal.subscribe();
        let mut signal_task_rx = signal.subscribe();

        signal.shutdown();
        loop_rx
            .recv()
            .await
            .expect("tail loop receiver should see the shutdown");
        signal_task_rx
            .recv()
            .await
            .expect("second receiver should see the shutdown");
    }
}
