mod error;

pub use self::error::Error;

pub type Result<T = ()> = std::result::Result<T, error::Error>;

pub struct RuntimeContext {
    /// Runtime event bus.
    pub shutdown: (
        tokio::sync::broadcast::Sender<()>,
        tokio::sync::broadcast::Receiver<()>,
    ),
}

impl RuntimeContext {
    /// Construct a new runtime context.
    pub fn new() -> Self {
        Self {
            shutdown: tokio::sync::broadcast::channel(1),
        }
    }

    /// Install a termination handler.
    ///
    /// On Ctrl-C the shutdown signal is sent to every listener.
    pub fn with_shutdown(self) -> Self {
        let sender = self.shutdown.0.clone();

        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for termination: {}", e);
                return;
            }

            log::info!("Termination requested");

            sender.send(()).ok();
        });

        self
    }

    /// Listen for shutdown signal.
    pub fn shutdown_signal(&self) -> tokio::sync::broadcast::Receiver<()> {
        self.shutdown.0.subscribe()
    }

    /// Spawn an asynchronous task in the background.
    ///
    /// The task will be terminated when the runtime is shutdown or when the
    /// shutdown signal is received.
    pub fn spawn_background_task<T>(&self, task: T)
    where
        T: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown_signal();

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::debug!("Shutting down background task");
                }
                _ = task => {}
            }
        });
    }

    /// Wait for the runtime to shutdown.
    ///
    /// This method will block until the runtime is shutdown.
    pub fn wait_for_shutdown(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut shutdown = self.shutdown_signal();

        async move {
            shutdown.recv().await.ok();
        }
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_task_stops_on_shutdown() {
        let runtime = RuntimeContext::new();
        let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);

        runtime.spawn_background_task(async move {
            let _tx = tx;
            std::future::pending::<()>().await;
        });

        let shutdown = runtime.wait_for_shutdown();
        runtime.shutdown.0.send(()).ok();
        shutdown.await;

        // Sender is dropped once the task is cancelled.
        assert!(rx.recv().await.is_none());
    }
}
