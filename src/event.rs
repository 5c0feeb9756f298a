use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{ExplorerError, Result};
use crate::fs::debounce::RefreshRequest;

/// Events driving the watch loop of the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The debouncer decided a refresh is due.
    Refresh(RefreshRequest),
    /// Ctrl-C or an explicit stop.
    Shutdown,
}

/// Merges refresh requests and shutdown signals into one channel.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { rx, tx }
    }

    /// Get a sender clone for tasks that push events directly.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Forward debouncer output until either side goes away.
    pub fn forward_refreshes(&self, mut requests: mpsc::UnboundedReceiver<RefreshRequest>) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            while let Some(request) = requests.recv().await {
                if tx.send(Event::Refresh(request)).is_err() {
                    break;
                }
            }
            debug!("refresh request stream closed");
        });
    }

    /// Turn Ctrl-C into [`Event::Shutdown`].
    pub fn listen_for_shutdown(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(Event::Shutdown);
            }
        });
    }

    /// Receive the next event (blocks until available).
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| ExplorerError::Transport("event channel closed".into()))
    }
}
