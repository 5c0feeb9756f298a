use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, trace};

use crate::backend::{ChangeKind, ChangeNotification};

/// Default quiet window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// A refresh the explorer should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    /// Folder to refresh first.
    pub path: String,
    /// Bypasses debouncing; also re-lists the root.
    pub forced: bool,
}

/// Coalesces bursts of structural change notifications into one trailing
/// refresh.
///
/// The refresh target is read when the timer fires, not when it is armed,
/// so navigating during the quiet window refreshes the new location.
pub struct ChangeNotificationDebouncer {
    window: Duration,
    target: watch::Receiver<String>,
    deadline: Option<Instant>,
    connected: bool,
    ever_connected: bool,
}

impl ChangeNotificationDebouncer {
    pub fn new(window: Duration, target: watch::Receiver<String>) -> Self {
        Self {
            window,
            target,
            deadline: None,
            connected: false,
            ever_connected: false,
        }
    }

    pub fn with_default_window(target: watch::Receiver<String>) -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS), target)
    }

    /// When the pending refresh fires, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn current_target(&self) -> String {
        self.target.borrow().clone()
    }

    /// Record a notification; structural kinds (re)arm the quiet window.
    pub fn on_notification(&mut self, notification: &ChangeNotification, now: Instant) {
        if !self.connected {
            debug!(kind = ?notification.kind, "not connected; notification dropped");
            return;
        }
        let kind = &notification.kind;
        if kind.is_structural() {
            trace!(?kind, paths = ?notification.paths, "structural change; rearming refresh");
            self.deadline = Some(now + self.window);
        } else if let ChangeKind::Unknown(name) = kind {
            debug!(event = %name, "ignoring unrecognized change event");
        } else {
            debug!(paths = ?notification.paths, "content-only change; no refresh");
        }
    }

    /// Record a connectivity change.
    ///
    /// Disconnecting drops any pending refresh. Connecting again after a
    /// disconnect returns one forced refresh, since notifications sent while
    /// offline are lost.
    pub fn on_connectivity(&mut self, connected: bool) -> Option<RefreshRequest> {
        if self.connected == connected {
            return None;
        }
        self.connected = connected;

        if !connected {
            if self.deadline.take().is_some() {
                debug!("disconnected; pending refresh cleared");
            }
            info!("change notifications paused: disconnected");
            return None;
        }

        let reconnect = self.ever_connected;
        self.ever_connected = true;
        if !reconnect {
            info!("change notifications active");
            return None;
        }
        let path = self.current_target();
        info!(path = %path, "reconnected; forcing refresh");
        Some(RefreshRequest { path, forced: true })
    }

    /// Fire the pending refresh if its window has elapsed.
    pub fn poll_expired(&mut self, now: Instant) -> Option<RefreshRequest> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                let path = self.current_target();
                debug!(path = %path, "quiet window elapsed; refreshing");
                Some(RefreshRequest {
                    path,
                    forced: false,
                })
            }
            _ => None,
        }
    }

    /// Drive the debouncer until the notification stream closes.
    pub async fn run(
        mut self,
        mut notifications: mpsc::UnboundedReceiver<ChangeNotification>,
        mut connectivity: watch::Receiver<bool>,
        requests: mpsc::UnboundedSender<RefreshRequest>,
    ) {
        let initial = *connectivity.borrow_and_update();
        if let Some(request) = self.on_connectivity(initial) {
            if requests.send(request).is_err() {
                return;
            }
        }
        let mut connectivity_open = true;

        loop {
            let deadline = self.deadline;
            let timer = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            let request = tokio::select! {
                biased;
                changed = connectivity.changed(), if connectivity_open => {
                    match changed {
                        Ok(()) => {
                            let connected = *connectivity.borrow_and_update();
                            self.on_connectivity(connected)
                        }
                        Err(_) => {
                            connectivity_open = false;
                            None
                        }
                    }
                }
                notification = notifications.recv() => match notification {
                    Some(notification) => {
                        self.on_notification(&notification, Instant::now());
                        None
                    }
                    None => break,
                },
                _ = timer => self.poll_expired(Instant::now()),
            };

            if let Some(request) = request {
                if requests.send(request).is_err() {
                    break;
                }
            }
        }
        debug!("change notification stream closed");
    }
}
