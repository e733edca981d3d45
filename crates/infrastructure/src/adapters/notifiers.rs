//! Notification sink adapters.

use operadoras_application::ports::{Notification, NotificationSink};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Writes every notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        warn!(
            action = %notification.action,
            kind = notification.title(),
            status = ?notification.status,
            details = notification.details.as_deref().unwrap_or_default(),
            "{}",
            notification.message
        );
    }
}

/// Forwards notifications to a channel read by the presentation layer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiver its notifications arrive on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(error) = self.sender.send(notification) {
            debug!(action = %error.0.action, "notification dropped, receiver closed");
        }
    }
}
