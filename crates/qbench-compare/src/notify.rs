//! Human-readable status notifications.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// One message for the user.
///
/// A run emits zero or more progress notifications followed by exactly one
/// terminal notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    pub terminal: bool,
}

impl Notification {
    pub fn progress(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            terminal: false,
        }
    }

    pub fn terminal(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            terminal: true,
        }
    }
}

/// Where the orchestrator sends notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: Notification) {}
}

/// Keeps notifications in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    notifications: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification);
        }
    }
}
