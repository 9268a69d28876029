//! Transient user notifications.
//!
//! Every notification also goes to the tracing log at a level matching its
//! kind, so headless runs keep the full event trail. Notifications expire
//! after a fixed TTL or on explicit dismissal; expiry is enforced lazily on
//! read. There is no cap: a fast failure loop can flood the list, which is
//! an accepted limitation.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{error, info, warn};

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_millis(5000);

/// Notification category, mirrored as a CSS class by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    Success,
    Error,
    Warning,
    Info,
}

/// One transient notification.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Random id, u32 so the shell can echo it back losslessly as a JS
    /// number.
    pub id: u32,
    pub kind: NotifyKind,
    pub message: String,
    #[serde(skip)]
    created: Instant,
}

/// Append-only sink for transient notifications.
#[derive(Debug)]
pub struct NotificationSink {
    ttl: Duration,
    items: Mutex<Vec<Notification>>,
}

impl Default for NotificationSink {
    fn default() -> Self {
        Self::with_ttl(NOTIFICATION_TTL)
    }
}

impl NotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            items: Mutex::new(Vec::new()),
        }
    }

    /// Record a notification and log it. Returns the notification id.
    pub fn notify(&self, kind: NotifyKind, message: impl Into<String>) -> u32 {
        let message = message.into();
        match kind {
            NotifyKind::Success => info!("Notification: {}", message),
            NotifyKind::Error => error!("Notification: {}", message),
            NotifyKind::Warning => warn!("Notification: {}", message),
            NotifyKind::Info => info!("Notification: {}", message),
        }

        let id = rand::random();
        self.items.lock().unwrap().push(Notification {
            id,
            kind,
            message,
            created: Instant::now(),
        });
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u32 {
        self.notify(NotifyKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u32 {
        self.notify(NotifyKind::Error, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u32 {
        self.notify(NotifyKind::Warning, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u32 {
        self.notify(NotifyKind::Info, message)
    }

    /// Currently visible notifications, oldest first. Expired entries are
    /// pruned on the way out.
    pub fn active(&self) -> Vec<Notification> {
        let mut items = self.items.lock().unwrap();
        let ttl = self.ttl;
        items.retain(|n| n.created.elapsed() < ttl);
        items.clone()
    }

    /// Dismiss by id. Returns whether anything was removed.
    pub fn dismiss(&self, id: u32) -> bool {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|n| n.id != id);
        items.len() != before
    }
}
