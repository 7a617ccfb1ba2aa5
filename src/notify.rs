//! User-facing notifications emitted by the engine.

use std::fmt;

use tracing::info;

/// Notification texts the engine can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Neither links nor media were offered.
    NoItems,
    /// Exactly one download was queued.
    QueuedOne,
    /// Several downloads were queued.
    QueuedMany(usize),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoItems => write!(f, "No links or media found to download"),
            Self::QueuedOne => write!(f, "Queued download"),
            Self::QueuedMany(count) => write!(f, "Queued {count} downloads"),
        }
    }
}

/// A notification with an optional icon reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub icon: Option<String>,
    pub message: Message,
}

impl Notice {
    /// Notice without an icon.
    #[must_use]
    pub fn new(message: Message) -> Self {
        Self {
            icon: None,
            message,
        }
    }

    /// Picks the singular or plural "queued" message for `count` records.
    ///
    /// Returns `None` for zero records.
    #[must_use]
    pub fn queued(count: usize) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Self::new(Message::QueuedOne)),
            n => Some(Self::new(Message::QueuedMany(n))),
        }
    }
}

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        info!(icon = ?notice.icon, "{}", notice.message);
    }
}
