//! Transient user-facing notices backed by a `tokio::sync::broadcast` channel.
//!
//! Views publish a [`Notice`] when an action succeeds or fails; whatever
//! renders toasts subscribes. Notices are fire-and-forget: with no
//! subscriber they are dropped.

use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// One toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }
}

const DEFAULT_CAPACITY: usize = 64;

/// Fan-out channel for [`Notice`]s, shared via `Arc<NoticeBus>` or clone.
#[derive(Clone)]
pub struct NoticeBus {
    sender: broadcast::Sender<Notice>,
}

impl NoticeBus {
    /// When the buffer is full the oldest notices are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, notice: Notice) {
        // Zero receivers is not an error.
        let _ = self.sender.send(notice);
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) {
        self.publish(Notice::success(title, message));
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.publish(Notice::error(title, message));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
