//! Transient banners and inline result messages.
//!
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A banner shown in the top-right corner until `expires_at`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: Instant,
}

/// Holds at most one banner; a new one replaces the old.
#[derive(Clone, Debug)]
pub struct Notifier {
    current: Option<Notice>,
    duration: Duration,
    error_duration: Duration,
}

impl Notifier {
    pub fn new(duration: Duration, error_duration: Duration) -> Self {
        Self {
            current: None,
            duration,
            error_duration,
        }
    }

    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) {
        let ttl = match kind {
            NoticeKind::Error => self.error_duration,
            NoticeKind::Success => self.duration,
        };
        self.push_for(kind, message, ttl, now);
    }

    pub fn push_for(&mut self, kind: NoticeKind, message: impl Into<String>, ttl: Duration, now: Instant) {
        let message = message.into();
        match kind {
            NoticeKind::Error => tracing::warn!(%message, "error notice"),
            NoticeKind::Success => tracing::debug!(%message, "notice"),
        }
        self.current = Some(Notice {
            kind,
            message,
            expires_at: now + ttl,
        });
    }

    pub fn expire(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|n| n.expires_at <= now) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Progress,
    Success,
    Error,
}

/// Text shown in a dialog's result area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl ResultMessage {
    pub fn progress(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Progress, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Error, text: text.into() }
    }
}
