//! User-facing messages.
//!
//! Actions report what happened through a [`Notifier`] rather than returning
//! prose; the host decides whether that becomes a toast, a status line or a
//! line on stderr.

use derive_more::Display;
use std::sync::{Arc, Mutex};

pub type NotifierHandle = Arc<dyn Notifier + Send + Sync>;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    #[display("info")]
    Info,
    #[display("warning")]
    Warning,
    #[display("error")]
    Error,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.notify(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.notify(Level::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(Level::Error, message);
    }
}

/// Forwards messages to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!(target: "paperlink::notify", "{message}"),
            Level::Warning => tracing::warn!(target: "paperlink::notify", "{message}"),
            Level::Error => tracing::error!(target: "paperlink::notify", "{message}"),
        }
    }
}

/// Keeps every message in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<(Level, String)>>,
}

impl MemoryNotifier {
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<(Level, String)> {
        self.messages().pop()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, level: Level, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}
