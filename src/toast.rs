//! Toast notifications.
//!
//! A [`ToastHost`] lives at the application root; views get cheap [`Toaster`]
//! handles and can only enqueue. The host prints queued toasts when drained and
//! when it is torn down.

use colored::*;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Toast {
    pub(crate) level: ToastLevel,
    pub(crate) message: String,
}

#[derive(Clone)]
pub(crate) struct Toaster {
    tx: UnboundedSender<Toast>,
}

impl Toaster {
    pub(crate) fn enqueue(&self, level: ToastLevel, message: impl Into<String>) {
        let toast = Toast {
            level,
            message: message.into(),
        };
        if self.tx.send(toast).is_err() {
            debug!("toast host already torn down");
        }
    }

    pub(crate) fn info(&self, message: impl Into<String>) {
        self.enqueue(ToastLevel::Info, message);
    }

    pub(crate) fn success(&self, message: impl Into<String>) {
        self.enqueue(ToastLevel::Success, message);
    }

    pub(crate) fn error(&self, message: impl Into<String>) {
        self.enqueue(ToastLevel::Error, message);
    }
}

pub(crate) struct ToastHost {
    rx: UnboundedReceiver<Toast>,
}

pub(crate) fn channel() -> (Toaster, ToastHost) {
    let (tx, rx) = unbounded_channel();
    (Toaster { tx }, ToastHost { rx })
}

impl ToastHost {
    /// Take every queued toast, oldest first
    pub(crate) fn drain(&mut self) -> Vec<Toast> {
        let mut toasts = Vec::new();
        while let Ok(toast) = self.rx.try_recv() {
            toasts.push(toast);
        }
        toasts
    }

    /// Print queued toasts to stderr
    pub(crate) fn flush(&mut self) {
        for toast in self.drain() {
            eprintln!("{} {}", badge(toast.level), toast.message);
        }
    }
}

impl Drop for ToastHost {
    fn drop(&mut self) {
        self.flush();
    }
}

fn badge(level: ToastLevel) -> ColoredString {
    match level {
        ToastLevel::Info => "[info]".blue().bold(),
        ToastLevel::Success => "[ok]".green().bold(),
        ToastLevel::Error => "[error]".red().bold(),
    }
}
