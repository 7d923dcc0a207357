//! User-facing notifications.
//!
//! The navigator only describes what to show; rendering and dismissal are
//! left to the presentation layer.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "✅",
            Self::Error => "❌",
            Self::Warning => "⚠️",
            Self::Info => "ℹ️",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        f.write_str(name)
    }
}

/// A short, dismissable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity.icon(), self.title, self.message)
    }
}

/// Display timing for notifications. UX defaults, not a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTiming {
    /// Delay before the entry animation starts.
    pub enter_after: Duration,
    /// How long the notification stays visible.
    pub visible_for: Duration,
    /// Delay between hiding and removal.
    pub remove_after: Duration,
}

impl NotificationTiming {
    /// Time from creation until the notification is gone.
    pub fn total(&self) -> Duration {
        self.visible_for + self.remove_after
    }
}

impl Default for NotificationTiming {
    fn default() -> Self {
        Self {
            enter_after: Duration::from_millis(100),
            visible_for: Duration::from_secs(5),
            remove_after: Duration::from_millis(300),
        }
    }
}
