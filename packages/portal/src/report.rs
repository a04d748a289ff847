//! Classification of failures for the shared error reporter.

use std::fmt::Display;

/// Fallback text for errors that carry nothing useful.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorReport {
    HasMessage(String),
    Unknown,
}

impl ErrorReport {
    /// An error "has a message" when its `Display` output is non-blank.
    pub fn classify(err: &impl Display) -> Self {
        let message = err.to_string();
        let trimmed = message.trim();
        if trimmed.is_empty() {
            ErrorReport::Unknown
        } else {
            ErrorReport::HasMessage(trimmed.to_string())
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ErrorReport::HasMessage(m) => m,
            ErrorReport::Unknown => UNKNOWN_ERROR,
        }
    }

    /// Prefix the message with where it happened, e.g. "Loading gallery: timeout".
    pub fn with_context(&self, context: &str) -> String {
        if context.is_empty() {
            self.message().to_string()
        } else {
            format!("{context}: {}", self.message())
        }
    }
}
