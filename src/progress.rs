//! Progress reporting for merge operations.
//!
//! A merge is long-running; the engine surfaces its phases through an
//! optional callback. Events are best-effort notifications: a missing
//! callback is legal and never affects the merge outcome, and the
//! reporter guarantees percent values are monotonically non-decreasing
//! within one operation.

use serde::{Deserialize, Serialize};

/// One in-flight progress notification.
///
/// Not persisted anywhere; events only exist for the duration of the
/// callback invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// Completion percentage, `0.0..=100.0`, non-decreasing within one
    /// operation.
    pub percent: f32,

    /// Human-readable phase label.
    pub status: String,

    /// Name of the file currently being processed, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_file: Option<String>,
}

/// Callback signature for progress notifications.
pub type ProgressCallback = dyn Fn(ProgressEvent) + Send + Sync;

/// Reporter that delivers [`ProgressEvent`]s for one operation.
///
/// Clamps percent values into `0..=100` and to be non-decreasing, so
/// callers can rely on the ordering guarantee even if phases report out
/// of order.
pub struct ProgressReporter<'a> {
    callback: Option<&'a ProgressCallback>,
    last_percent: f32,
}

impl<'a> ProgressReporter<'a> {
    /// Create a reporter for one operation.
    pub fn new(callback: Option<&'a ProgressCallback>) -> Self {
        Self {
            callback,
            last_percent: 0.0,
        }
    }

    /// Report a phase without a current file.
    pub fn report(&mut self, percent: f32, status: impl Into<String>) {
        self.emit(percent, status.into(), None);
    }

    /// Report a phase attributed to a specific file.
    pub fn report_file(&mut self, percent: f32, status: impl Into<String>, file: &str) {
        self.emit(percent, status.into(), Some(file.to_string()));
    }

    /// The highest percent reported so far.
    pub fn percent(&self) -> f32 {
        self.last_percent
    }

    fn emit(&mut self, percent: f32, status: String, current_file: Option<String>) {
        let percent = percent.clamp(0.0, 100.0).max(self.last_percent);
        self.last_percent = percent;

        if let Some(callback) = self.callback {
            callback(ProgressEvent {
                percent,
                status,
                current_file,
            });
        }
    }
}
