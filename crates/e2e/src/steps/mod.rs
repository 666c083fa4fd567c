//! Step bindings
//!
//! Each binding performs one user-observable action or assertion.
//! Creation and update bindings append to their list's ledger; assertion
//! bindings never mutate UI state. Every binding struct buffers its
//! human-readable progress lines; the lifecycle drains them into the
//! current step's report node through the [`LogSource`] trait, so the
//! buffer is empty again when the next step begins.

use parking_lot::Mutex;
use tracing::info;

pub mod auth;
pub mod languages;
pub mod overview;
pub mod skills;

pub use auth::AuthSteps;
pub use languages::LanguageSteps;
pub use overview::OverviewSteps;
pub use skills::SkillSteps;

/// Per-binding buffer of progress lines destined for the report.
///
/// Lines are stored raw; the report sink escapes all text once at the
/// rendering boundary.
#[derive(Debug, Default)]
pub struct LogBuffer {
    lines: Mutex<Vec<String>>,
}

impl LogBuffer {
    pub fn info(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!("[INFO] {}", message);
        self.lines.lock().push(message.to_string());
    }

    /// Drain the buffer, leaving it empty.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }
}

/// A step-binding component whose buffered lines the lifecycle flushes
/// into the active step's report node.
pub trait LogSource {
    /// Get-and-clear in one move; the buffer restarts empty.
    fn take_logs(&self) -> Vec<String>;
}
