//! Error types for the Skillfolio harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Browser session could not be provisioned: {0}")]
    Provisioning(String),

    #[error("Endpoint unreachable after {0} attempts")]
    Unreachable(usize),

    #[error("Confirmation wait expired: {0}")]
    ActionTimeout(String),

    #[error("Assertion failed: {message}\n  observed: [{snapshot}]")]
    AssertionFailed { message: String, snapshot: String },

    #[error("Tracked cleanup of {name}/{level} failed: {reason}")]
    CleanupItem {
        name: String,
        level: String,
        reason: String,
    },

    #[error("Unexpected native dialog is open: {0}")]
    DialogBlocking(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),
}

impl HarnessError {
    /// Assertion failure carrying the current table contents for diagnosis.
    pub fn assertion(message: impl Into<String>, snapshot: impl Into<String>) -> Self {
        HarnessError::AssertionFailed {
            message: message.into(),
            snapshot: snapshot.into(),
        }
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
