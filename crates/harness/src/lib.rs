//! Skillfolio E2E Harness Library
//!
//! Shared plumbing for the Skillfolio browser test suite: session
//! provisioning, settings, page objects, cleanup reconciliation, and the
//! HTML report sink. Scenario definitions and the suite runner live in
//! the `skillfolio-e2e` crate.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod pages;
pub mod probe;
pub mod record;
pub mod report;
pub mod screenshot;
pub mod session;
pub mod text;

// Re-export commonly used types
pub use cleanup::{reconcile, CleanupOutcome};
pub use config::TestSettings;
pub use error::{HarnessError, HarnessResult};
pub use pages::{LoginPage, OverviewPage, ProfileList};
pub use record::{Ledger, Record};
pub use report::{ReportSink, StepKind};
pub use session::{Driver, Session};
