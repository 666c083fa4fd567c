//! Page objects, one per UI surface
//!
//! Each page hides its element-location detail behind domain actions.
//! Read-style queries (toast text, table snapshots) never raise for
//! "not present"; they return empty values and leave the judgment to the
//! caller's assertions.

use async_trait::async_trait;

use crate::error::HarnessResult;
use crate::record::Record;

pub mod login;
pub mod overview;
pub mod tab;

pub use login::LoginPage;
pub use overview::OverviewPage;
pub use tab::{languages, skills, ListTab, TabLocators};

/// Toast notifications share one widget across every surface.
pub(crate) const SUCCESS_TOAST: &str =
    "//div[contains(@class,'ns-box') and contains(@class,'ns-type-success')]";
pub(crate) const ERROR_TOAST: &str =
    "//div[contains(@class,'ns-box') and contains(@class,'ns-type-error')]";

/// The operations cleanup needs from a profile list, kept narrow so the
/// reconciliation pass can run against a fake in tests.
#[async_trait]
pub trait ProfileList {
    /// Label for logs and diagnostics ("languages", "skills").
    fn list_name(&self) -> &'static str;

    /// Best-effort snapshot of the current rows, top to bottom.
    async fn list(&self) -> HarnessResult<Vec<Record>>;

    /// Remove one row matching the record pair.
    async fn delete_record(&self, record: &Record) -> HarnessResult<()>;

    /// Unconditional wipe; returns how many rows were removed.
    async fn delete_all(&self) -> HarnessResult<usize>;
}
