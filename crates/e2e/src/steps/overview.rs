//! Profile overview step bindings

use skillfolio_harness::error::{HarnessError, HarnessResult};
use skillfolio_harness::pages::OverviewPage;
use skillfolio_harness::text;

use crate::steps::{LogBuffer, LogSource};

pub struct OverviewSteps {
    page: OverviewPage,
    logs: LogBuffer,
}

impl OverviewSteps {
    pub fn new(page: OverviewPage) -> Self {
        OverviewSteps {
            page,
            logs: LogBuffer::default(),
        }
    }

    /// Open the profile page from the header navigation.
    pub async fn open_profile(&self) -> HarnessResult<()> {
        self.page.open_profile().await
    }

    /// Replace both name fields through the basic-info editor.
    pub async fn edit_display_name(&self, first: &str, last: &str) -> HarnessResult<()> {
        self.page.edit_name(first, last).await?;
        self.logs.info(format!("Edited display name to: {first} {last}"));
        Ok(())
    }

    /// A success toast confirmed the save.
    pub async fn expect_success_toast(&self) -> HarnessResult<()> {
        let toast = self.page.success_toast().await;
        if toast.is_empty() {
            return Err(HarnessError::assertion(
                "expected a success toast after saving the profile name",
                format!("display name is '{}'", self.page.display_name().await),
            ));
        }
        self.logs.info(format!("Success toast: {toast}"));
        Ok(())
    }

    /// The rendered display name carries both given names.
    pub async fn expect_display_name(&self, first: &str, last: &str) -> HarnessResult<()> {
        let shown = text::normalize(&self.page.display_name().await).to_lowercase();
        let want_first = text::normalize(first).to_lowercase();
        let want_last = text::normalize(last).to_lowercase();
        if !shown.contains(&want_first) || !shown.contains(&want_last) {
            return Err(HarnessError::assertion(
                format!("expected the display name to show '{first} {last}'"),
                format!("display name is '{shown}'"),
            ));
        }
        self.logs.info(format!("Display name shows: {first} {last}"));
        Ok(())
    }
}

impl LogSource for OverviewSteps {
    fn take_logs(&self) -> Vec<String> {
        self.logs.take()
    }
}
