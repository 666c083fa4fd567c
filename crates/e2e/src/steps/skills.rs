//! Skill list step bindings

use parking_lot::Mutex;

use skillfolio_harness::error::{HarnessError, HarnessResult};
use skillfolio_harness::pages::ListTab;
use skillfolio_harness::record::{Ledger, Record};
use skillfolio_harness::text;

use crate::steps::{LogBuffer, LogSource};

const INVALID_ENTRY_MESSAGE: &str = "Please enter skill and experience level";

pub struct SkillSteps {
    page: ListTab,
    ledger: Mutex<Ledger>,
    /// Whether the last "invalid" level attempt found the option in the
    /// dropdown after all; reported alongside the error-toast assertion.
    invalid_level_was_listed: Mutex<bool>,
    logs: LogBuffer,
}

impl SkillSteps {
    pub fn new(page: ListTab) -> Self {
        SkillSteps {
            page,
            ledger: Mutex::new(Ledger::new()),
            invalid_level_was_listed: Mutex::new(false),
            logs: LogBuffer::default(),
        }
    }

    pub fn page(&self) -> &ListTab {
        &self.page
    }

    pub fn ledger(&self) -> &Mutex<Ledger> {
        &self.ledger
    }

    /// Open the Skills tab.
    pub async fn open_tab(&self) -> HarnessResult<()> {
        self.page.open().await
    }

    /// Add a skill and track it for cleanup.
    pub async fn add(&self, name: &str, level: &str) -> HarnessResult<()> {
        self.page.create(&Record::new(name, level)).await?;
        self.ledger.lock().track(Record::new(name, level));
        self.logs.info(format!("Added skill: {name} / {level}"));
        Ok(())
    }

    /// Add several (skill, level) pairs in table order.
    pub async fn add_table(&self, rows: &[(&str, &str)]) -> HarnessResult<()> {
        for (name, level) in rows {
            self.add(name, level).await?;
        }
        Ok(())
    }

    /// Change the level of the row matching (name, old_level).
    pub async fn update(&self, name: &str, old_level: &str, new_level: &str) -> HarnessResult<()> {
        self.page.update(&Record::new(name, old_level), new_level).await?;
        self.ledger.lock().track(Record::new(name, new_level));
        self.logs.info(format!("Updated skill {name} to level: {new_level}"));
        Ok(())
    }

    /// Delete the row matching the pair.
    pub async fn delete(&self, name: &str, level: &str) -> HarnessResult<()> {
        self.page.delete_record(&Record::new(name, level)).await?;
        self.logs.info(format!("Deleted skill: {name} / {level}"));
        Ok(())
    }

    /// Submit a skill whose level option is not expected to exist. The
    /// level is selected only if present; the form is submitted either
    /// way, driving the application's own validation.
    pub async fn attempt_invalid_level(&self, name: &str, level: &str) -> HarnessResult<()> {
        let name = text::decode_placeholders(name);
        let level = text::decode_placeholders(level);
        let listed = self.page.add_allowing_invalid_level(&name, &level).await?;
        *self.invalid_level_was_listed.lock() = listed;
        self.ledger.lock().track(Record::new(name.clone(), level.clone()));
        self.logs
            .info(format!("Attempted skill '{name}' with invalid level '{level}'"));
        Ok(())
    }

    /// A success toast is showing.
    pub async fn expect_success_toast(&self) -> HarnessResult<()> {
        let toast = self.page.success_toast().await;
        if toast.is_empty() {
            return Err(HarnessError::assertion(
                "expected a success toast",
                self.page.summary().await?,
            ));
        }
        self.logs.info(format!("Success toast: {toast}"));
        Ok(())
    }

    /// An error toast is showing, whatever its wording.
    pub async fn expect_error_toast(&self) -> HarnessResult<()> {
        let toast = self.page.error_toast().await;
        if toast.is_empty() {
            return Err(HarnessError::assertion(
                "expected an error toast but none appeared",
                self.page.summary().await?,
            ));
        }
        self.logs.info(format!("Error toast: {toast}"));
        Ok(())
    }

    /// The invalid-entry error toast is showing with its expected text.
    pub async fn expect_invalid_entry_error(&self) -> HarnessResult<()> {
        let toast = self.page.error_toast().await;
        if toast.is_empty() {
            return Err(HarnessError::assertion(
                "expected an error toast for an invalid skill or level, but none appeared",
                self.page.summary().await?,
            ));
        }
        if !text::normalize(&toast)
            .to_lowercase()
            .contains(&INVALID_ENTRY_MESSAGE.to_lowercase())
        {
            return Err(HarnessError::assertion(
                format!("unexpected error message '{toast}', expected '{INVALID_ENTRY_MESSAGE}'"),
                self.page.summary().await?,
            ));
        }
        if *self.invalid_level_was_listed.lock() {
            self.logs
                .info("Note: the 'invalid' level existed in the dropdown; server-side allowlist still rejected it");
        } else {
            self.logs.info("Level option was not listed in the dropdown, as expected");
        }
        Ok(())
    }

    /// The pair is present at least once.
    pub async fn expect_present(&self, name: &str, level: &str) -> HarnessResult<()> {
        let count = self.page.count_with_level(name, level).await?;
        if count == 0 {
            return Err(HarnessError::assertion(
                format!("missing skill {name}/{level}"),
                self.page.summary().await?,
            ));
        }
        self.logs.info(format!("Verified present: {name} / {level}"));
        Ok(())
    }

    /// No row matches the pair.
    pub async fn expect_absent(&self, name: &str, level: &str) -> HarnessResult<()> {
        let count = self.page.count_with_level(name, level).await?;
        if count > 0 {
            return Err(HarnessError::assertion(
                format!("found skill {name}/{level} {count} time(s) after it should be gone"),
                self.page.summary().await?,
            ));
        }
        self.logs.info(format!("Verified absent: {name} / {level}"));
        Ok(())
    }

    /// Exactly `expected` rows match the pair; duplicates count once each.
    pub async fn expect_count(&self, expected: usize, name: &str, level: &str) -> HarnessResult<()> {
        let actual = self.page.count_with_level(name, level).await?;
        if actual != expected {
            return Err(HarnessError::assertion(
                format!("expected {expected} occurrence(s) of {name}/{level} but found {actual}"),
                self.page.summary().await?,
            ));
        }
        Ok(())
    }

    /// The table holds exactly `expected` rows in total.
    pub async fn expect_row_total(&self, expected: usize) -> HarnessResult<()> {
        let rows = self.page.list().await?;
        if rows.len() != expected {
            return Err(HarnessError::assertion(
                format!("expected {expected} skill(s) but found {}", rows.len()),
                skillfolio_harness::record::summary(&rows),
            ));
        }
        Ok(())
    }
}

impl LogSource for SkillSteps {
    fn take_logs(&self) -> Vec<String> {
        self.logs.take()
    }
}
