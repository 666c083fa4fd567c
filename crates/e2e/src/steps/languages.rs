//! Language list step bindings
//!
//! Creation and update bindings append the resulting (name, level) pair
//! to the scenario ledger so post-clean can delete precisely what this
//! scenario added. The unsafe-input bindings live here too: they submit
//! without waiting for confirmation, so a script dialog raised by the
//! submission is still open and observable when the policy assertion
//! runs.

use std::time::Duration;

use parking_lot::Mutex;

use skillfolio_harness::error::{HarnessError, HarnessResult};
use skillfolio_harness::pages::ListTab;
use skillfolio_harness::record::{Ledger, Record};
use skillfolio_harness::session::Driver;
use skillfolio_harness::text;

use crate::steps::{LogBuffer, LogSource};

pub const SECURITY_POLICY: &str = "POLICY EXPECTATION: Unsafe input must be rejected server-side; \
     no record created or displayed. Enforce strict allowlist validation and HTML-encode on render.";

pub struct LanguageSteps {
    page: ListTab,
    driver: Driver,
    ledger: Mutex<Ledger>,
    last_submitted: Mutex<Option<Record>>,
    logs: LogBuffer,
}

impl LanguageSteps {
    pub fn new(page: ListTab, driver: Driver) -> Self {
        LanguageSteps {
            page,
            driver,
            ledger: Mutex::new(Ledger::new()),
            last_submitted: Mutex::new(None),
            logs: LogBuffer::default(),
        }
    }

    pub fn page(&self) -> &ListTab {
        &self.page
    }

    pub fn ledger(&self) -> &Mutex<Ledger> {
        &self.ledger
    }

    /// Open the Languages tab.
    pub async fn open_tab(&self) -> HarnessResult<()> {
        self.page.open().await
    }

    /// Add a language and track it for cleanup.
    pub async fn add(&self, name: &str, level: &str) -> HarnessResult<()> {
        self.page.create(&Record::new(name, level)).await?;
        self.ledger.lock().track(Record::new(name, level));
        self.logs.info(format!("Added language: {name} / {level}"));
        Ok(())
    }

    /// Change the level of the row matching (name, old_level). The new
    /// pair is tracked; the superseded one stays in the ledger and its
    /// tracked delete at teardown becomes a logged skip.
    pub async fn update(&self, name: &str, old_level: &str, new_level: &str) -> HarnessResult<()> {
        self.page.update(&Record::new(name, old_level), new_level).await?;
        self.ledger.lock().track(Record::new(name, new_level));
        self.logs.info(format!("Changed language {name} level to: {new_level}"));
        Ok(())
    }

    /// Delete the row matching the pair.
    pub async fn delete(&self, name: &str, level: &str) -> HarnessResult<()> {
        self.page.delete_record(&Record::new(name, level)).await?;
        self.logs.info(format!("Deleted language: {name} / {level}"));
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

    /// The pair is present at least once.
    pub async fn expect_present(&self, name: &str, level: &str) -> HarnessResult<()> {
        let count = self.page.count_with_level(name, level).await?;
        if count == 0 {
            return Err(HarnessError::assertion(
                format!("could not find language '{name}' with level '{level}'"),
                self.page.summary().await?,
            ));
        }
        self.logs.info(format!("Verified present: {name} / {level}"));
        Ok(())
    }

    /// No row with this name remains, whatever its level.
    pub async fn expect_absent(&self, name: &str) -> HarnessResult<()> {
        let rows = self.page.list().await?;
        if rows.iter().any(|r| text::eq_norm(&r.name, name)) {
            return Err(HarnessError::assertion(
                format!("language '{name}' is still present after delete"),
                skillfolio_harness::record::summary(&rows),
            ));
        }
        self.logs.info(format!("Verified absent: {name}"));
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

    /// Log the bottom row of the table; diagnostic only.
    pub async fn print_last(&self) -> HarnessResult<()> {
        let rows = self.page.list().await?;
        match rows.last() {
            Some(last) => self
                .logs
                .info(format!("LANGUAGE -> {} | LEVEL -> {}", last.name, last.level)),
            None => self.logs.info("(no languages to print)"),
        }
        Ok(())
    }

    /// Submit a potentially unsafe payload with no confirmation wait.
    /// `{DQ}`/`{EQ:n}` placeholders are decoded first.
    pub async fn submit_unsafe(&self, name: &str, level: &str) -> HarnessResult<()> {
        let name = text::decode_placeholders(name);
        let level = text::decode_placeholders(level);
        self.page.submit_raw(&name, &level).await?;
        self.logs.info(format!("Submitted unsafe payload: {name} / {level}"));
        *self.last_submitted.lock() = Some(Record::new(name.clone(), level.clone()));
        self.ledger.lock().track(Record::new(name, level));
        Ok(())
    }

    /// Log dialog presence and row persistence after an unsafe
    /// submission, dismissing any dialog; never fails.
    pub async fn check_unsafe_outcome(&self) -> HarnessResult<()> {
        match self.driver.try_alert_text(Duration::from_secs(2)).await {
            Some(dialog) => {
                self.logs.info(format!("[ALERT DETECTED] dialog text: '{dialog}'"));
                self.driver.try_dismiss_alert().await;
            }
            None => self.logs.info("[NO ALERT DETECTED]"),
        }

        let submitted = self.last_submitted.lock().clone();
        let Some(rec) = submitted else {
            self.logs.info("(no unsafe submission recorded)");
            return Ok(());
        };
        let count = self.page.count_with_level(&rec.name, &rec.level).await?;
        if count > 0 {
            self.logs.info(format!(
                "[ROW FOUND] unsafe input was persisted: '{}' / '{}'",
                rec.name, rec.level
            ));
        } else {
            self.logs.info(format!(
                "[NO ROW FOUND] unsafe input did not persist: '{}' / '{}'",
                rec.name, rec.level
            ));
        }
        self.logs.info(format!("[FULL TABLE] {}", self.page.summary().await?));
        Ok(())
    }

    /// Policy assertion: the unsafe submission raised no dialog and
    /// persisted no row. A visible dialog is itself the failure.
    pub async fn expect_unsafe_rejected(&self) -> HarnessResult<()> {
        if let Some(dialog) = self.driver.try_alert_text(Duration::from_secs(1)).await {
            // Accept it so teardown is not left blocked.
            self.driver.try_dismiss_alert().await;
            return Err(HarnessError::DialogBlocking(format!(
                "{SECURITY_POLICY}\n\
                 Violation: a script dialog opened during unsafe input submission (XSS).\n\
                 Dialog text: '{dialog}'\n\
                 Expected: no dialog; input treated as data, not code."
            )));
        }

        let submitted = self.last_submitted.lock().clone();
        let Some(rec) = submitted else {
            return Err(HarnessError::assertion(
                "no unsafe submission was recorded by an earlier step",
                self.page.summary().await?,
            ));
        };
        let count = self.page.count_with_level(&rec.name, &rec.level).await?;
        if count > 0 {
            return Err(HarnessError::assertion(
                format!(
                    "{SECURITY_POLICY}\n\
                     Violation: unsafe input was persisted. Found '{}' @ '{}' {} time(s).\n\
                     Expected: 0 matching records.",
                    rec.name, rec.level, count
                ),
                self.page.summary().await?,
            ));
        }
        self.logs
            .info("Policy OK: unsafe input rejected (no dialog, no record persisted)");
        Ok(())
    }
}

impl LogSource for LanguageSteps {
    fn take_logs(&self) -> Vec<String> {
        self.logs.take()
    }
}
