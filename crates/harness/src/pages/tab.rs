//! Profile list tabs
//!
//! Languages and skills are the same widget rendered twice (tab panes
//! `first` and `second`), so one engine drives both, parameterized by a
//! selector set. Mutations follow the fail-visible policy: when a
//! confirmation wait expires the call returns unconfirmed with a warning
//! and the caller's next assertion surfaces the discrepancy.

use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::Locator;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::pages::{ProfileList, ERROR_TOAST, SUCCESS_TOAST};
use crate::record::{self, Record};
use crate::session::{Driver, POLL_INTERVAL};
use crate::text;

const EDIT_ICON: &str = "i.write.icon";
const DELETE_ICON: &str = "i.remove.icon";

/// Selector set distinguishing one tab pane from the other.
#[derive(Debug, Clone, Copy)]
pub struct TabLocators {
    pub label: &'static str,
    pub tab_link: &'static str,
    pub pane: &'static str,
    pub rows: &'static str,
    pub add_new: &'static str,
    pub name_input: &'static str,
    pub level_options: &'static str,
    pub add_button: &'static str,
    pub update_button: &'static str,
}

pub mod languages {
    use super::{Driver, ListTab, TabLocators};

    pub const LOCATORS: TabLocators = TabLocators {
        label: "languages",
        tab_link: "a[data-tab='first']",
        pane: "div[data-tab='first']",
        rows: "//div[@data-tab='first']//table//tbody/tr",
        add_new: "//div[@data-tab='first']//div[contains(@class,'ui') and contains(@class,'button') and normalize-space(.)='Add New']",
        name_input: "div[data-tab='first'] input[placeholder='Add Language']",
        level_options: "div[data-tab='first'] select[name='level'] option",
        add_button: "div[data-tab='first'] input.ui.teal.button[value='Add']",
        update_button: "div[data-tab='first'] input[value='Update']",
    };

    pub fn page(driver: Driver) -> ListTab {
        ListTab::new(driver, LOCATORS)
    }
}

pub mod skills {
    use super::{Driver, ListTab, TabLocators};

    pub const LOCATORS: TabLocators = TabLocators {
        label: "skills",
        tab_link: "a[data-tab='second']",
        pane: "div[data-tab='second']",
        rows: "//div[@data-tab='second']//table//tbody/tr",
        add_new: "//div[@data-tab='second']//div[contains(@class,'ui') and contains(@class,'button') and normalize-space(.)='Add New']",
        name_input: "div[data-tab='second'] input[placeholder='Add Skill']",
        level_options: "div[data-tab='second'] select[name='level'] option",
        add_button: "div[data-tab='second'] input.ui.teal.button[value='Add']",
        update_button: "div[data-tab='second'] input.ui.teal.button[value='Update']",
    };

    pub fn page(driver: Driver) -> ListTab {
        ListTab::new(driver, LOCATORS)
    }
}

/// One profile list tab.
pub struct ListTab {
    driver: Driver,
    loc: TabLocators,
}

impl ListTab {
    pub fn new(driver: Driver, loc: TabLocators) -> Self {
        ListTab { driver, loc }
    }

    pub fn label(&self) -> &'static str {
        self.loc.label
    }

    /// Click the tab link and wait for its pane.
    pub async fn open(&self) -> HarnessResult<()> {
        let what = format!("{} tab link", self.loc.label);
        self.driver
            .wait_for(Locator::Css(self.loc.tab_link), &what)
            .await?
            .click()
            .await?;
        let what = format!("{} pane", self.loc.label);
        self.driver
            .wait_for(Locator::Css(self.loc.pane), &what)
            .await?;
        Ok(())
    }

    /// Add a record and wait until its row shows up.
    pub async fn create(&self, rec: &Record) -> HarnessResult<()> {
        self.begin_entry(&rec.name).await?;
        self.select_level(&rec.level).await?;
        self.click_add().await?;
        if !self.wait_row_appears(&rec.name).await {
            warn!(
                "{} row for {} not confirmed before the wait expired",
                self.loc.label, rec
            );
        }
        Ok(())
    }

    /// Fill and submit with no confirmation wait. The security scenario
    /// uses this so a popup raised by the submission stays observable.
    pub async fn submit_raw(&self, name: &str, level: &str) -> HarnessResult<()> {
        self.begin_entry(name).await?;
        self.select_level(level).await?;
        self.click_add().await
    }

    /// Fill the form, selecting the level only when the option exists,
    /// and submit regardless. Returns whether the level was selectable.
    pub async fn add_allowing_invalid_level(&self, name: &str, level: &str) -> HarnessResult<bool> {
        self.begin_entry(name).await?;
        let existed = self.select_level_if_exists(level).await?;
        self.click_add().await?;
        Ok(existed)
    }

    /// Change the level of the row matching `rec`.
    pub async fn update(&self, rec: &Record, new_level: &str) -> HarnessResult<()> {
        let row = self.find_row(rec).await?;
        row.find(Locator::Css(EDIT_ICON)).await?.click().await?;

        let input = self
            .driver
            .wait_for(Locator::Css(self.loc.name_input), "name input")
            .await?;
        input.clear().await?;
        input.send_keys(&rec.name).await?;
        self.select_level(new_level).await?;
        self.driver
            .wait_for(Locator::Css(self.loc.update_button), "Update button")
            .await?
            .click()
            .await?;

        if self.success_toast().await.is_empty() {
            warn!(
                "{} update of {} to level {} not confirmed before the wait expired",
                self.loc.label, rec, new_level
            );
        }
        Ok(())
    }

    /// Current rows, top to bottom. Rows with missing cells come back with
    /// empty fields; partially-rendered rows occur transiently.
    pub async fn list(&self) -> HarnessResult<Vec<Record>> {
        let mut out = Vec::new();
        for row in self.driver.all(Locator::XPath(self.loc.rows)).await? {
            let cells = row.find_all(Locator::Css("td")).await.unwrap_or_default();
            let name = match cells.first() {
                Some(cell) => cell.text().await.unwrap_or_default().trim().to_string(),
                None => String::new(),
            };
            let level = match cells.get(1) {
                Some(cell) => cell.text().await.unwrap_or_default().trim().to_string(),
                None => String::new(),
            };
            out.push(Record::new(name, level));
        }
        Ok(out)
    }

    /// Remove the row matching `rec`.
    pub async fn delete_record(&self, rec: &Record) -> HarnessResult<()> {
        let row = self.find_row(rec).await?;
        row.find(Locator::Css(DELETE_ICON)).await?.click().await?;
        if self.success_toast().await.is_empty() {
            warn!(
                "{} deletion of {} not confirmed before the wait expired",
                self.loc.label, rec
            );
        }
        Ok(())
    }

    /// Wipe the list one row at a time. Stops when no rows remain, when a
    /// removal attempt times out, or when the row count stops shrinking;
    /// those all mean there is nothing left to safely remove. No-op on an
    /// already-empty list.
    pub async fn delete_all(&self) -> HarnessResult<usize> {
        let mut removed = 0usize;
        let mut prev = usize::MAX;
        loop {
            let rows = self.driver.all(Locator::XPath(self.loc.rows)).await?;
            if rows.is_empty() {
                break;
            }
            if rows.len() >= prev {
                // The last click accomplished nothing; stop rather than spin.
                debug!("{} wipe made no progress at {} rows", self.loc.label, rows.len());
                break;
            }
            prev = rows.len();

            let icon = match rows[0].find(Locator::Css(DELETE_ICON)).await {
                Ok(icon) => icon,
                Err(_) => break,
            };
            if icon.click().await.is_err() {
                break;
            }
            if self.success_toast().await.is_empty() {
                break;
            }
            removed += 1;
        }
        if removed > 0 {
            debug!("Wiped {} {} row(s)", removed, self.loc.label);
        }
        Ok(removed)
    }

    /// Bounded wait for the success toast; empty string when none shows.
    pub async fn success_toast(&self) -> String {
        self.driver
            .try_wait_text(Locator::XPath(SUCCESS_TOAST))
            .await
            .trim()
            .to_string()
    }

    /// Bounded wait for the error toast; empty string when none shows.
    pub async fn error_toast(&self) -> String {
        self.driver
            .try_wait_text(Locator::XPath(ERROR_TOAST))
            .await
            .trim()
            .to_string()
    }

    /// How many rows match the pair, counting duplicates individually.
    pub async fn count_with_level(&self, name: &str, level: &str) -> HarnessResult<usize> {
        Ok(record::count_matching(&self.list().await?, name, level))
    }

    /// `name:level, ...` rendering of the current rows for diagnostics.
    pub async fn summary(&self) -> HarnessResult<String> {
        Ok(record::summary(&self.list().await?))
    }

    async fn begin_entry(&self, name: &str) -> HarnessResult<()> {
        self.driver
            .wait_for(Locator::XPath(self.loc.add_new), "Add New button")
            .await?
            .click()
            .await?;
        let input = self
            .driver
            .wait_for(Locator::Css(self.loc.name_input), "name input")
            .await?;
        input.clear().await?;
        input.send_keys(name).await?;
        Ok(())
    }

    async fn click_add(&self) -> HarnessResult<()> {
        self.driver
            .wait_for(Locator::Css(self.loc.add_button), "Add button")
            .await?
            .click()
            .await?;
        Ok(())
    }

    async fn select_level(&self, level: &str) -> HarnessResult<()> {
        if self.select_level_if_exists(level).await? {
            Ok(())
        } else {
            Err(HarnessError::ActionTimeout(format!(
                "waiting for {} level option '{}'",
                self.loc.label, level
            )))
        }
    }

    /// Click the `<option>` whose text matches, when present.
    pub async fn select_level_if_exists(&self, level: &str) -> HarnessResult<bool> {
        for option in self.driver.all(Locator::Css(self.loc.level_options)).await? {
            let label = option.text().await.unwrap_or_default();
            if text::eq_norm(&label, level) {
                option.click().await?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// One scan of the table for a row matching the pair.
    async fn find_row(&self, rec: &Record) -> HarnessResult<Element> {
        for row in self.driver.all(Locator::XPath(self.loc.rows)).await? {
            let cells = row.find_all(Locator::Css("td")).await.unwrap_or_default();
            if cells.len() < 2 {
                continue;
            }
            let name = cells[0].text().await.unwrap_or_default();
            let level = cells[1].text().await.unwrap_or_default();
            if rec.matches_pair(&name, &level) {
                return Ok(row);
            }
        }
        Err(HarnessError::ActionTimeout(format!(
            "waiting for {} row matching {}",
            self.loc.label, rec
        )))
    }

    /// Poll until a row with this name shows up or the deadline passes.
    async fn wait_row_appears(&self, name: &str) -> bool {
        let start = Instant::now();
        loop {
            if let Ok(rows) = self.list().await {
                if rows.iter().any(|r| text::eq_norm(&r.name, name)) {
                    return true;
                }
            }
            if start.elapsed() >= self.driver.deadline() {
                return false;
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

impl fmt::Debug for ListTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListTab").field("label", &self.loc.label).finish()
    }
}

#[async_trait]
impl ProfileList for ListTab {
    fn list_name(&self) -> &'static str {
        self.loc.label
    }

    async fn list(&self) -> HarnessResult<Vec<Record>> {
        ListTab::list(self).await
    }

    async fn delete_record(&self, record: &Record) -> HarnessResult<()> {
        ListTab::delete_record(self, record).await
    }

    async fn delete_all(&self) -> HarnessResult<usize> {
        ListTab::delete_all(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_target_distinct_panes() {
        assert!(languages::LOCATORS.pane.contains("first"));
        assert!(skills::LOCATORS.pane.contains("second"));
        assert!(languages::LOCATORS.name_input.contains("Add Language"));
        assert!(skills::LOCATORS.name_input.contains("Add Skill"));
        assert_ne!(languages::LOCATORS.rows, skills::LOCATORS.rows);
    }
}
