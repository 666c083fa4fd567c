//! Cleanup reconciliation
//!
//! Teardown composes two strategies behind one operation: the tracked
//! pass deletes exactly what the scenario recorded, in insertion order,
//! skipping (never aborting on) per-item failures; the unconditional wipe
//! then runs whenever the tracked pass was absent or imperfect. The wipe
//! is the safety net that keeps leaked rows from crossing into the next
//! scenario. Nothing in here raises: scenario outcome is already decided
//! by the time cleanup runs.

use tracing::{info, warn};

use crate::error::HarnessError;
use crate::pages::ProfileList;
use crate::record::Ledger;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub tracked_deleted: usize,
    pub tracked_failed: usize,
    /// Rows removed by the fallback wipe, when it ran.
    pub wiped: Option<usize>,
}

impl CleanupOutcome {
    pub fn tracked_pass_clean(&self) -> bool {
        self.tracked_failed == 0
    }
}

/// Reconcile a list against what the scenario added to it.
pub async fn reconcile(list: &dyn ProfileList, ledger: Option<&Ledger>) -> CleanupOutcome {
    let mut outcome = CleanupOutcome::default();

    if let Some(ledger) = ledger {
        for rec in ledger.entries() {
            match list.delete_record(rec).await {
                Ok(()) => outcome.tracked_deleted += 1,
                Err(e) => {
                    outcome.tracked_failed += 1;
                    let item = HarnessError::CleanupItem {
                        name: rec.name.clone(),
                        level: rec.level.clone(),
                        reason: e.to_string(),
                    };
                    warn!("[POST-CLEAN] {} on {}, skipping", item, list.list_name());
                }
            }
        }
    }

    if ledger.is_none() || !outcome.tracked_pass_clean() {
        info!("[POST-CLEAN] Falling back to a full wipe of {}", list.list_name());
        match list.delete_all().await {
            Ok(n) => outcome.wiped = Some(n),
            Err(e) => warn!("[POST-CLEAN] Wipe of {} failed: {}", list.list_name(), e),
        }
    }

    if outcome.tracked_deleted > 0 || outcome.wiped.is_some() {
        info!(
            "[POST-CLEAN] {}: {} tracked delete(s), {} skipped, wipe removed {}",
            list.list_name(),
            outcome.tracked_deleted,
            outcome.tracked_failed,
            outcome.wiped.map_or_else(|| "-".to_string(), |n| n.to_string())
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HarnessError, HarnessResult};
    use crate::record::Record;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct FakeList {
        rows: Mutex<Vec<Record>>,
        fail_deletes_of: Vec<&'static str>,
        wipe_calls: Mutex<usize>,
    }

    impl FakeList {
        fn with_rows(rows: Vec<Record>) -> Self {
            FakeList {
                rows: Mutex::new(rows),
                fail_deletes_of: Vec::new(),
                wipe_calls: Mutex::new(0),
            }
        }

        fn row_count(&self) -> usize {
            self.rows.lock().len()
        }

        fn wipes(&self) -> usize {
            *self.wipe_calls.lock()
        }
    }

    #[async_trait]
    impl ProfileList for FakeList {
        fn list_name(&self) -> &'static str {
            "languages"
        }

        async fn list(&self) -> HarnessResult<Vec<Record>> {
            Ok(self.rows.lock().clone())
        }

        async fn delete_record(&self, record: &Record) -> HarnessResult<()> {
            if self.fail_deletes_of.contains(&record.name.as_str()) {
                return Err(HarnessError::ActionTimeout(format!(
                    "waiting for languages row matching {record}"
                )));
            }
            let mut rows = self.rows.lock();
            match rows.iter().position(|r| r.matches(record)) {
                Some(i) => {
                    rows.remove(i);
                    Ok(())
                }
                None => Err(HarnessError::ActionTimeout(format!(
                    "waiting for languages row matching {record}"
                ))),
            }
        }

        async fn delete_all(&self) -> HarnessResult<usize> {
            *self.wipe_calls.lock() += 1;
            let mut rows = self.rows.lock();
            let n = rows.len();
            rows.clear();
            Ok(n)
        }
    }

    fn ledger_of(pairs: &[(&str, &str)]) -> Ledger {
        let mut ledger = Ledger::new();
        for (name, level) in pairs {
            ledger.track(Record::new(*name, *level));
        }
        ledger
    }

    #[tokio::test]
    async fn clean_tracked_pass_skips_the_wipe() {
        let list = FakeList::with_rows(vec![
            Record::new("French", "Intermediate"),
            Record::new("German", "Basic"),
        ]);
        let ledger = ledger_of(&[("French", "Intermediate"), ("German", "Basic")]);

        let outcome = reconcile(&list, Some(&ledger)).await;

        assert_eq!(outcome.tracked_deleted, 2);
        assert_eq!(outcome.tracked_failed, 0);
        assert_eq!(outcome.wiped, None);
        assert_eq!(list.row_count(), 0);
        assert_eq!(list.wipes(), 0);
    }

    #[tokio::test]
    async fn one_failed_delete_still_leaves_the_list_empty() {
        let mut list = FakeList::with_rows(vec![
            Record::new("A", "Basic"),
            Record::new("B", "Basic"),
            Record::new("C", "Basic"),
        ]);
        list.fail_deletes_of = vec!["B"];
        let ledger = ledger_of(&[("A", "Basic"), ("B", "Basic"), ("C", "Basic")]);

        let outcome = reconcile(&list, Some(&ledger)).await;

        assert_eq!(outcome.tracked_deleted, 2);
        assert_eq!(outcome.tracked_failed, 1);
        assert_eq!(outcome.wiped, Some(1));
        assert_eq!(list.row_count(), 0);
    }

    #[tokio::test]
    async fn missing_ledger_falls_back_to_the_wipe() {
        let list = FakeList::with_rows(vec![Record::new("Hindi", "Fluent")]);

        let outcome = reconcile(&list, None).await;

        assert_eq!(outcome.tracked_deleted, 0);
        assert_eq!(outcome.wiped, Some(1));
        assert_eq!(list.row_count(), 0);
        assert_eq!(list.wipes(), 1);
    }

    #[tokio::test]
    async fn stale_ledger_entry_is_skipped_then_wiped_over() {
        // An updated record leaves its old pair in the ledger; deleting the
        // stale pair fails, which must not abort the pass.
        let list = FakeList::with_rows(vec![Record::new("Spanish", "Fluent")]);
        let ledger = ledger_of(&[("Spanish", "Beginner"), ("Spanish", "Fluent")]);

        let outcome = reconcile(&list, Some(&ledger)).await;

        assert_eq!(outcome.tracked_deleted, 1);
        assert_eq!(outcome.tracked_failed, 1);
        assert_eq!(outcome.wiped, Some(0));
        assert_eq!(list.row_count(), 0);
    }

    #[tokio::test]
    async fn empty_ledger_is_a_no_op() {
        let list = FakeList::with_rows(Vec::new());
        let ledger = Ledger::new();

        let outcome = reconcile(&list, Some(&ledger)).await;

        assert_eq!(outcome, CleanupOutcome::default());
        assert_eq!(list.wipes(), 0);
    }

    #[tokio::test]
    async fn wipe_on_an_empty_list_terminates_cleanly() {
        let list = FakeList::with_rows(Vec::new());

        let outcome = reconcile(&list, None).await;

        assert_eq!(outcome.wiped, Some(0));
        assert_eq!(list.wipes(), 1);
    }
}
