//! Profile list records and the per-scenario ledger

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text;

/// One row of a profile list: a (name, level) pair.
///
/// Identity is the pair itself. The application assigns no stable ids, so
/// duplicate pairs are indistinguishable and must be tracked by count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub level: String,
}

impl Record {
    pub fn new(name: impl Into<String>, level: impl Into<String>) -> Self {
        Record {
            name: name.into(),
            level: level.into(),
        }
    }

    /// Pair equality under UI-text normalization (case, whitespace,
    /// HTML entities).
    pub fn matches(&self, other: &Record) -> bool {
        self.matches_pair(&other.name, &other.level)
    }

    pub fn matches_pair(&self, name: &str, level: &str) -> bool {
        text::eq_norm(&self.name, name) && text::eq_norm(&self.level, level)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.level)
    }
}

/// Render a slice of records as the `name:level, ...` diagnostic summary
/// embedded in assertion failures and print steps.
pub fn summary(rows: &[Record]) -> String {
    rows.iter()
        .map(Record::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Count rows matching a (name, level) pair. Duplicates count once each.
pub fn count_matching(rows: &[Record], name: &str, level: &str) -> usize {
    rows.iter().filter(|r| r.matches_pair(name, level)).count()
}

/// Ordered log of records added during one scenario.
///
/// Created empty at scenario start, appended on every successful creation
/// or update, consumed in insertion order by teardown. A stale entry (a
/// pair that was later updated away or already deleted) is harmless: the
/// tracked delete for it is logged and skipped.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    added: Vec<Record>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    pub fn track(&mut self, record: Record) {
        self.added.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len()
    }

    /// Insertion-order view for the teardown pass.
    pub fn entries(&self) -> &[Record] {
        &self.added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case_space_and_entities() {
        let row = Record::new(" FRENCH ", "Intermediate");
        assert!(row.matches_pair("french", "INTERMEDIATE"));
        assert!(Record::new("R&amp;D", "Expert").matches_pair("r&d", "expert"));
        assert!(!row.matches_pair("french", "Beginner"));
    }

    #[test]
    fn duplicates_count_not_exist() {
        let rows = vec![
            Record::new("Hindi", "Fluent"),
            Record::new("Hindi", "Fluent"),
            Record::new("Hindi", "Basic"),
        ];
        assert_eq!(count_matching(&rows, "hindi", "fluent"), 2);
        assert_eq!(count_matching(&rows, "Hindi", "Basic"), 1);
        assert_eq!(count_matching(&rows, "Hindi", "Expert"), 0);
    }

    #[test]
    fn ledger_preserves_insertion_order() {
        let mut ledger = Ledger::new();
        assert!(ledger.is_empty());
        ledger.track(Record::new("Spanish", "Beginner"));
        ledger.track(Record::new("Spanish", "Fluent"));
        ledger.track(Record::new("German", "Basic"));
        let names: Vec<_> = ledger.entries().iter().map(|r| r.to_string()).collect();
        assert_eq!(names, ["Spanish:Beginner", "Spanish:Fluent", "German:Basic"]);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn summary_formats_rows() {
        let rows = vec![Record::new("Python", "Expert"), Record::new("Go", "Basic")];
        assert_eq!(summary(&rows), "Python:Expert, Go:Basic");
        assert_eq!(summary(&[]), "");
    }
}
