use crate::model::{LedgerTable, RowId};
use crate::pipeline::{assign_batch, BatchReport};
use serde::Serialize;
use std::collections::BTreeMap;

/// The category choices a user has made during one working session, keyed by table name and
/// row. Nothing here is shared globally; a session is created, filled and applied explicitly.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct CategorizationSession {
    choices: BTreeMap<String, BTreeMap<RowId, String>>,
}

impl CategorizationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `label` for a row, replacing any earlier choice for the same row.
    pub fn choose(&mut self, table: impl Into<String>, row: RowId, label: impl Into<String>) {
        self.choices
            .entry(table.into())
            .or_default()
            .insert(row, label.into());
    }

    /// The choice recorded for a row, if any.
    pub fn choice(&self, table: &str, row: RowId) -> Option<&str> {
        self.choices
            .get(table)
            .and_then(|rows| rows.get(&row))
            .map(String::as_str)
    }

    /// Forgets every choice made for `table`, e.g. after it has been reloaded and row ids may
    /// have shifted.
    pub fn forget(&mut self, table: &str) {
        self.choices.remove(table);
    }

    pub fn len(&self) -> usize {
        self.choices.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies this session's choices for the table as one batch.
    pub fn apply(&self, table: LedgerTable) -> (LedgerTable, BatchReport) {
        match self.choices.get(table.name()) {
            Some(choices) => assign_batch(table, choices),
            None => (table, BatchReport::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LedgerKind;

    fn debts() -> LedgerTable {
        LedgerTable::parse(
            "Debts_Tracker",
            LedgerKind::Debt,
            LedgerKind::Debt.default_vocabulary(),
            vec![
                vec!["Description", "Balance"],
                vec!["Visa", "1500"],
                vec!["House", "250000"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_choices_are_per_table() {
        let mut session = CategorizationSession::new();
        session.choose("Debts_Tracker", RowId(0), "Credit Card");
        session.choose("Expense_Log", RowId(0), "Fixed");
        session.choose("Debts_Tracker", RowId(0), "Other");
        assert_eq!(session.len(), 2);
        assert_eq!(session.choice("Debts_Tracker", RowId(0)), Some("Other"));
        assert_eq!(session.choice("Expense_Log", RowId(0)), Some("Fixed"));
        assert_eq!(session.choice("Income_Log", RowId(0)), None);
    }

    #[test]
    fn test_apply() {
        let mut session = CategorizationSession::new();
        session.choose("Debts_Tracker", RowId(0), "Credit Card");
        session.choose("Debts_Tracker", RowId(1), "Mortgage");
        session.choose("Debts_Tracker", RowId(5), "Mortgage");
        session.choose("Expense_Log", RowId(0), "Fixed");
        let (table, report) = session.apply(debts());
        assert_eq!(report, BatchReport { applied: 2, ignored: 1 });
        assert_eq!(table.row(RowId(0)).unwrap().category(), Some("Credit Card"));
        assert_eq!(table.row(RowId(1)).unwrap().category(), Some("Mortgage"));
    }

    #[test]
    fn test_apply_without_choices() {
        let session = CategorizationSession::new();
        let (table, report) = session.apply(debts());
        assert_eq!(table, debts());
        assert_eq!(report, BatchReport::default());
    }

    #[test]
    fn test_forget() {
        let mut session = CategorizationSession::new();
        session.choose("Debts_Tracker", RowId(0), "Credit Card");
        session.forget("Debts_Tracker");
        assert!(session.is_empty());
    }
}
