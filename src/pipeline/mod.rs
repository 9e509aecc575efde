//! The categorization and aggregation pipeline.
//!
//! Every function here is a plain transformation of its arguments. Category assignments are
//! permissive: a label that the table's vocabulary does not accept is ignored rather than
//! reported as an error.

mod aggregate;
mod auto_cat;
mod session;

pub use aggregate::Aggregate;
pub use auto_cat::{infer_category, infer_table, ExpenseRules, KeywordRule, DEFAULT_LABEL};
pub use session::CategorizationSession;

use crate::error::AggregationError;
use crate::model::{month_key, LedgerRow, LedgerTable, RowId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::debug;

/// Sets the category of the row at `row` to `label` when the table's vocabulary accepts it (the
/// empty string clears it). Anything else leaves the table unchanged.
pub fn assign_category(mut table: LedgerTable, row: RowId, label: &str) -> LedgerTable {
    if !apply_one(&mut table, row, label) {
        debug!(
            "Ignoring category '{label}' for row {row} of {}",
            table.name()
        );
    }
    table
}

/// Counts of what happened to a batch of category choices.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub applied: usize,
    pub ignored: usize,
}

impl BatchReport {
    pub(crate) fn merge(&mut self, other: BatchReport) {
        self.applied += other.applied;
        self.ignored += other.ignored;
    }
}

/// Applies a whole set of `{row -> label}` choices in one pass, with the same validation as
/// `assign_category`.
pub fn assign_batch(
    mut table: LedgerTable,
    choices: &BTreeMap<RowId, String>,
) -> (LedgerTable, BatchReport) {
    let mut report = BatchReport::default();
    for (&row, label) in choices {
        if apply_one(&mut table, row, label) {
            report.applied += 1;
        } else {
            report.ignored += 1;
        }
    }
    if report.ignored > 0 {
        debug!(
            "Ignored {} of {} category choices for {}",
            report.ignored,
            choices.len(),
            table.name()
        );
    }
    (table, report)
}

fn apply_one(table: &mut LedgerTable, row: RowId, label: &str) -> bool {
    if !table.vocabulary().accepts(label) {
        return false;
    }
    table.set_category(row, label)
}

/// Selects which rows `filter_by_category` keeps.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Label(String),
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(ALL_STR) {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Label(s.to_string()))
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_STR),
            CategoryFilter::Label(label) => f.write_str(label),
        }
    }
}

const ALL_STR: &str = "All";

/// Returns the rows matching `filter`, in table order, along with their ids.
pub fn filter_by_category<'a>(
    table: &'a LedgerTable,
    filter: &CategoryFilter,
) -> Vec<(RowId, &'a LedgerRow)> {
    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| match filter {
            CategoryFilter::All => true,
            CategoryFilter::Label(label) => row.category.as_str() == label,
        })
        .map(|(ix, row)| (RowId(ix), row))
        .collect()
}

/// The sum of every amount in the table, categorized or not.
pub fn total(table: &LedgerTable) -> Result<Decimal, AggregationError> {
    table
        .rows()
        .iter()
        .try_fold(Decimal::ZERO, |sum, row| sum.checked_add(row.amount.value()))
        .ok_or_else(|| AggregationError::Overflow(table.name().to_string()))
}

/// Sums amounts per category. Uncategorized rows are left out.
pub fn aggregate_by_category(table: &LedgerTable) -> Result<Aggregate, AggregationError> {
    Aggregate::try_collect(
        table.name(),
        table
            .rows()
            .iter()
            .filter_map(|row| row.category().map(|c| (c.to_string(), row.amount.value()))),
    )
}

/// Sums amounts per `YYYY-MM` month of the row's date. Rows without a usable date are left out.
pub fn aggregate_by_month(table: &LedgerTable) -> Result<Aggregate, AggregationError> {
    Aggregate::try_collect(
        table.name(),
        table
            .rows()
            .iter()
            .filter_map(|row| row.date().map(|d| (month_key(d), row.amount.value()))),
    )
}

/// Total account balances minus total debt balances.
pub fn compute_net_worth(
    accounts: &LedgerTable,
    debts: &LedgerTable,
) -> Result<Decimal, AggregationError> {
    for table in [accounts, debts] {
        if !table.has_amount() {
            return Err(AggregationError::MissingAmountColumn(
                table.name().to_string(),
            ));
        }
    }
    total(accounts)?
        .checked_sub(total(debts)?)
        .ok_or_else(|| {
            AggregationError::Overflow(format!("{} minus {}", accounts.name(), debts.name()))
        })
}
