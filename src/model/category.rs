use serde::{Deserialize, Serialize};

/// The five kinds of ledger table in the finance spreadsheet.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Income,
    Expense,
    Debt,
    SavingsGoal,
    Account,
}

serde_plain::derive_display_from_serialize!(LedgerKind);
serde_plain::derive_fromstr_from_deserialize!(LedgerKind);

impl LedgerKind {
    /// Every kind, in the order the dashboard presents them.
    pub const ALL: [LedgerKind; 5] = [
        LedgerKind::Income,
        LedgerKind::Expense,
        LedgerKind::Debt,
        LedgerKind::SavingsGoal,
        LedgerKind::Account,
    ];

    /// The name of the tab that holds this kind of table unless the config says otherwise.
    pub fn default_tab(&self) -> &'static str {
        match self {
            LedgerKind::Income => INCOME_TAB,
            LedgerKind::Expense => EXPENSE_TAB,
            LedgerKind::Debt => DEBT_TAB,
            LedgerKind::SavingsGoal => SAVINGS_GOAL_TAB,
            LedgerKind::Account => ACCOUNT_TAB,
        }
    }

    /// A human-readable title, e.g. for section headings.
    pub fn title(&self) -> &'static str {
        match self {
            LedgerKind::Income => "Income",
            LedgerKind::Expense => "Expenses",
            LedgerKind::Debt => "Debts",
            LedgerKind::SavingsGoal => "Savings Goals",
            LedgerKind::Account => "Accounts",
        }
    }

    /// The built-in category vocabulary for this kind.
    pub fn default_vocabulary(&self) -> Vocabulary {
        let labels: &[&str] = match self {
            LedgerKind::Income => INCOME_CATEGORIES,
            LedgerKind::Expense => EXPENSE_CATEGORIES,
            LedgerKind::Debt => DEBT_CATEGORIES,
            LedgerKind::SavingsGoal => SAVINGS_GOAL_CATEGORIES,
            LedgerKind::Account => ACCOUNT_CATEGORIES,
        };
        Vocabulary::new(labels.iter().copied())
    }
}

/// The closed set of category labels that rows of one ledger table may carry. The empty label
/// means "uncategorized" and is always accepted, but is not itself a member.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary(Vec<String>);

impl Vocabulary {
    pub fn new<S, I>(labels: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    /// True if `label` may be stored as a row's category: a member, or empty.
    pub fn accepts(&self, label: &str) -> bool {
        label.is_empty() || self.contains(label)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }
}

pub(crate) const INCOME_TAB: &str = "Income_Log";
pub(crate) const EXPENSE_TAB: &str = "Expense_Log";
pub(crate) const DEBT_TAB: &str = "Debts_Tracker";
pub(crate) const SAVINGS_GOAL_TAB: &str = "Savings_Goals";
pub(crate) const ACCOUNT_TAB: &str = "Accounts";

pub(crate) const INCOME_CATEGORIES: &[&str] = &["Salary", "Refund", "Business", "Other"];
pub(crate) const EXPENSE_CATEGORIES: &[&str] = &["Fixed", "Variable", "Other"];
pub(crate) const DEBT_CATEGORIES: &[&str] = &[
    "Credit Card",
    "Mortgage",
    "Auto Loan",
    "Student Loan",
    "Personal Loan",
    "Other",
];
pub(crate) const SAVINGS_GOAL_CATEGORIES: &[&str] = &[
    "Emergency Fund",
    "Down Payment",
    "College Tuition",
    "Travel",
    "Other",
];
pub(crate) const ACCOUNT_CATEGORIES: &[&str] = &["Checking", "Savings", "Investment Portfolio"];

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_display_and_parse() {
        assert_eq!(LedgerKind::SavingsGoal.to_string(), "savings_goal");
        assert_eq!(
            LedgerKind::from_str("savings_goal").unwrap(),
            LedgerKind::SavingsGoal
        );
        assert!(LedgerKind::from_str("loans").is_err());
    }

    #[test]
    fn test_default_tabs() {
        assert_eq!(LedgerKind::Income.default_tab(), "Income_Log");
        assert_eq!(LedgerKind::Account.default_tab(), "Accounts");
    }

    #[test]
    fn test_vocabulary_accepts() {
        let vocab = LedgerKind::Expense.default_vocabulary();
        assert!(vocab.accepts("Fixed"));
        assert!(vocab.accepts(""));
        assert!(!vocab.contains(""));
        assert!(!vocab.accepts("fixed"));
        assert!(!vocab.accepts("Salary"));
    }

    #[test]
    fn test_income_includes_business() {
        assert!(LedgerKind::Income.default_vocabulary().contains("Business"));
    }

    #[test]
    fn test_account_has_no_other() {
        let vocab = LedgerKind::Account.default_vocabulary();
        assert_eq!(vocab.labels().len(), 3);
        assert!(!vocab.contains("Other"));
    }
}
