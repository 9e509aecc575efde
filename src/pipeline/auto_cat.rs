use crate::model::{LedgerKind, LedgerTable, RowId};
use crate::pipeline::{assign_batch, BatchReport};
use crate::Result;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The label given to an expense whose description matches no rule.
pub const DEFAULT_LABEL: &str = "Other";

/// One keyword rule: if a description contains any of `keywords`, the expense is `category`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KeywordRule {
    pub category: String,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new<S, I>(category: impl Into<String>, keywords: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self {
            category: category.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-insensitive substring match. Empty keywords never match.
    fn matches(&self, lowered_description: &str) -> bool {
        self.keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .any(|k| !k.is_empty() && lowered_description.contains(&k))
    }
}

/// Ordered keyword rules for expense descriptions. The first rule that matches wins.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseRules(Vec<KeywordRule>);

impl Default for ExpenseRules {
    fn default() -> Self {
        Self(vec![
            KeywordRule::new("Fixed", ["rent", "insurance", "car"]),
            KeywordRule::new("Variable", ["gas", "grocery", "utilities", "internet"]),
        ])
    }
}

impl ExpenseRules {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self(rules)
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.0
    }

    /// Returns the category for `description`, or `DEFAULT_LABEL` when no rule matches.
    pub fn infer(&self, description: &str) -> &str {
        let lowered = description.to_lowercase();
        self.0
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.category.as_str())
            .unwrap_or(DEFAULT_LABEL)
    }
}

/// Infers an expense category from a free-text description using the built-in rules.
pub fn infer_category(description: &str) -> String {
    ExpenseRules::default().infer(description).to_string()
}

/// Proposes a category for every row of an expense table and applies the proposals as one
/// batch. Proposals the table's vocabulary rejects are counted as ignored.
pub fn infer_table(
    table: LedgerTable,
    rules: &ExpenseRules,
) -> Result<(LedgerTable, BatchReport)> {
    if table.kind() != LedgerKind::Expense {
        bail!(
            "Categories can only be inferred for expense tables, but '{}' holds {}",
            table.name(),
            table.kind().title().to_lowercase()
        );
    }
    let choices: BTreeMap<RowId, String> = table
        .rows()
        .iter()
        .enumerate()
        .map(|(ix, row)| (RowId(ix), rules.infer(row.description()).to_string()))
        .collect();
    Ok(assign_batch(table, &choices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vocabulary;

    #[test]
    fn test_infer_category_examples() {
        assert_eq!(infer_category("Monthly Rent Payment"), "Fixed");
        assert_eq!(infer_category("Grocery run"), "Variable");
        assert_eq!(infer_category("Shell gas station"), "Variable");
        assert_eq!(infer_category("Movie tickets"), "Other");
    }

    #[test]
    fn test_first_rule_wins() {
        // "car" and "gas" both match; Fixed is listed first.
        assert_eq!(infer_category("car gas"), "Fixed");
    }

    #[test]
    fn test_substring_matches() {
        assert_eq!(infer_category("Scary movie"), "Fixed");
        assert_eq!(infer_category("GROCERY OUTLET"), "Variable");
        assert_eq!(infer_category(""), "Other");
    }

    #[test]
    fn test_custom_rules() {
        let rules = ExpenseRules::new(vec![
            KeywordRule::new("Variable", ["Coffee", " "]),
            KeywordRule::new("Fixed", ["gym"]),
        ]);
        assert_eq!(rules.infer("coffee shop"), "Variable");
        assert_eq!(rules.infer("Gym membership"), "Fixed");
        assert_eq!(rules.infer("a b"), "Other");
    }

    #[test]
    fn test_rules_from_json() {
        let rules: ExpenseRules = serde_json::from_str(
            r#"[{"category": "Fixed", "keywords": ["mortgage"]}]"#,
        )
        .unwrap();
        assert_eq!(rules.rules().len(), 1);
        assert_eq!(rules.infer("Mortgage"), "Fixed");
    }

    #[test]
    fn test_infer_table() {
        let table = LedgerTable::parse(
            "Expense_Log",
            LedgerKind::Expense,
            LedgerKind::Expense.default_vocabulary(),
            vec![
                vec!["Date", "Description", "Amount"],
                vec!["2024-01-01", "Rent", "1200"],
                vec!["2024-01-02", "Internet bill", "60"],
                vec!["2024-01-03", "Concert", "80"],
            ],
        )
        .unwrap();
        let (table, report) = infer_table(table, &ExpenseRules::default()).unwrap();
        assert_eq!(report, BatchReport { applied: 3, ignored: 0 });
        let labels: Vec<_> = table.rows().iter().map(|r| r.category()).collect();
        assert_eq!(labels, [Some("Fixed"), Some("Variable"), Some("Other")]);
    }

    #[test]
    fn test_infer_table_ignores_labels_outside_vocabulary() {
        let table = LedgerTable::parse(
            "Expense_Log",
            LedgerKind::Expense,
            Vocabulary::new(["Fixed"]),
            vec![
                vec!["Description", "Amount"],
                vec!["Rent", "1200"],
                vec!["Pizza", "20"],
            ],
        )
        .unwrap();
        let (table, report) = infer_table(table, &ExpenseRules::default()).unwrap();
        assert_eq!(report, BatchReport { applied: 1, ignored: 1 });
        assert_eq!(table.row(RowId(1)).unwrap().category(), None);
    }

    #[test]
    fn test_infer_table_rejects_other_kinds() {
        let table = LedgerTable::empty(
            "Income_Log",
            LedgerKind::Income,
            LedgerKind::Income.default_vocabulary(),
        );
        assert!(infer_table(table, &ExpenseRules::default()).is_err());
    }
}
