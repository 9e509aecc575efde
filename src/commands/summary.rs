//! The `summary` and `net-worth` commands.
//!
//! These degrade rather than fail: a table that cannot be loaded becomes an empty section with a
//! warning, and a net worth that cannot be computed becomes a warning.

use crate::api::{Mode, RecordStore};
use crate::args::{OutputFormat, SummaryArgs};
use crate::commands::{Out, Rows};
use crate::model::{Amount, LedgerKind, LedgerTable};
use crate::pipeline::{
    aggregate_by_category, aggregate_by_month, compute_net_worth, infer_table, total, Aggregate,
};
use crate::{AggregationError, Config, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;
use tracing::warn;

/// Totals for one ledger table.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub kind: LedgerKind,
    pub tab: String,
    pub rows: usize,
    /// `None` when the sum overflowed.
    pub total: Option<Decimal>,
    pub by_month: Aggregate,
    pub by_category: Aggregate,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// The whole dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub tables: Vec<TableSummary>,
    pub net_worth: Option<Decimal>,
    pub warnings: Vec<String>,
}

pub async fn summary(config: Config, mode: Mode, args: SummaryArgs) -> Result<Out<Rows>> {
    let rules = config.expense_rules();
    let mut store = RecordStore::new(config, mode).await?;
    let mut warnings = Vec::new();
    let mut tables = Vec::new();
    let mut accounts = None;
    let mut debts = None;

    for kind in LedgerKind::ALL {
        let (mut table, load_warning) = load_or_empty(&mut store, kind).await;
        if args.infer() && kind == LedgerKind::Expense {
            table = infer_table(table, &rules)?.0;
        }
        let mut table_warnings: Vec<String> = load_warning.iter().cloned().collect();
        let table_total = or_warn(total(&table), &mut table_warnings);
        let by_month = or_warn(aggregate_by_month(&table), &mut table_warnings).unwrap_or_default();
        let by_category =
            or_warn(aggregate_by_category(&table), &mut table_warnings).unwrap_or_default();
        warnings.extend(table_warnings.iter().cloned());
        tables.push(TableSummary {
            kind,
            tab: table.name().to_string(),
            rows: table.len(),
            total: table_total,
            by_month,
            by_category,
            warnings: table_warnings,
        });
        match kind {
            LedgerKind::Account if load_warning.is_none() => accounts = Some(table),
            LedgerKind::Debt if load_warning.is_none() => debts = Some(table),
            _ => {}
        }
    }

    let net_worth = match net_worth_of(accounts.as_ref(), debts.as_ref()) {
        Ok(value) => Some(value),
        Err(message) => {
            warn!("{message}");
            warnings.push(message);
            None
        }
    };

    let summary = Summary {
        tables,
        net_worth,
        warnings,
    };
    let message = match summary.warnings.len() {
        0 => String::from("Summarized all tables"),
        n => format!("Summarized all tables with {n} warning(s)"),
    };
    Ok(Out::new(message, render(&summary, args.format())?))
}

/// Prints net worth, or a warning when it cannot be computed.
pub async fn net_worth(config: Config, mode: Mode) -> Result<Out<Rows>> {
    let mut store = RecordStore::new(config, mode).await?;
    let (accounts, accounts_warning) = load_or_empty(&mut store, LedgerKind::Account).await;
    let (debts, debts_warning) = load_or_empty(&mut store, LedgerKind::Debt).await;
    let accounts = accounts_warning.is_none().then_some(&accounts);
    let debts = debts_warning.is_none().then_some(&debts);
    match net_worth_of(accounts, debts) {
        Ok(value) => Ok(format!("Net worth: {}", money(value)).into()),
        Err(message) => {
            warn!("{message}");
            Ok("Net worth is unavailable".into())
        }
    }
}

/// Loads a table, substituting an empty one (and returning a warning) when the load fails.
async fn load_or_empty(store: &mut RecordStore, kind: LedgerKind) -> (LedgerTable, Option<String>) {
    match store.load(kind).await {
        Ok(table) => (table, None),
        Err(e) => {
            let message = format!("{} could not be loaded: {e}", kind.title());
            warn!("{message}");
            let config = store.config();
            let empty = LedgerTable::empty(config.tab(kind), kind, config.vocabulary(kind));
            (empty, Some(message))
        }
    }
}

fn net_worth_of(
    accounts: Option<&LedgerTable>,
    debts: Option<&LedgerTable>,
) -> std::result::Result<Decimal, String> {
    match (accounts, debts) {
        (Some(accounts), Some(debts)) => compute_net_worth(accounts, debts)
            .map_err(|e| format!("Net worth could not be computed: {e}")),
        _ => Err(String::from(
            "Net worth could not be computed because a table failed to load",
        )),
    }
}

/// Turns an aggregation failure into a logged warning.
fn or_warn<T>(
    result: std::result::Result<T, AggregationError>,
    warnings: &mut Vec<String>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{e}");
            warnings.push(e.to_string());
            None
        }
    }
}

fn money(value: Decimal) -> String {
    Amount::new(value).to_string()
}

fn render(summary: &Summary, format: OutputFormat) -> Result<Rows> {
    match format {
        OutputFormat::Json => Ok(Rows::Json(serde_json::to_value(summary)?)),
        OutputFormat::Csv => {
            let headers: Vec<String> = ["Table", "Group", "Key", "Amount"]
                .iter()
                .map(|s| s.to_string())
                .collect();
            let mut records = Vec::new();
            for t in &summary.tables {
                let tab = t.kind.to_string();
                if let Some(total) = t.total {
                    records.push(vec![tab.clone(), "total".into(), String::new(), total.to_string()]);
                }
                for (key, value) in t.by_month.iter() {
                    records.push(vec![tab.clone(), "month".into(), key.into(), value.to_string()]);
                }
                for (key, value) in t.by_category.sorted_desc() {
                    records.push(vec![
                        tab.clone(),
                        "category".into(),
                        key.into(),
                        value.to_string(),
                    ]);
                }
            }
            if let Some(value) = summary.net_worth {
                records.push(vec![
                    "net_worth".into(),
                    "total".into(),
                    String::new(),
                    value.to_string(),
                ]);
            }
            Rows::new(OutputFormat::Csv, &headers, &records)
        }
        OutputFormat::Table => {
            let mut out = String::new();
            for t in &summary.tables {
                writeln!(out, "## {} ({})\n", t.kind.title(), t.tab)?;
                for w in &t.warnings {
                    writeln!(out, "Warning: {w}\n")?;
                }
                let total = t.total.map(money);
                writeln!(
                    out,
                    "Rows: {}, Total: {}\n",
                    t.rows,
                    total.as_deref().unwrap_or(UNAVAILABLE)
                )?;
                if !t.by_month.is_empty() {
                    writeln!(out, "{}\n", aggregate_table("Month", t.by_month.iter())?)?;
                }
                if !t.by_category.is_empty() {
                    writeln!(
                        out,
                        "{}\n",
                        aggregate_table("Category", t.by_category.sorted_desc())?
                    )?;
                }
            }
            writeln!(out, "## Net Worth\n")?;
            match summary.net_worth {
                Some(value) => write!(out, "{}", money(value))?,
                None => write!(out, "{UNAVAILABLE}")?,
            }
            Ok(Rows::Table(out))
        }
    }
}

const UNAVAILABLE: &str = "Unavailable";

fn aggregate_table<'a>(
    key_header: &str,
    entries: impl IntoIterator<Item = (&'a str, Decimal)>,
) -> Result<Rows> {
    let headers = vec![key_header.to_string(), String::from("Total")];
    let records: Vec<Vec<String>> = entries
        .into_iter()
        .map(|(key, value)| vec![key.to_string(), money(value)])
        .collect();
    Rows::new(OutputFormat::Table, &headers, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn json_summary(env: &TestEnv, infer: bool) -> serde_json::Value {
        let out = summary(env.config(), Mode::Test, SummaryArgs::new(infer, OutputFormat::Json))
            .await
            .unwrap();
        match out.structure().unwrap() {
            Rows::Json(v) => v.clone(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_summary_of_seed_data() {
        let env = TestEnv::new().await;
        let v = json_summary(&env, true).await;
        // 3,412.77 + 18,250.00 + 41,980.35 - (2,340.18 + 212,500.00 + 9,875.00)
        assert_eq!(v["net_worth"], "-161072.06");
        assert_eq!(v["warnings"], serde_json::json!([]));

        let expenses = &v["tables"][1];
        assert_eq!(expenses["tab"], "Expense_Log");
        assert_eq!(expenses["rows"], 9);
        assert_eq!(expenses["total"], "4174.60");
        assert_eq!(expenses["by_month"]["2025-10"], "2246.39");
        assert_eq!(expenses["by_month"]["2025-11"], "1913.21");
        assert_eq!(expenses["by_category"]["Fixed"], "3842.67");
        assert_eq!(expenses["by_category"]["Other"], "39.00");
    }

    #[tokio::test]
    async fn test_summary_without_infer_has_no_categories() {
        let env = TestEnv::new().await;
        let v = json_summary(&env, false).await;
        assert_eq!(v["tables"][1]["by_category"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_summary_degrades_when_a_tab_is_missing() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        state.tabs.remove("Debts_Tracker");
        env.set_state(state);

        let v = json_summary(&env, false).await;
        assert_eq!(v["net_worth"], serde_json::Value::Null);
        assert_eq!(v["warnings"].as_array().unwrap().len(), 2);
        assert_eq!(v["tables"][2]["rows"], 0);
        assert!(v["tables"][2]["warnings"][0]
            .as_str()
            .unwrap()
            .contains("Debts_Tracker"));
        assert_eq!(v["tables"][0]["rows"], 5);
    }

    #[tokio::test]
    async fn test_summary_table_format() {
        let env = TestEnv::new().await;
        let out = summary(env.config(), Mode::Test, SummaryArgs::new(false, OutputFormat::Table))
            .await
            .unwrap();
        let text = out.structure().unwrap().to_string();
        assert!(text.starts_with("## Income (Income_Log)\n"));
        assert!(text.contains("| 2025-10 | $8,830.62 |"), "{text}");
        assert!(text.ends_with("## Net Worth\n\n-$161,072.06"));
    }

    #[tokio::test]
    async fn test_net_worth() {
        let env = TestEnv::new().await;
        let out = net_worth(env.config(), Mode::Test).await.unwrap();
        assert_eq!(out.message(), "Net worth: -$161,072.06");
        assert_eq!(
            net_worth_of(None, None).unwrap_err(),
            "Net worth could not be computed because a table failed to load"
        );
    }

    #[tokio::test]
    async fn test_net_worth_missing_balance_column() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        state.tabs.insert(
            "Accounts".into(),
            vec![vec!["Account".into(), "Value".into()]],
        );
        env.set_state(state);
        let out = net_worth(env.config(), Mode::Test).await.unwrap();
        assert_eq!(out.message(), "Net worth is unavailable");
    }

    #[test]
    fn test_net_worth_of() {
        let accounts = LedgerTable::parse(
            "Accounts",
            LedgerKind::Account,
            LedgerKind::Account.default_vocabulary(),
            vec![vec!["Amount"], vec!["100"], vec!["200"]],
        )
        .unwrap();
        let debts = LedgerTable::parse(
            "Debts_Tracker",
            LedgerKind::Debt,
            LedgerKind::Debt.default_vocabulary(),
            vec![vec!["Amount"], vec!["50"]],
        )
        .unwrap();
        assert_eq!(net_worth_of(Some(&accounts), Some(&debts)).unwrap(), dec("250"));
    }

    #[tokio::test]
    async fn test_summary_degrades_on_overflow() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        let huge = "50000000000000000000000000000";
        state.tabs.insert(
            "Accounts".into(),
            vec![
                vec!["Account".into(), "Balance".into()],
                vec!["A".into(), huge.into()],
                vec!["B".into(), huge.into()],
            ],
        );
        env.set_state(state);

        let v = json_summary(&env, false).await;
        assert_eq!(v["tables"][4]["total"], serde_json::Value::Null);
        assert_eq!(
            v["tables"][4]["warnings"][0],
            "The amounts in 'Accounts' are too large to add up"
        );
        assert_eq!(v["net_worth"], serde_json::Value::Null);
        assert_eq!(v["tables"][1]["total"], "4174.60");

        let out = net_worth(env.config(), Mode::Test).await.unwrap();
        assert_eq!(out.message(), "Net worth is unavailable");
    }
}
