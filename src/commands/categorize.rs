//! The `show` and `categorize` commands.

use crate::api::{Mode, RecordStore};
use crate::args::{CategorizeArgs, ShowArgs};
use crate::commands::{Out, Rows};
use crate::model::RowId;
use crate::pipeline::{filter_by_category, infer_table, BatchReport, CategorizationSession};
use crate::{Config, Result};
use anyhow::Context;
use tracing::info;

/// Loads one table and renders the rows that match the category filter.
pub async fn show(config: Config, mode: Mode, args: ShowArgs) -> Result<Out<Rows>> {
    let mut store = RecordStore::new(config, mode).await?;
    let table = store.load(args.kind()).await?;
    let selected = filter_by_category(&table, args.category());
    let rows = Rows::ledger(args.format(), &table, &selected)?;
    let mut message = format!(
        "Showing {} of {} rows from {}",
        selected.len(),
        table.len(),
        table.name()
    );
    if table.blank_rows() > 0 {
        message.push_str(&format!(
            " ({} blank rows are not numbered)",
            table.blank_rows()
        ));
    }
    Ok(Out::new(message, rows))
}

/// Loads one table, optionally infers categories for it, applies the `ROW=LABEL` choices as a
/// single batch, renders the result and, with `--save`, writes it back to the sheet.
pub async fn categorize(config: Config, mode: Mode, args: CategorizeArgs) -> Result<Out<Rows>> {
    let rules = config.expense_rules();
    let mut store = RecordStore::new(config, mode).await?;
    let mut table = store.load(args.kind()).await?;
    let mut report = BatchReport::default();

    if args.infer() {
        let (inferred, inferred_report) = infer_table(table, &rules)?;
        table = inferred;
        report.merge(inferred_report);
    }

    let mut session = CategorizationSession::new();
    for choice in args.choices() {
        session.choose(table.name(), RowId(choice.row()), choice.label());
    }
    let (table, chosen_report) = session.apply(table);
    report.merge(chosen_report);
    info!(
        "Applied {} category choices to {}, ignored {}",
        report.applied,
        table.name(),
        report.ignored
    );

    if args.save() {
        store
            .save(&table)
            .await
            .with_context(|| format!("Unable to save the categories to {}", table.name()))?;
    }

    let selected = filter_by_category(&table, args.category());
    let rows = Rows::ledger(args.format(), &table, &selected)?;
    let message = if args.save() {
        format!("Saved categories for {} rows to {}", table.len(), table.name())
    } else {
        format!(
            "Categorized {} rows of {} (not saved, use --save to write them to the sheet)",
            table.len(),
            table.name()
        )
    };
    Ok(Out::new(message, rows))
}
