//! The `add` and `remove` commands. Both rewrite the whole tab, so any categories assigned to
//! other rows in this session are written as they currently stand (empty after a fresh load).

use crate::api::{Mode, RecordStore};
use crate::args::{AddArgs, RemoveArgs};
use crate::commands::{Out, Rows};
use crate::model::{Amount, LedgerRow, LedgerTable, RowId};
use crate::pipeline::assign_category;
use crate::{Config, Result};
use anyhow::{bail, Context};
use std::str::FromStr;
use tracing::warn;

pub async fn add(config: Config, mode: Mode, args: AddArgs) -> Result<Out<Rows>> {
    let amount = Amount::from_str(args.amount()).context("Invalid --amount")?;
    let row = LedgerRow::new(args.date(), args.description(), amount);
    if row.date().is_none() {
        warn!(
            "'{}' is not a recognized date; the row will be left out of monthly totals",
            args.date()
        );
    }

    let mut store = RecordStore::new(config, mode).await?;
    let mut table = store.load(args.kind()).await?;
    warn_discarded_categories(&table);
    let id = table.push_row(row);
    if let Some(label) = args.category() {
        if !table.vocabulary().accepts(label) {
            warn!(
                "'{label}' is not one of the categories for {}: {}",
                table.name(),
                table.vocabulary().labels().join(", ")
            );
        }
        table = assign_category(table, id, label);
    }

    store.save(&table).await?;
    Ok(format!("Added row {id} to {}", table.name()).into())
}

pub async fn remove(config: Config, mode: Mode, args: RemoveArgs) -> Result<Out<Rows>> {
    let mut store = RecordStore::new(config, mode).await?;
    let mut table = store.load(args.kind()).await?;
    warn_discarded_categories(&table);
    let id = RowId(args.row());
    let Some(removed) = table.remove_row(id) else {
        bail!(
            "There is no row {id} in {}, which has {} rows",
            table.name(),
            table.len()
        );
    };
    store.save(&table).await?;
    Ok(format!(
        "Removed row {id} ('{}') from {}",
        removed.description(),
        table.name()
    )
    .into())
}

fn warn_discarded_categories(table: &LedgerTable) {
    if table.discarded_categories() > 0 {
        warn!(
            "{} rows in {} had a category in the sheet; saving clears them",
            table.discarded_categories(),
            table.name()
        );
    }
}
