use crate::args::OutputFormat;
use crate::model::{LedgerRow, LedgerTable, RowId};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Debug, Display, Formatter};

/// Rendered rows in the requested output format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    /// JSON array of objects where each row is a self-describing object with column names as keys.
    Json(Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({v:?})"),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => match serde_json::to_string_pretty(v) {
                Ok(s) => write!(f, "{s}"),
                Err(_) => write!(f, "{v:?}"),
            },
            Rows::Table(s) => write!(f, "{s}"),
            Rows::Csv(s) => write!(f, "{s}"),
        }
    }
}

impl Rows {
    /// Renders `records` under `headers`. Records shorter than the header are padded.
    pub fn new(format: OutputFormat, headers: &[String], records: &[Vec<String>]) -> Result<Self> {
        Ok(match format {
            OutputFormat::Table => Rows::Table(markdown(headers, records)),
            OutputFormat::Csv => Rows::Csv(csv_text(headers, records)?),
            OutputFormat::Json => Rows::Json(json_objects(headers, records)),
        })
    }

    /// Renders the selected rows of a ledger table, prefixed with a `Row` column holding each
    /// row's id.
    pub(crate) fn ledger(
        format: OutputFormat,
        table: &LedgerTable,
        selected: &[(RowId, &LedgerRow)],
    ) -> Result<Self> {
        let mut cells = table.to_rows().into_iter();
        let mut headers = vec![ROW_STR.to_string()];
        headers.extend(cells.next().unwrap_or_default());
        let cells: Vec<Vec<String>> = cells.collect();
        let records: Vec<Vec<String>> = selected
            .iter()
            .filter_map(|(id, _)| {
                cells.get(id.0).map(|values| {
                    std::iter::once(id.to_string())
                        .chain(values.iter().cloned())
                        .collect()
                })
            })
            .collect();
        Rows::new(format, &headers, &records)
    }
}

const ROW_STR: &str = "Row";

fn cell(record: &[String], ix: usize) -> &str {
    record.get(ix).map(String::as_str).unwrap_or_default()
}

fn markdown(headers: &[String], records: &[Vec<String>]) -> String {
    let escape = |s: &str| s.replace('|', "\\|");
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|h| escape(h).chars().count().max(3))
        .collect();
    for record in records {
        for (ix, width) in widths.iter_mut().enumerate() {
            *width = (*width).max(escape(cell(record, ix)).chars().count());
        }
    }

    let line = |values: Vec<String>| {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut out = Vec::with_capacity(records.len() + 2);
    out.push(line(headers.iter().map(|h| escape(h)).collect()));
    out.push(line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for record in records {
        out.push(line(
            (0..headers.len())
                .map(|ix| escape(cell(record, ix)))
                .collect(),
        ));
    }
    out.join("\n")
}

fn csv_text(headers: &[String], records: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for record in records {
        writer.write_record((0..headers.len()).map(|ix| cell(record, ix)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Unable to finish writing CSV")?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

fn json_objects(headers: &[String], records: &[Vec<String>]) -> Value {
    Value::Array(
        records
            .iter()
            .map(|record| {
                let object: Map<String, Value> = headers
                    .iter()
                    .enumerate()
                    .map(|(ix, h)| (h.clone(), Value::String(cell(record, ix).to_string())))
                    .collect();
                Value::Object(object)
            })
            .collect(),
    )
}
