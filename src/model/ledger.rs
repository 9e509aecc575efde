use crate::model::date::parse_date;
use crate::model::mapping::{Header, Mapping};
use crate::model::{Amount, LedgerKind, Vocabulary};
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identifies a row by its zero-based position in the table as it was loaded. Row ids are only
/// meaningful within one load cycle.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RowId(pub usize);

impl Display for RowId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<usize> for RowId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// The columns a ledger row knows about. Everything else is carried in `other_fields`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub(crate) enum LedgerColumn {
    Date,
    Description,
    Amount,
    Category,
}

/// Represents a single row from one of the ledger tabs.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LedgerRow {
    /// The parsed date, `None` when the cell could not be understood as a date.
    pub(crate) date: Option<NaiveDate>,
    /// The date cell exactly as it appeared in the sheet.
    pub(crate) date_text: String,
    pub(crate) description: String,
    pub(crate) amount: Amount,
    /// Empty when the row is uncategorized.
    pub(crate) category: String,
    pub(crate) other_fields: BTreeMap<String, String>,
}

impl LedgerRow {
    /// Creates an uncategorized row.
    pub fn new(date: impl Into<String>, description: impl Into<String>, amount: Amount) -> Self {
        let date_text = date.into();
        Self {
            date: parse_date(&date_text),
            date_text,
            description: description.into(),
            amount,
            category: String::new(),
            other_fields: BTreeMap::new(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn date_text(&self) -> &str {
        &self.date_text
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The row's category, or `None` when it is uncategorized.
    pub fn category(&self) -> Option<&str> {
        if self.category.is_empty() {
            None
        } else {
            Some(&self.category)
        }
    }

    pub fn other_fields(&self) -> &BTreeMap<String, String> {
        &self.other_fields
    }

    fn set(&mut self, header: &Header, role: Option<LedgerColumn>, value: String) -> Result<()> {
        match role {
            Some(LedgerColumn::Date) => {
                self.date = parse_date(&value);
                self.date_text = value;
            }
            Some(LedgerColumn::Description) => self.description = value,
            Some(LedgerColumn::Amount) => {
                self.amount = Amount::from_str(&value)
                    .with_context(|| format!("Bad value in the '{}' column", header.as_ref()))?
            }
            // Categories always start empty for a session; whatever the sheet held is dropped.
            Some(LedgerColumn::Category) => {}
            None => {
                let _ = self.other_fields.insert(header.as_ref().to_string(), value);
            }
        }
        Ok(())
    }

    fn get(&self, header: &Header, role: Option<LedgerColumn>) -> String {
        match role {
            Some(LedgerColumn::Date) => self.date_text.clone(),
            Some(LedgerColumn::Description) => self.description.clone(),
            Some(LedgerColumn::Amount) => self.amount.to_string(),
            Some(LedgerColumn::Category) => self.category.clone(),
            None => self
                .other_fields
                .get(header.as_ref())
                .cloned()
                .unwrap_or_default(),
        }
    }
}

/// A named ledger table: the rows of one tab, its header mapping and its category vocabulary.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LedgerTable {
    name: String,
    kind: LedgerKind,
    #[serde(skip)]
    vocabulary: Vocabulary,
    #[serde(rename = "headers")]
    mapping: Mapping,
    rows: Vec<LedgerRow>,
    /// Blank sheet rows dropped by `parse`. They are not numbered and a save removes them.
    #[serde(skip)]
    blank_rows: usize,
    /// Non-empty `Category` cells dropped by `parse`.
    #[serde(skip)]
    discarded_categories: usize,
}

impl LedgerTable {
    /// Creates a table with no rows. The header is `Date, Description, Amount, Category`.
    pub fn empty(name: impl Into<String>, kind: LedgerKind, vocabulary: Vocabulary) -> Self {
        Self {
            name: name.into(),
            kind,
            vocabulary,
            mapping: Mapping::new(DEFAULT_HEADERS).unwrap_or_default(),
            rows: Vec::new(),
            blank_rows: 0,
            discarded_categories: 0,
        }
    }

    /// Given the downloaded cells of a tab, parse the header row and the data rows into a table.
    ///
    /// - A tab with no cells at all becomes a table with no header and no rows.
    /// - Blank rows are skipped.
    /// - Any `Category` values are discarded; the column is appended if it is missing.
    pub fn parse<S, R, I>(
        name: impl Into<String>,
        kind: LedgerKind,
        vocabulary: Vocabulary,
        sheet_data: I,
    ) -> Result<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
        I: IntoIterator<Item = R>,
    {
        let name = name.into();
        let mut rows = sheet_data.into_iter();
        let mut mapping = match rows.next() {
            Some(header_row) => Mapping::new(header_row.into_iter())?,
            None => {
                return Ok(Self {
                    name,
                    kind,
                    vocabulary,
                    mapping: Mapping::default(),
                    rows: Vec::new(),
                    blank_rows: 0,
                    discarded_categories: 0,
                })
            }
        };
        mapping.ensure_category();
        let headers = mapping.headers().to_vec();

        let mut data = Vec::new();
        let mut blank_rows = 0;
        let mut discarded_categories = 0;
        for (row_ix, row) in rows.enumerate() {
            let values: Vec<String> = row.into_iter().map(|s| s.into()).collect();
            if values.iter().all(|v| v.trim().is_empty()) {
                blank_rows += 1;
                continue;
            }
            if values.len() > headers.len() {
                bail!(
                    "A row longer than the headers list was encountered at row {}",
                    row_ix + 2
                );
            }
            let mut ledger_row = LedgerRow::default();
            for (ix, value) in values.into_iter().enumerate() {
                let role = mapping.role(ix);
                if role == Some(LedgerColumn::Category) && !value.trim().is_empty() {
                    discarded_categories += 1;
                }
                ledger_row
                    .set(&headers[ix], role, value)
                    .with_context(|| format!("Unable to parse row {}", row_ix + 2))?;
            }
            data.push(ledger_row);
        }

        Ok(Self {
            name,
            kind,
            vocabulary,
            mapping,
            rows: data,
            blank_rows,
            discarded_categories,
        })
    }

    /// Converts the table to rows suitable for writing to a Google Sheet: the header row first,
    /// then one row per ledger row in header order. A table without headers produces no rows.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        if self.mapping.is_empty() {
            return Vec::new();
        }
        let headers = self.mapping.headers();
        let mut out = vec![headers
            .iter()
            .map(|h| h.as_ref().to_string())
            .collect::<Vec<_>>()];
        out.extend(self.rows.iter().map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(ix, h)| row.get(h, self.mapping.role(ix)))
                .collect()
        }));
        out
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> LedgerKind {
        self.kind
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&LedgerRow> {
        self.rows.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// How many blank rows the tab had when it was parsed.
    pub fn blank_rows(&self) -> usize {
        self.blank_rows
    }

    /// How many rows had a category in the sheet that was discarded when the tab was parsed.
    pub fn discarded_categories(&self) -> usize {
        self.discarded_categories
    }

    /// Whether the table has a column that amounts were read from.
    pub fn has_amount(&self) -> bool {
        self.mapping.has_amount()
    }

    /// Appends a row. A headerless table gets the default header first. The row's category is
    /// kept only if the vocabulary accepts it.
    pub fn push_row(&mut self, mut row: LedgerRow) -> RowId {
        if self.mapping.is_empty() {
            if let Ok(mapping) = Mapping::new(DEFAULT_HEADERS) {
                self.mapping = mapping;
            }
        }
        if !self.vocabulary.accepts(&row.category) {
            row.category.clear();
        }
        self.rows.push(row);
        RowId(self.rows.len() - 1)
    }

    /// Removes a row, shifting the ids of every row after it.
    pub fn remove_row(&mut self, id: RowId) -> Option<LedgerRow> {
        if id.0 < self.rows.len() {
            Some(self.rows.remove(id.0))
        } else {
            None
        }
    }

    /// Stores `label` as the category of the row at `id`. Callers validate the label.
    pub(crate) fn set_category(&mut self, id: RowId, label: &str) -> bool {
        match self.rows.get_mut(id.0) {
            Some(row) => {
                row.category = label.to_string();
                true
            }
            None => false,
        }
    }
}

const DEFAULT_HEADERS: [&str; 4] = ["Date", "Description", "Amount", "Category"];
