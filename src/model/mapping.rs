use crate::model::ledger::LedgerColumn;
use serde::de::Error as SerdeError;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MappingError(String);

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for MappingError {}

/// The header row of a tab and the role each header plays for a ledger row.
///
/// The amount-bearing column is `Amount` when present, otherwise `Balance`. A tab that has
/// neither has no amount column, which matters for net worth.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    headers: Vec<Header>,
    header_map: HashMap<Header, usize>,
    amount: Option<usize>,
}

impl Mapping {
    /// Create a new `Mapping` from the header row of a tab.
    pub fn new<S, I>(headers: I) -> Result<Self, MappingError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<Header> = headers.into_iter().map(|s| s.into().into()).collect();

        let header_map: HashMap<Header, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.to_owned(), idx))
            .collect();

        if header_map.len() != headers.len() {
            return Err(MappingError(String::from("Encountered a duplicate header")));
        }

        let amount = header_map
            .get(&Header::from(AMOUNT_STR))
            .or_else(|| header_map.get(&Header::from(BALANCE_STR)))
            .copied();

        Ok(Self {
            headers,
            header_map,
            amount,
        })
    }

    /// Appends the `Category` header if the tab does not already have one.
    pub(crate) fn ensure_category(&mut self) {
        let category = Header::from(CATEGORY_STR);
        if !self.header_map.contains_key(&category) {
            self.header_map.insert(category.clone(), self.headers.len());
            self.headers.push(category);
        }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn header_index(&self, header: impl Into<Header>) -> Option<usize> {
        let h = header.into();
        self.header_map.get(&h).cloned()
    }

    /// Whether the tab has an `Amount` or `Balance` column.
    pub fn has_amount(&self) -> bool {
        self.amount.is_some()
    }

    /// The role of the column at `ix`, or `None` for columns that are carried along untouched.
    pub(crate) fn role(&self, ix: usize) -> Option<LedgerColumn> {
        if Some(ix) == self.amount {
            return Some(LedgerColumn::Amount);
        }
        match self.headers.get(ix)?.as_ref() {
            DATE_STR => Some(LedgerColumn::Date),
            DESCRIPTION_STR => Some(LedgerColumn::Description),
            CATEGORY_STR => Some(LedgerColumn::Category),
            _ => None,
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.headers.len()))?;
        for header in &self.headers {
            seq.serialize_element(header.as_ref())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items: Vec<String> = Vec::deserialize(deserializer)?;
        let mapping = Mapping::new(items).map_err(D::Error::custom)?;
        Ok(mapping)
    }
}

/// Represents a header in the Google sheet, for example, `Description`
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(String);

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl<S: Into<String>> From<S> for Header {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl FromStr for Header {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

pub(crate) const DATE_STR: &str = "Date";
pub(crate) const DESCRIPTION_STR: &str = "Description";
pub(crate) const AMOUNT_STR: &str = "Amount";
pub(crate) const BALANCE_STR: &str = "Balance";
pub(crate) const CATEGORY_STR: &str = "Category";
