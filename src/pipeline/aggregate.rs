use crate::error::AggregationError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Totals keyed by a category label or a `YYYY-MM` month.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Aggregate(BTreeMap<String, Decimal>);

impl Aggregate {
    pub fn get(&self, key: &str) -> Option<Decimal> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order. Month keys therefore come out chronologically.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries with the largest total first; ties keep key order.
    pub fn sorted_desc(&self) -> Vec<(&str, Decimal)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// The sum of all groups, or `None` if it overflows.
    pub fn total(&self) -> Option<Decimal> {
        self.0
            .values()
            .try_fold(Decimal::ZERO, |sum, v| sum.checked_add(*v))
    }

    /// Sums the values of each key. Fails with `Overflow` naming `table` when a group's sum does
    /// not fit in a `Decimal`.
    pub(crate) fn try_collect<I>(table: &str, entries: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            let sum: &mut Decimal = map.entry(key).or_insert(Decimal::ZERO);
            *sum = sum
                .checked_add(value)
                .ok_or_else(|| AggregationError::Overflow(table.to_string()))?;
        }
        Ok(Self(map))
    }
}
