use thiserror::Error as ThisError;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that come back from the record store. These are typed, rather than `anyhow`, because
/// the presentation layer decides what to show based on which one occurred.
#[derive(Debug, Clone, Eq, PartialEq, ThisError)]
pub enum StoreError {
    /// Authentication or permission failure against the spreadsheet.
    #[error("Access to the spreadsheet was denied: {0}")]
    Access(String),

    /// The named tab does not exist in the spreadsheet.
    #[error("The tab '{0}' was not found in the spreadsheet")]
    NotFound(String),

    /// The tab exists but its contents cannot be turned into a ledger table.
    #[error("The tab '{tab}' could not be parsed: {message}")]
    Malformed { tab: String, message: String },

    /// Any other failure while talking to the spreadsheet.
    #[error("The spreadsheet request failed: {0}")]
    Transport(String),
}

impl StoreError {
    pub(crate) fn malformed(tab: impl Into<String>, e: &Error) -> Self {
        StoreError::Malformed {
            tab: tab.into(),
            message: format!("{e:#}"),
        }
    }
}

/// Errors from aggregations that span more than one table.
#[derive(Debug, Clone, Eq, PartialEq, ThisError)]
pub enum AggregationError {
    #[error("The '{0}' table has no Amount or Balance column")]
    MissingAmountColumn(String),

    /// A sum did not fit in a `Decimal`.
    #[error("The amounts in '{0}' are too large to add up")]
    Overflow(String),
}
