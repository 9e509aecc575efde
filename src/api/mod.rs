//! Access to the spreadsheet that holds the ledger tabs.
//!
//! The `Sheet` trait is the narrow seam between the record store and Google: fetch a tab, clear a
//! tab, write a tab. `GoogleSheet` implements it against the Sheets API and `TestSheet` against
//! in-memory data so that the whole program can run without network access.

mod files;
mod oauth;
mod sheet;
mod sheet_test_client;
mod store;

use crate::error::StoreError;
use crate::{Config, Result};
use sheet::GoogleSheet;
use tracing::debug;

pub(crate) use oauth::TokenProvider;
pub(crate) use sheet_test_client::{TestSheet, TestSheetState};
pub use store::RecordStore;

const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

/// When this environment variable is set and non-empty the program uses `TestSheet`.
pub const TEST_MODE_ENV: &str = "FINANCE_TRACKER_IN_TEST_MODE";

/// Chooses which `Sheet` implementation backs the record store.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Google,
    Test,
}

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// Whole-tab operations against a spreadsheet. Every failure is a `StoreError` so that callers
/// can tell a missing tab from a permission problem.
#[async_trait::async_trait]
pub(crate) trait Sheet: Send {
    /// All cells of `tab`, row by row, as formatted text. Trailing empty cells may be missing.
    async fn get(&mut self, tab: &str) -> std::result::Result<Vec<Vec<String>>, StoreError>;

    /// Removes every value from `tab`, leaving the tab itself in place.
    async fn clear(&mut self, tab: &str) -> std::result::Result<(), StoreError>;

    /// Writes `rows` starting at the top-left cell of `tab`.
    async fn write(&mut self, tab: &str, rows: &[Vec<String>])
        -> std::result::Result<(), StoreError>;
}

/// Creates the `Sheet` for `mode`. In Google mode this loads, and if necessary refreshes, the
/// OAuth token.
pub(crate) async fn sheet(config: &Config, mode: Mode) -> Result<Box<dyn Sheet>> {
    debug!("Connecting to spreadsheet {} in {mode:?} mode", config.spreadsheet_id());
    match mode {
        Mode::Google => {
            let token_provider =
                TokenProvider::load(&config.client_secret_path(), &config.token_path()).await?;
            Ok(Box::new(
                GoogleSheet::new(config.spreadsheet_id(), token_provider).await?,
            ))
        }
        Mode::Test => Ok(Box::new(TestSheet::new(config.spreadsheet_id()))),
    }
}
