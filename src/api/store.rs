use crate::api::{self, Mode, Sheet};
use crate::error::StoreError;
use crate::model::{LedgerKind, LedgerTable};
use crate::{Config, Result};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Loads ledger tables from, and saves them to, the tabs of the spreadsheet.
///
/// Loads go through a cache of raw cell text keyed by tab name. An entry is used until it is
/// older than the configured TTL; nothing else invalidates it, not even a save to the same tab.
/// Each CLI command builds its own store, so the cache only serves repeated loads made through
/// one store, as a library caller holding on to it would do.
pub struct RecordStore {
    sheet: Box<dyn Sheet>,
    config: Config,
    cache: HashMap<String, CacheEntry>,
}

struct CacheEntry {
    fetched_at: Instant,
    cells: Vec<Vec<String>>,
}

impl RecordStore {
    /// Connects to the spreadsheet named in `config`, using Google or the in-memory test sheet
    /// depending on `mode`.
    pub async fn new(config: Config, mode: Mode) -> Result<Self> {
        let sheet = api::sheet(&config, mode).await?;
        Ok(Self::with_sheet(config, sheet))
    }

    pub(crate) fn with_sheet(config: Config, sheet: Box<dyn Sheet>) -> Self {
        Self {
            sheet,
            config,
            cache: HashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loads the table for `kind` from its configured tab. Every row starts uncategorized.
    pub async fn load(&mut self, kind: LedgerKind) -> std::result::Result<LedgerTable, StoreError> {
        let tab = self.config.tab(kind).to_string();
        let cells = self.fetch(&tab).await?;
        let table = LedgerTable::parse(&tab, kind, self.config.vocabulary(kind), cells)
            .map_err(|e| StoreError::malformed(&tab, &e))?;
        debug!("Loaded {} rows from {tab}", table.len());
        Ok(table)
    }

    /// Overwrites the table's tab with its header and rows: the tab is cleared, then written.
    /// If the write fails after the clear, the tab is left empty.
    pub async fn save(&mut self, table: &LedgerTable) -> std::result::Result<(), StoreError> {
        let tab = table.name();
        let rows = table.to_rows();
        if table.blank_rows() > 0 {
            warn!("Saving removes {} blank rows from {tab}", table.blank_rows());
        }
        self.sheet.clear(tab).await?;
        if !rows.is_empty() {
            self.sheet.write(tab, &rows).await?;
        }
        info!("Saved {} rows to {tab}", table.len());
        Ok(())
    }

    /// The raw cells of `tab`, from the cache while the entry is younger than the TTL.
    async fn fetch(&mut self, tab: &str) -> std::result::Result<Vec<Vec<String>>, StoreError> {
        let ttl = self.config.cache_ttl();
        if let Some(entry) = self.cache.get(tab) {
            if is_fresh(entry.fetched_at, ttl) {
                debug!("Using cached cells for {tab}");
                return Ok(entry.cells.clone());
            }
        }
        let cells = self.sheet.get(tab).await?;
        self.cache.insert(
            tab.to_string(),
            CacheEntry {
                fetched_at: Instant::now(),
                cells: cells.clone(),
            },
        );
        Ok(cells)
    }
}

fn is_fresh(fetched_at: Instant, ttl: Duration) -> bool {
    fetched_at.elapsed() < ttl
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestSheet, TestSheetState};
    use crate::model::RowId;
    use crate::pipeline::assign_category;
    use crate::test::TestEnv;

    async fn store(env: &TestEnv) -> RecordStore {
        RecordStore::new(env.config(), Mode::Test).await.unwrap()
    }

    #[tokio::test]
    async fn test_load_seeded_expenses() {
        let env = TestEnv::new().await;
        let mut store = store(&env).await;
        let table = store.load(LedgerKind::Expense).await.unwrap();
        assert_eq!(table.name(), "Expense_Log");
        assert_eq!(table.len(), 9);
        assert!(table.rows().iter().all(|r| r.category().is_none()));
    }

    #[tokio::test]
    async fn test_load_save_round_trip() {
        let env = TestEnv::new().await;
        let before = env.get_state().tabs["Accounts"].clone();
        let mut store = store(&env).await;
        let table = store.load(LedgerKind::Account).await.unwrap();
        store.save(&table).await.unwrap();
        assert_eq!(env.get_state().tabs["Accounts"], before);
    }

    #[tokio::test]
    async fn test_load_save_keeps_cell_text() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        let cells: Vec<Vec<String>> = [
            ["Date", "Account", "Balance"],
            ["1/5/24", "Checking", "1,200"],
            ["1/6/24", "Brokerage", "1,234.567"],
            ["2024-01-07", "Trust", "$12,345,678,901,234,567.89"],
            ["12/31/99", "Wallet", "7"],
            ["Jan 8, 2024", "Old loan", "-$999.5"],
        ]
        .iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect();
        state.tabs.insert(String::from("Accounts"), cells.clone());
        env.set_state(state);

        let mut store = store(&env).await;
        let table = store.load(LedgerKind::Account).await.unwrap();
        assert_eq!(table.len(), 5);
        store.save(&table).await.unwrap();

        let saved = &env.get_state().tabs["Accounts"];
        assert_eq!(saved[0], vec!["Date", "Account", "Balance", "Category"]);
        for (saved, original) in saved.iter().skip(1).zip(cells.iter().skip(1)) {
            assert_eq!(&saved[..3], &original[..]);
            assert_eq!(saved[3], "");
        }
    }

    #[tokio::test]
    async fn test_save_drops_blank_rows() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        let cells: Vec<Vec<String>> = [
            ["Date", "Account", "Balance"],
            ["1/5/24", "Checking", "100"],
            ["", "", ""],
            ["1/6/24", "Savings", "200"],
        ]
        .iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect();
        state.tabs.insert(String::from("Accounts"), cells);
        env.set_state(state);

        let mut store = store(&env).await;
        let table = store.load(LedgerKind::Account).await.unwrap();
        assert_eq!(table.blank_rows(), 1);
        assert_eq!(
            table.row(RowId(1)).unwrap().other_fields().get("Account").unwrap(),
            "Savings"
        );
        store.save(&table).await.unwrap();
        assert_eq!(env.get_state().tabs["Accounts"].len(), 3);
    }

    #[tokio::test]
    async fn test_save_writes_categories() {
        let env = TestEnv::new().await;
        let mut store = store(&env).await;
        let table = store.load(LedgerKind::Debt).await.unwrap();
        let table = assign_category(table, RowId(1), "Mortgage");
        store.save(&table).await.unwrap();
        let rows = &env.get_state().tabs["Debts_Tracker"];
        assert_eq!(rows[0][3], "Category");
        assert_eq!(rows[2][3], "Mortgage");
        assert_eq!(rows[1][3], "");
    }

    #[tokio::test]
    async fn test_cache_within_ttl() {
        let env = TestEnv::new().await;
        let mut store = store(&env).await;
        let _ = store.load(LedgerKind::Income).await.unwrap();
        let _ = store.load(LedgerKind::Income).await.unwrap();
        assert_eq!(env.get_state().gets, 1);

        // a save does not invalidate the cache
        let table = store.load(LedgerKind::Income).await.unwrap();
        let mut edited = table.clone();
        let _ = edited.remove_row(RowId(0));
        store.save(&edited).await.unwrap();
        let reloaded = store.load(LedgerKind::Income).await.unwrap();
        assert_eq!(reloaded, table);
        assert_eq!(env.get_state().gets, 1);
    }

    #[tokio::test]
    async fn test_cache_after_expiry() {
        let mut env = TestEnv::new().await;
        env.set_cache_ttl_secs(0);
        let mut store = store(&env).await;
        let _ = store.load(LedgerKind::Income).await.unwrap();
        let _ = store.load(LedgerKind::Income).await.unwrap();
        assert_eq!(env.get_state().gets, 2);
    }

    #[test]
    fn test_is_fresh() {
        let now = Instant::now();
        assert!(is_fresh(now, Duration::from_secs(300)));
        assert!(!is_fresh(now, Duration::ZERO));
    }

    #[tokio::test]
    async fn test_load_missing_tab() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        state.tabs.remove("Savings_Goals");
        env.set_state(state);
        let mut store = store(&env).await;
        assert_eq!(
            store.load(LedgerKind::SavingsGoal).await.unwrap_err(),
            StoreError::NotFound("Savings_Goals".into())
        );
    }

    #[tokio::test]
    async fn test_load_access_denied() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        state.deny_access = true;
        env.set_state(state);
        let mut store = store(&env).await;
        assert!(matches!(
            store.load(LedgerKind::Account).await.unwrap_err(),
            StoreError::Access(_)
        ));
    }

    #[tokio::test]
    async fn test_load_malformed() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        state.tabs.insert(
            "Accounts".into(),
            vec![
                vec!["Account".into(), "Balance".into()],
                vec!["Checking".into(), "a lot".into()],
            ],
        );
        env.set_state(state);
        let mut store = store(&env).await;
        match store.load(LedgerKind::Account).await.unwrap_err() {
            StoreError::Malformed { tab, message } => {
                assert_eq!(tab, "Accounts");
                assert!(message.contains("'a lot' is not a number"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_empty_tab() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        state.tabs.insert("Debts_Tracker".into(), Vec::new());
        env.set_state(state);
        let mut store = store(&env).await;
        let table = store.load(LedgerKind::Debt).await.unwrap();
        assert!(table.is_empty());
        assert!(!table.has_amount());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_tab_cleared() {
        let env = TestEnv::new().await;
        let mut store = store(&env).await;
        let table = store.load(LedgerKind::Account).await.unwrap();

        let mut state = env.get_state();
        state.fail_writes = true;
        env.set_state(state);

        assert!(matches!(
            store.save(&table).await.unwrap_err(),
            StoreError::Transport(_)
        ));
        assert!(env.get_state().tabs["Accounts"].is_empty());
    }

    #[tokio::test]
    async fn test_with_sheet() {
        let env = TestEnv::new().await;
        let id = uuid::Uuid::new_v4().to_string();
        let sheet = TestSheet::new(&id);
        let mut state = TestSheetState::seeded();
        state.tabs.insert(
            "Accounts".into(),
            vec![vec!["Account".into(), "Balance".into()]],
        );
        sheet.set_state(state);
        let mut store = RecordStore::with_sheet(env.config(), Box::new(sheet));
        assert!(store.load(LedgerKind::Account).await.unwrap().is_empty());
    }
}
