//! Implements the `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets.

use crate::api::Sheet;
use crate::error::StoreError;
use crate::model::LedgerKind;
use crate::Result;
use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tracing::trace;

/// The contents of one in-memory spreadsheet, plus switches for simulating failures.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub(crate) struct TestSheetState {
    pub(crate) tabs: BTreeMap<String, Vec<Vec<String>>>,
    /// How many times `get` has been called.
    pub(crate) gets: usize,
    /// Every operation fails with `StoreError::Access`.
    pub(crate) deny_access: bool,
    /// `write` fails with `StoreError::Transport`; `clear` still succeeds.
    pub(crate) fail_writes: bool,
}

impl TestSheetState {
    /// A state holding the seed data for all five tabs.
    pub(crate) fn seeded() -> Self {
        let tabs = [
            (LedgerKind::Income, INCOME_DATA),
            (LedgerKind::Expense, EXPENSE_DATA),
            (LedgerKind::Debt, DEBT_DATA),
            (LedgerKind::SavingsGoal, SAVINGS_GOAL_DATA),
            (LedgerKind::Account, ACCOUNT_DATA),
        ]
        .into_iter()
        .map(|(kind, csv)| (kind.default_tab().to_string(), load_csv(csv).unwrap_or_default()))
        .collect();
        Self {
            tabs,
            ..Self::default()
        }
    }
}

/// States by spreadsheet id. Each `TestSheet` is a handle onto one of these, so data written by
/// one command can be read by the next within the same process.
fn registry() -> MutexGuard<'static, HashMap<String, TestSheetState>> {
    static STATES: OnceLock<Mutex<HashMap<String, TestSheetState>>> = OnceLock::new();
    STATES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An implementation of the `Sheet` trait that does not use Google sheets. A spreadsheet id seen
/// for the first time starts out with the seed data.
pub(crate) struct TestSheet {
    spreadsheet_id: String,
}

impl TestSheet {
    pub(crate) fn new(spreadsheet_id: impl Into<String>) -> Self {
        let spreadsheet_id = spreadsheet_id.into();
        registry()
            .entry(spreadsheet_id.clone())
            .or_insert_with(TestSheetState::seeded);
        Self { spreadsheet_id }
    }

    pub(crate) fn get_state(&self) -> TestSheetState {
        registry()
            .get(&self.spreadsheet_id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn set_state(&self, state: TestSheetState) {
        registry().insert(self.spreadsheet_id.clone(), state);
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut TestSheetState) -> T) -> T {
        let mut states = registry();
        let state = states.entry(self.spreadsheet_id.clone()).or_default();
        f(state)
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get(&mut self, tab: &str) -> std::result::Result<Vec<Vec<String>>, StoreError> {
        trace!("TestSheet get for {tab}");
        self.with_state(|state| {
            if state.deny_access {
                return Err(denied());
            }
            state.gets += 1;
            state
                .tabs
                .get(tab)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(tab.to_string()))
        })
    }

    async fn clear(&mut self, tab: &str) -> std::result::Result<(), StoreError> {
        trace!("TestSheet clear for {tab}");
        self.with_state(|state| {
            if state.deny_access {
                return Err(denied());
            }
            match state.tabs.get_mut(tab) {
                Some(rows) => {
                    rows.clear();
                    Ok(())
                }
                None => Err(StoreError::NotFound(tab.to_string())),
            }
        })
    }

    async fn write(
        &mut self,
        tab: &str,
        rows: &[Vec<String>],
    ) -> std::result::Result<(), StoreError> {
        trace!("TestSheet write {} rows to {tab}", rows.len());
        self.with_state(|state| {
            if state.deny_access {
                return Err(denied());
            }
            if state.fail_writes {
                return Err(StoreError::Transport(String::from(
                    "HTTP 503: The service is currently unavailable",
                )));
            }
            match state.tabs.get_mut(tab) {
                Some(existing) => {
                    *existing = rows.to_vec();
                    Ok(())
                }
                None => Err(StoreError::NotFound(tab.to_string())),
            }
        })
    }
}

fn denied() -> StoreError {
    StoreError::Access(String::from(
        "The caller does not have permission (PERMISSION_DENIED)",
    ))
}

/// Loads data from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

const INCOME_DATA: &str = r##"Date,Description,Amount,Category,Notes
10/1/2025,Paycheck - Acme Corp,"$4,250.00",,
10/3/2025,Etsy shop sales,$312.40,,October orders
10/10/2025,Electric co. overcharge refund,$18.22,,
10/15/2025,Paycheck - Acme Corp,"$4,250.00",,
11/1/2025,Paycheck - Acme Corp,"$4,250.00",,
"##;

const EXPENSE_DATA: &str = r##"Date,Description,Amount,Category,Notes
10/1/2025,Monthly rent payment,"$1,850.00",,
10/2/2025,Whole Foods grocery run,$87.43,,
10/5/2025,Shell gas station,$52.30,,
10/8/2025,Comcast internet,$89.99,,autopay
10/12/2025,Movie tickets,$24.00,,
10/20/2025,Car insurance premium,$142.67,,
11/1/2025,Monthly rent payment,"$1,850.00",,
11/3/2025,Trader Joe's grocery,$63.21,,
sometime,Farmers market,$15.00,,date unknown
"##;

const DEBT_DATA: &str = r##"Description,Balance,Interest Rate,Category
Visa Signature,"$2,340.18",21.99%,
Home mortgage,"$212,500.00",6.25%,
Honda Civic loan,"$9,875.00",4.90%,
"##;

const SAVINGS_GOAL_DATA: &str = r##"Date,Description,Amount,Target,Category
10/1/2025,Rainy day fund,$500.00,"$10,000.00",
10/1/2025,House down payment,$750.00,"$60,000.00",
10/15/2025,Japan trip,$200.00,"$4,500.00",
"##;

const ACCOUNT_DATA: &str = r##"Account,Institution,Balance,Category
Everyday Checking,Bank A,"$3,412.77",
High Yield Savings,Bank B,"$18,250.00",
Brokerage,Broker C,"$41,980.35",
"##;
