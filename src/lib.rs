//! finance-tracker: categorize and summarize the personal finance records kept in the tabs of a
//! Google sheet.
//!
//! The `api` module loads and saves whole tabs through the `RecordStore`, the `model` module
//! turns their cells into `LedgerTable`s and the `pipeline` module categorizes and aggregates
//! them. The `commands` module ties these together for the `fintrack` binary.

mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod pipeline;
mod utils;

#[cfg(test)]
mod test;

pub use api::{Mode, RecordStore};
pub use config::Config;
pub use error::{AggregationError, Error, Result, StoreError};
pub use model::Amount;
