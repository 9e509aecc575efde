//! Command handlers for the fintrack CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod auth;
mod categorize;
mod edit;
mod init;
mod rows;
mod summary;

use serde::Serialize;
use std::fmt::{Debug, Display};
use tracing::{debug, info};

pub use auth::auth;
pub use categorize::{categorize, show};
pub use edit::{add, remove};
pub use init::init;
pub use rows::Rows;
pub use summary::{net_worth, summary, Summary, TableSummary};

/// The output type for a command: a message about the outcome and, optionally, structured data
/// to print.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug + Display,
{
    /// Logs the message at `info!` and prints the structured data, if any, to stdout.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            debug!("Printing {structure:?}");
            println!("{structure}");
        }
    }
}
