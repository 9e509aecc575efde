//! These structs provide the CLI interface for the fintrack CLI.

use crate::model::LedgerKind;
use crate::pipeline::CategoryFilter;
use crate::utils;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fintrack: categorize and summarize the personal finance records kept in a Google sheet.
///
/// The sheet holds five tabs: income, expenses, debts, savings goals and account balances. This
/// program loads them, lets you assign each row a category from a fixed list, writes those
/// categories back to the sheet when you ask it to, and prints monthly totals, category
/// breakdowns and your net worth.
///
/// You will need a Google OAuth client secret and a token file for an account that can edit the
/// sheet. Run `fintrack init` first.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. You need:
    ///
    /// - The URL of your Google Sheet, passed as --sheet-url.
    ///
    /// - An OAuth 2.0 client secret JSON downloaded from Google Cloud Console, passed as
    ///   --client-secret.
    ///
    /// - Optionally, a token.json holding an access token and a refresh token for that client,
    ///   passed as --token. Without it, place the file in the .secrets directory later.
    Init(InitArgs),
    /// Verify the OAuth token, refreshing it if it has expired.
    Auth,
    /// Print one ledger table.
    Show(ShowArgs),
    /// Assign categories to the rows of a table, optionally saving them to the sheet.
    Categorize(CategorizeArgs),
    /// Append a row to a table and save it to the sheet.
    Add(AddArgs),
    /// Remove a row from a table and save it to the sheet.
    Remove(RemoveArgs),
    /// Print totals, monthly totals and category breakdowns for every table, and net worth.
    Summary(SummaryArgs),
    /// Print account balances minus debt balances.
    NetWorth,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration and credentials are held. Defaults to
    /// ~/finance-tracker
    #[arg(long, env = "FINANCE_TRACKER_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `fintrack init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL to your Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long)]
    sheet_url: String,

    /// The path to your downloaded OAuth client credentials. This file will be copied into the
    /// secrets directory.
    #[arg(long)]
    client_secret: PathBuf,

    /// The path to an existing OAuth token file. This file will be copied into the secrets
    /// directory.
    #[arg(long)]
    token: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(
        sheet_url: impl Into<String>,
        client_secret: impl Into<PathBuf>,
        token: Option<PathBuf>,
    ) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            client_secret: client_secret.into(),
            token,
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn client_secret(&self) -> &Path {
        &self.client_secret
    }

    pub fn token(&self) -> Option<&Path> {
        self.token.as_deref()
    }
}

/// How tables and summaries are printed.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A markdown table.
    #[default]
    Table,
    Csv,
    Json,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// Args for the `fintrack show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// Which table to print.
    kind: LedgerKind,

    /// Only print rows with this category, or All.
    #[arg(long, default_value = "All")]
    category: CategoryFilter,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

impl ShowArgs {
    pub fn new(kind: LedgerKind, category: CategoryFilter, format: OutputFormat) -> Self {
        Self {
            kind,
            category,
            format,
        }
    }

    pub fn kind(&self) -> LedgerKind {
        self.kind
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// A `ROW=LABEL` category choice from the command line.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RowLabel {
    row: usize,
    label: String,
}

impl RowLabel {
    pub fn new(row: usize, label: impl Into<String>) -> Self {
        Self {
            row,
            label: label.into(),
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl FromStr for RowLabel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, label) = utils::parse_row_label(s)?;
        Ok(Self { row, label })
    }
}

/// Args for the `fintrack categorize` command.
#[derive(Debug, Parser, Clone)]
pub struct CategorizeArgs {
    /// Which table to categorize.
    kind: LedgerKind,

    /// A category choice as ROW=LABEL, where ROW is the number in the Row column of `show`.
    /// May be given more than once. Labels that are not in the table's category list are
    /// ignored; an empty label clears the row's category.
    #[arg(long = "set", value_name = "ROW=LABEL")]
    choices: Vec<RowLabel>,

    /// Infer categories from descriptions before applying --set choices. Expenses only.
    #[arg(long)]
    infer: bool,

    /// Write the categorized table back to the sheet.
    #[arg(long)]
    save: bool,

    /// Only print rows with this category, or All.
    #[arg(long, default_value = "All")]
    category: CategoryFilter,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

impl CategorizeArgs {
    pub fn new(
        kind: LedgerKind,
        choices: Vec<RowLabel>,
        infer: bool,
        save: bool,
        category: CategoryFilter,
        format: OutputFormat,
    ) -> Self {
        Self {
            kind,
            choices,
            infer,
            save,
            category,
            format,
        }
    }

    pub fn kind(&self) -> LedgerKind {
        self.kind
    }

    pub fn choices(&self) -> &[RowLabel] {
        &self.choices
    }

    pub fn infer(&self) -> bool {
        self.infer
    }

    pub fn save(&self) -> bool {
        self.save
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Args for the `fintrack add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// Which table to add the row to.
    kind: LedgerKind,

    #[arg(long)]
    date: String,

    #[arg(long)]
    description: String,

    /// The amount, e.g. 12.50 or -$1,200.00
    #[arg(long, allow_hyphen_values = true)]
    amount: String,

    /// A category from the table's category list.
    #[arg(long)]
    category: Option<String>,
}

impl AddArgs {
    pub fn new(
        kind: LedgerKind,
        date: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
        category: Option<String>,
    ) -> Self {
        Self {
            kind,
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
            category,
        }
    }

    pub fn kind(&self) -> LedgerKind {
        self.kind
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Args for the `fintrack remove` command.
#[derive(Debug, Parser, Clone)]
pub struct RemoveArgs {
    /// Which table to remove the row from.
    kind: LedgerKind,

    /// The number in the Row column of `show`. Blank rows in the sheet are not numbered, and
    /// saving the table removes them.
    row: usize,
}

impl RemoveArgs {
    pub fn new(kind: LedgerKind, row: usize) -> Self {
        Self { kind, row }
    }

    pub fn kind(&self) -> LedgerKind {
        self.kind
    }

    pub fn row(&self) -> usize {
        self.row
    }
}

/// Args for the `fintrack summary` command.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// Infer expense categories from descriptions so the expense breakdown is not empty.
    #[arg(long)]
    infer: bool,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

impl SummaryArgs {
    pub fn new(infer: bool, format: OutputFormat) -> Self {
        Self { infer, format }
    }

    pub fn infer(&self) -> bool {
        self.infer
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("finance-tracker"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or FINANCE_TRACKER_HOME instead of relying on the \
                default directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("finance-tracker")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("fintrack").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_categorize_args() {
        let args = parse(&[
            "--home",
            "/tmp/ft",
            "categorize",
            "expense",
            "--set",
            "0=Fixed",
            "--set",
            "3=",
            "--infer",
            "--format",
            "json",
        ]);
        assert_eq!(args.common().home().path(), Path::new("/tmp/ft"));
        match args.command() {
            Command::Categorize(c) => {
                assert_eq!(c.kind(), LedgerKind::Expense);
                assert_eq!(
                    c.choices(),
                    [RowLabel::new(0, "Fixed"), RowLabel::new(3, "")]
                );
                assert!(c.infer());
                assert!(!c.save());
                assert_eq!(c.category(), &CategoryFilter::All);
                assert_eq!(c.format(), OutputFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_show_args() {
        let args = parse(&["show", "savings-goal", "--category", "Travel"]);
        match args.command() {
            Command::Show(s) => {
                assert_eq!(s.kind(), LedgerKind::SavingsGoal);
                assert_eq!(s.category(), &CategoryFilter::Label("Travel".into()));
                assert_eq!(s.format(), OutputFormat::Table);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_add_negative_amount() {
        let args = parse(&[
            "add",
            "income",
            "--date",
            "2025-11-02",
            "--description",
            "Chargeback",
            "--amount",
            "-$40.00",
        ]);
        match args.command() {
            Command::Add(a) => {
                assert_eq!(a.amount(), "-$40.00");
                assert_eq!(a.category(), None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bad_row_label() {
        let result = Args::try_parse_from(["fintrack", "categorize", "debt", "--set", "Mortgage"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
    }
}
