//! Configuration file handling.
//!
//! The configuration file is stored at `$FINANCE_TRACKER_HOME/config.json`. It holds the Google
//! Sheet URL, the load cache lifetime, the credential file paths and any overrides of the
//! built-in tab names, category vocabularies and expense keyword rules.

use crate::model::{LedgerKind, Vocabulary};
use crate::pipeline::ExpenseRules;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "finance-tracker";
const CONFIG_VERSION: u8 = 1;
const CACHE_TTL_SECS: u64 = 300;
const SECRETS: &str = ".secrets";
const CLIENT_SECRET_JSON: &str = "client_secret.json";
const TOKEN_JSON: &str = "token.json";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to the home directory and from there it loads `config.json`. It provides paths to
/// other items that are either configurable or are expected in a certain location within the home
/// directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    spreadsheet_id: String,
}

impl Config {
    /// Creates the home directory, its `.secrets` subdirectory and:
    /// - Creates an initial `config.json` file using `sheet_url` along with default settings
    /// - Copies `secret_file`, and `token_file` if given, into their default locations in the
    ///   secrets directory.
    ///
    /// # Errors
    /// - Returns an error if `sheet_url` has no spreadsheet id or any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        secret_file: &Path,
        token_file: Option<&Path>,
        sheet_url: &str,
    ) -> Result<Self> {
        let spreadsheet_id = extract_spreadsheet_id(sheet_url)
            .context("Failed to extract spreadsheet ID from sheet URL")?
            .to_string();

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets_dir = root.join(SECRETS);
        utils::make_dir(&secrets_dir).await?;
        utils::copy(secret_file, secrets_dir.join(CLIENT_SECRET_JSON)).await?;
        if let Some(token_file) = token_file {
            utils::copy(token_file, secrets_dir.join(TOKEN_JSON)).await?;
        }

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            sheet_url: sheet_url.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets: secrets_dir,
            config_path,
            config_file,
            spreadsheet_id,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - validate that the secrets directory exists
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The home directory is missing, have you run 'fintrack init'?")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let spreadsheet_id = extract_spreadsheet_id(&config_file.sheet_url)
            .context("Failed to extract spreadsheet ID from sheet URL")?
            .to_string();

        let secrets = root.join(SECRETS);
        if !secrets.is_dir() {
            bail!("The secrets directory is missing '{}'", secrets.display())
        }

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
            spreadsheet_id,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn sheet_url(&self) -> &str {
        &self.config_file.sheet_url
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// How long a loaded tab is served from the cache before it is fetched again.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config_file.cache_ttl_secs)
    }

    /// The tab holding `kind` tables.
    pub fn tab(&self, kind: LedgerKind) -> &str {
        self.config_file
            .tabs
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_tab())
    }

    /// The category vocabulary for `kind` tables.
    pub fn vocabulary(&self, kind: LedgerKind) -> Vocabulary {
        self.config_file
            .vocabularies
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.default_vocabulary())
    }

    pub fn expense_rules(&self) -> ExpenseRules {
        self.config_file.expense_rules.clone().unwrap_or_default()
    }

    /// Returns the stored `client_secret_path` if it is absolute, otherwise resolves the relative
    /// path.
    pub fn client_secret_path(&self) -> PathBuf {
        self.resolve_secrets_file_path(self.config_file.client_secret_path())
    }

    /// Returns the stored `token_path` if it is absolute, otherwise resolves the relative path.
    pub fn token_path(&self) -> PathBuf {
        self.resolve_secrets_file_path(self.config_file.token_path())
    }

    fn resolve_secrets_file_path(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    #[cfg(test)]
    pub(crate) fn set_cache_ttl_secs(&mut self, secs: u64) {
        self.config_file.cache_ttl_secs = secs;
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "finance-tracker",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
///   "cache_ttl_secs": 300,
///   "tabs": { "expense": "Spending" },
///   "vocabularies": { "income": ["Salary", "Refund", "Other"] },
///   "expense_rules": [ { "category": "Fixed", "keywords": ["rent", "mortgage"] } ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "finance-tracker"
    app_name: String,

    config_version: u8,

    /// URL to the Google Sheet
    sheet_url: String,

    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,

    /// Tab name overrides by ledger kind.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    tabs: BTreeMap<LedgerKind, String>,

    /// Category vocabulary overrides by ledger kind.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    vocabularies: BTreeMap<LedgerKind, Vocabulary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    expense_rules: Option<ExpenseRules>,

    /// Path to the OAuth 2.0 client credentials file (optional, relative to the home directory or
    /// absolute). Defaults to .secrets/client_secret.json.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_secret_path: Option<PathBuf>,

    /// Path to the OAuth token file (optional, relative to the home directory or absolute).
    /// Defaults to .secrets/token.json.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,
}

fn default_cache_ttl_secs() -> u64 {
    CACHE_TTL_SECS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: String::new(),
            cache_ttl_secs: CACHE_TTL_SECS,
            tabs: BTreeMap::new(),
            vocabularies: BTreeMap::new(),
            expense_rules: None,
            client_secret_path: None,
            token_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and checks its `app_name`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    pub fn client_secret_path(&self) -> PathBuf {
        self.client_secret_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON))
    }

    pub fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(TOKEN_JSON))
    }
}

/// Extracts the spreadsheet ID from a Google Sheets URL such as
/// `https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/edit`.
fn extract_spreadsheet_id(url: &str) -> Result<&str> {
    let parts: Vec<&str> = url.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "d" && i + 1 < parts.len() {
            let id = parts[i + 1]
                .split(['?', '#'])
                .next()
                .unwrap_or_default();
            if id.is_empty() {
                break;
            }
            return Ok(id);
        }
    }
    bail!(
        "Invalid Google Sheets URL format. Expected: \
        https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
    )
}
