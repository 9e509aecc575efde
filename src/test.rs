//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{TestSheet, TestSheetState};
use crate::Config;
use tempfile::TempDir;
use uuid::Uuid;

const SECRET_JSON: &str = r#"{
    "installed": {
        "client_id": "test-client-id",
        "client_secret": "test-secret",
        "redirect_uris": ["http://localhost"],
        "auth_uri": "https://accounts.google.com/o/oauth2/auth",
        "token_uri": "https://oauth2.googleapis.com/token"
    }
}"#;

const TOKEN_JSON: &str = r#"{
    "scopes": ["https://www.googleapis.com/auth/spreadsheets"],
    "access_token": "test-access-token",
    "refresh_token": "test-refresh-token",
    "expires_at": "2099-01-01T00:00:00Z"
}"#;

/// Test environment with a home directory, credential files and a `Config` whose spreadsheet id
/// is unique, so each test gets its own freshly seeded `TestSheet`.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("finance-tracker");
        let secret_path = temp_dir.path().join("client_secret.json");
        let token_path = temp_dir.path().join("token.json");
        std::fs::write(&secret_path, SECRET_JSON).unwrap();
        std::fs::write(&token_path, TOKEN_JSON).unwrap();

        let rand = Uuid::new_v4().to_string().replace('-', "");
        let sheet_url = format!("https://docs.google.com/spreadsheets/d/{rand}/edit");
        let config = Config::create(&root, &secret_path, Some(&token_path), &sheet_url)
            .await
            .unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Shortens or disables the load cache for tests that need to see fresh fetches.
    pub fn set_cache_ttl_secs(&mut self, secs: u64) {
        self.config.set_cache_ttl_secs(secs);
    }

    /// Gets the current state of the TestSheet associated with this environment.
    pub fn get_state(&self) -> TestSheetState {
        TestSheet::new(self.config.spreadsheet_id()).get_state()
    }

    /// Sets the state of the TestSheet associated with this environment.
    pub fn set_state(&self, state: TestSheetState) {
        TestSheet::new(self.config.spreadsheet_id()).set_state(state)
    }
}
