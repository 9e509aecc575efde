use crate::commands::{Out, Rows};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, its `.secrets` subdirectory and:
/// - Creates an initial `config.json` file using `sheet_url` along with default settings
/// - Copies `secret_file`, and `token_file` when given, into their default locations.
///
/// # Arguments
/// - `home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/finance-tracker`
/// - `secret_file` - The OAuth 2.0 client credentials JSON downloaded from Google Cloud Console.
/// - `token_file` - A `token.json` holding an access token and a refresh token for that client.
/// - `sheet_url` - The URL of the Google Sheet where the ledger tabs are kept.
///   e.g. https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL
///
/// # Errors
/// - Returns an error if the URL has no spreadsheet id or any file operation fails.
pub async fn init(
    home: &Path,
    secret_file: &Path,
    token_file: Option<&Path>,
    sheet_url: &str,
) -> Result<Out<Rows>> {
    let config = Config::create(home, secret_file, token_file, sheet_url)
        .await
        .context("Unable to create the data directory and configs")?;
    let mut message = format!(
        "Created the finance-tracker directory at {}",
        config.root().display()
    );
    if token_file.is_none() {
        message.push_str(&format!(
            ", place your token.json at {} before running other commands",
            config.token_path().display()
        ));
    }
    Ok(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let secret = dir.path().join("downloaded_secret.json");
        std::fs::write(&secret, "{}").unwrap();
        let home = dir.path().join("home");

        let out = init(
            &home,
            &secret,
            None,
            "https://docs.google.com/spreadsheets/d/abc123/edit",
        )
        .await
        .unwrap();
        assert!(out.message().contains("place your token.json"));

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.spreadsheet_id(), "abc123");
        assert!(config.client_secret_path().is_file());
        assert!(!config.token_path().exists());
    }

    #[tokio::test]
    async fn test_init_bad_url_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let secret = dir.path().join("downloaded_secret.json");
        std::fs::write(&secret, "{}").unwrap();
        let home = dir.path().join("home");

        let result = init(&home, &secret, None, "https://example.com/nothing-here").await;
        assert!(result.is_err());
        assert!(!home.exists());
    }
}
