//! The `auth` command.
//!
//! The OAuth consent flow that produces `token.json` is not run by this program. `auth` checks
//! that the client secret and token files are usable and refreshes the access token when it has
//! expired, so that a broken setup is reported before any sheet is touched.

use crate::api::TokenProvider;
use crate::commands::{Out, Rows};
use crate::{Config, Result};
use anyhow::Context;
use tracing::info;

/// Verifies the stored OAuth credentials and refreshes the access token if it has expired.
///
/// # Errors
/// Returns an error if either credential file is missing or malformed, the token lacks the
/// spreadsheets scope, or Google refuses the refresh.
pub async fn auth(config: &Config) -> Result<Out<Rows>> {
    let mut token_provider =
        TokenProvider::load(&config.client_secret_path(), &config.token_path())
            .await
            .context(
                "Unable to use the OAuth files in the secrets directory. Place a client_secret.json \
                and a token.json with the spreadsheets scope there, or run 'fintrack init' again \
                with --token",
            )?;
    let was_expired = token_provider.expires_at() <= chrono::Utc::now();
    let _ = token_provider
        .token_with_refresh()
        .await
        .context("Unable to refresh the OAuth token")?;
    if was_expired {
        info!("The access token had expired and was refreshed");
    }
    Ok(format!(
        "Your OAuth token is valid until {}",
        token_provider.expires_at().format("%Y-%m-%d %H:%M UTC")
    )
    .into())
}
