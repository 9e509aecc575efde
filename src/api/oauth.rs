//! Keeps the Google OAuth access token fresh.
//!
//! The consent flow that first produces `token.json` happens outside this program. Here we load
//! the client secret and the token file and use the refresh token to obtain new access tokens
//! when the old one is about to expire.

use crate::api::files::{File, SecretFile, TokenFile};
use crate::Result;
use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, RefreshToken, TokenResponse, TokenUrl};
use std::path::Path;
use tracing::{debug, info};

/// Google does not always return an expiry; access tokens it issues last an hour.
const DEFAULT_EXPIRY_SECS: i64 = 3600;

/// Provides a valid access token, refreshing it through Google's token endpoint and saving the
/// result back to the token file when needed.
#[derive(Debug, Clone)]
pub(crate) struct TokenProvider {
    secret: SecretFile,
    token: File<TokenFile>,
}

impl TokenProvider {
    /// Loads the client secret and the token file. Fails if either is missing or the token lacks
    /// a required scope.
    pub(crate) async fn load(secret_path: &Path, token_path: &Path) -> Result<Self> {
        let secret = SecretFile::load(secret_path).await?;
        let token: File<TokenFile> = File::load(token_path).await.with_context(|| {
            format!(
                "Unable to load the OAuth token file at {}",
                token_path.display()
            )
        })?;
        token.data().validate_scopes()?;
        Ok(Self { secret, token })
    }

    /// The current access token, which may be expired.
    pub(crate) fn token(&self) -> &str {
        self.token.data().access_token()
    }

    pub(crate) fn expires_at(&self) -> DateTime<Utc> {
        self.token.data().expires_at()
    }

    /// Returns the access token, refreshing it first if it has expired or is about to.
    pub(crate) async fn token_with_refresh(&mut self) -> Result<&str> {
        if self.token.data().is_expired() {
            self.refresh().await?;
        }
        Ok(self.token())
    }

    /// Exchanges the refresh token for a new access token and saves it to the token file.
    pub(crate) async fn refresh(&mut self) -> Result<()> {
        debug!("Refreshing the OAuth access token");
        let client = BasicClient::new(ClientId::new(self.secret.client_id().to_string()))
            .set_client_secret(ClientSecret::new(self.secret.client_secret().to_string()))
            .set_auth_uri(
                AuthUrl::new(self.secret.auth_uri().to_string())
                    .context("The auth_uri in the client secret file is invalid")?,
            )
            .set_token_uri(
                TokenUrl::new(self.secret.token_uri().to_string())
                    .context("The token_uri in the client secret file is invalid")?,
            );

        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Unable to build the HTTP client")?;

        let refresh_token = RefreshToken::new(self.token.data().refresh_token().to_string());
        let response = client
            .exchange_refresh_token(&refresh_token)
            .request_async(&http_client)
            .await
            .map_err(|e| anyhow!("{e}"))
            .context("Google refused to refresh the OAuth token")?;

        let expires_in = response
            .expires_in()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_EXPIRY_SECS));
        self.token.data_mut().update(
            response.access_token().secret().to_string(),
            Utc::now() + expires_in,
            response.refresh_token().map(|t| t.secret().to_string()),
        );
        self.token.save().await?;
        info!(
            "Saved a refreshed access token to {}",
            self.token.path().display()
        );
        Ok(())
    }
}
