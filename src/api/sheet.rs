//! Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet.

use crate::api::{Sheet, TokenProvider};
use crate::error::StoreError;
use crate::Result;
use sheets::types::{
    BatchClearValuesRequest, BatchUpdateValuesRequest, DateTimeRenderOption, Dimension,
    ValueInputOption, ValueRange, ValueRenderOption,
};
use sheets::ClientError;
use tracing::trace;

/// Implements the `Sheet` trait using the `sheets::Client`. It takes a `TokenProvider`, on which
/// it calls refresh to keep the token up-to-date.
pub(super) struct GoogleSheet {
    spreadsheet_id: String,
    token_provider: TokenProvider,
    client: sheets::Client,
}

impl GoogleSheet {
    pub(super) async fn new(
        spreadsheet_id: impl Into<String>,
        mut token_provider: TokenProvider,
    ) -> Result<Self> {
        let client = create_sheets_client(&mut token_provider).await?;
        Ok(Self {
            spreadsheet_id: spreadsheet_id.into(),
            token_provider,
            client,
        })
    }

    /// Replaces the client when the access token has expired.
    async fn refresh_client(&mut self) -> std::result::Result<(), StoreError> {
        if self.token_provider.expires_at() > chrono::Utc::now() + chrono::Duration::minutes(5) {
            return Ok(());
        }
        self.client = create_sheets_client(&mut self.token_provider)
            .await
            .map_err(|e| StoreError::Access(format!("{e:#}")))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn get(&mut self, tab: &str) -> std::result::Result<Vec<Vec<String>>, StoreError> {
        trace!("get for {tab}");
        self.refresh_client().await?;
        let response = self
            .client
            .spreadsheets()
            .values_get(
                &self.spreadsheet_id,
                &whole_tab(tab),
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await
            .map_err(|e| map_client_error(tab, e))?;
        Ok(response.body.values)
    }

    async fn clear(&mut self, tab: &str) -> std::result::Result<(), StoreError> {
        trace!("clear for {tab}");
        self.refresh_client().await?;
        let request = BatchClearValuesRequest {
            ranges: vec![whole_tab(tab)],
        };
        self.client
            .spreadsheets()
            .values_batch_clear(&self.spreadsheet_id, &request)
            .await
            .map_err(|e| map_client_error(tab, e))?;
        Ok(())
    }

    async fn write(
        &mut self,
        tab: &str,
        rows: &[Vec<String>],
    ) -> std::result::Result<(), StoreError> {
        trace!("write {} rows to {tab}", rows.len());
        self.refresh_client().await?;
        let request = write_request(tab, rows);
        self.client
            .spreadsheets()
            .values_batch_update(&self.spreadsheet_id, &request)
            .await
            .map_err(|e| map_client_error(tab, e))?;
        Ok(())
    }
}

/// Cells are sent as raw text so Google does not turn them into formulas, dates or numbers.
fn write_request(tab: &str, rows: &[Vec<String>]) -> BatchUpdateValuesRequest {
    BatchUpdateValuesRequest {
        data: vec![ValueRange {
            major_dimension: Some(Dimension::Rows),
            range: format!("{}!A1", quote_tab(tab)),
            values: rows.to_vec(),
        }],
        include_values_in_response: Some(false),
        response_date_time_render_option: None,
        response_value_render_option: None,
        value_input_option: Some(ValueInputOption::Raw),
    }
}

/// Creates a new sheets client with a refreshed access token.
async fn create_sheets_client(token_provider: &mut TokenProvider) -> Result<sheets::Client> {
    let access_token = token_provider.token_with_refresh().await?;

    // The client only needs the access token; we handle refresh ourselves.
    Ok(sheets::Client::new(
        String::new(),
        String::new(),
        String::new(),
        access_token.to_string(),
        String::new(),
    ))
}

/// A1 notation for every cell of `tab`.
fn whole_tab(tab: &str) -> String {
    format!("{}!A:ZZ", quote_tab(tab))
}

/// Tab names are quoted in A1 notation, with embedded quotes doubled.
fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

fn map_client_error(tab: &str, e: ClientError) -> StoreError {
    match e {
        ClientError::HttpError { status, error, .. } => classify_http(tab, status.as_u16(), error),
        ClientError::EmptyRefreshToken => {
            StoreError::Access(String::from("The OAuth refresh token is empty"))
        }
        other => StoreError::Transport(other.to_string()),
    }
}

/// The Sheets API answers a read of a nonexistent tab with 400 and "Unable to parse range".
fn classify_http(tab: &str, status: u16, body: String) -> StoreError {
    match status {
        401 | 403 => StoreError::Access(body),
        404 => StoreError::NotFound(tab.to_string()),
        400 if body.contains("Unable to parse range") => StoreError::NotFound(tab.to_string()),
        _ => StoreError::Transport(format!("HTTP {status}: {body}")),
    }
}
