//! Google Sheets v4 client.
//!
//! Implements the `SheetStore` trait with the REST API, authenticated as a
//! service account.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use super::auth::{AccessToken, ServiceAccountKey};
use super::range::qualified;
use super::{SheetStore, Worksheet};
use crate::error::{Result, SyncError};
use crate::table::Row;

/// Default timeout for Sheets API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Sheets API base URL.
const SHEETS_API_URL: &str = "https://sheets.googleapis.com";

/// Google Sheets client bound to one spreadsheet.
#[derive(Debug)]
pub struct GoogleSheetsClient {
    client: Client,
    key: ServiceAccountKey,
    spreadsheet_id: String,
    api_base: String,
    token: Mutex<Option<AccessToken>>,
}

#[derive(Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<serde_json::Value>>,
}

impl GoogleSheetsClient {
    /// Creates a client for the spreadsheet identified by `spreadsheet_id`.
    pub fn new(key: ServiceAccountKey, spreadsheet_id: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| SyncError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            key,
            spreadsheet_id: spreadsheet_id.into(),
            api_base: SHEETS_API_URL.to_string(),
            token: Mutex::new(None),
        })
    }

    /// Points the client at a different API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Returns a valid access token, minting a new one when needed.
    async fn bearer(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if !token.is_stale(now) {
                return Ok(token.token.clone());
            }
        }

        let token = self.key.fetch_access_token(&self.client).await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn spreadsheet_url(&self) -> Result<Url> {
        let base = format!(
            "{}/v4/spreadsheets/{}",
            self.api_base.trim_end_matches('/'),
            self.spreadsheet_id
        );
        Url::parse(&base).map_err(|e| SyncError::config(format!("Invalid Sheets URL: {e}")))
    }

    /// URL of a `values` resource. `suffix` is appended to the range segment
    /// (e.g. `:clear`).
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
        let mut url = self.spreadsheet_url()?;
        url.path_segments_mut()
            .map_err(|_| SyncError::config("Sheets URL cannot be a base"))?
            .push("values")
            .push(&format!("{range}{suffix}"));
        Ok(url)
    }

    /// Sends an authorized request and returns the body of a 2xx response.
    ///
    /// Transport failures and non-success statuses are network errors.
    async fn send(&self, context: &str, request: RequestBuilder) -> Result<String> {
        let token = self.bearer().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SyncError::from_request(context, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::network(format!("{context}: failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(SyncError::network(format!(
                "{context} failed ({status}): {}",
                api_error_message(&body)
            )));
        }
        Ok(body)
    }

    /// Lists the worksheets of the spreadsheet.
    pub async fn worksheets(&self) -> Result<Vec<Worksheet>> {
        let mut url = self.spreadsheet_url()?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties");

        let body = self
            .send("Open spreadsheet", self.client.get(url))
            .await?;
        parse_worksheets(&body)
    }
}

fn parse_worksheets(body: &str) -> Result<Vec<Worksheet>> {
    let response: SpreadsheetResponse = serde_json::from_str(body)
        .map_err(|e| SyncError::sheets(format!("Unexpected spreadsheet response: {e}")))?;
    Ok(response
        .sheets
        .into_iter()
        .map(|s| Worksheet::new(s.properties.sheet_id, s.properties.title))
        .collect())
}

/// Pulls `error.message` out of a Google API error body, if present.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

fn value_range<'a>(range: &'a str, values: &[Row]) -> ValueRange<'a> {
    ValueRange {
        range,
        major_dimension: "ROWS",
        values: values
            .iter()
            .map(|row| row.iter().map(|v| v.to_json()).collect())
            .collect(),
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn worksheet(&self, title: &str) -> Result<Worksheet> {
        self.worksheets()
            .await?
            .into_iter()
            .find(|ws| ws.title == title)
            .ok_or_else(|| {
                SyncError::sheets(format!(
                    "Worksheet '{title}' not found in spreadsheet {}",
                    self.spreadsheet_id
                ))
            })
    }

    async fn clear(&self, worksheet: &Worksheet) -> Result<()> {
        let url = self.values_url(&qualified(&worksheet.title, None), ":clear")?;
        debug!("Clearing worksheet {}", worksheet.title);
        self.send(
            "Clear worksheet",
            self.client.post(url).json(&serde_json::json!({})),
        )
        .await?;
        Ok(())
    }

    async fn update(&self, worksheet: &Worksheet, range: &str, values: &[Row]) -> Result<()> {
        let target = qualified(&worksheet.title, Some(range));
        let mut url = self.values_url(&target, "")?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        debug!("Writing {} rows to {}", values.len(), target);
        self.send(
            "Update worksheet",
            self.client.put(url).json(&value_range(&target, values)),
        )
        .await?;
        Ok(())
    }
}
