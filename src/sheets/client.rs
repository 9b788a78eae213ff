//! Google Sheets v4 REST client

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::config::{network, SheetsConfig};
use crate::core::error::{AppError, AppResult};
use crate::sheets::auth::{ServiceAccount, TokenSource};
use crate::sheets::balance;
use crate::sheets::{PartnerLedger, PartnerRow, WorksheetInfo};

/// Every column the bot reads; wide enough for a year of dated entries
const FULL_RANGE: &str = "A:ZZ";
const CODE_COLUMN: &str = "A:A";

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Serialize)]
struct AppendBody {
    values: Vec<Vec<String>>,
}

pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    tokens: Arc<dyn TokenSource>,
}

impl SheetsClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        spreadsheet_id: &str,
        sheet_name: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
            tokens,
        }
    }

    /// Builds a client authenticated with the configured service-account key.
    pub fn from_config(config: &SheetsConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder().timeout(network::timeout()).build()?;
        let account = ServiceAccount::from_file(&config.credentials_path, http.clone())?;
        log::info!("Sheets client authenticating as {}", account.client_email());
        Ok(Self::new(
            http,
            &config.api_base_url,
            &config.spreadsheet_id,
            &config.sheet_name,
            Arc::new(account),
        ))
    }

    /// A1 range on the configured sheet, e.g. `'Лист1'!A:ZZ`.
    fn range(&self, cells: &str) -> String {
        format!("'{}'!{}", self.sheet_name.replace('\'', "''"), cells)
    }

    fn values_url(&self, cells: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url,
            self.spreadsheet_id,
            urlencoding::encode(&self.range(cells))
        )
    }

    async fn read_values(&self, cells: &str) -> AppResult<Vec<Vec<Value>>> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(self.values_url(cells))
            .query(&[("valueRenderOption", "UNFORMATTED_VALUE")])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Integration(format!(
                "reading {} failed with status {}",
                self.range(cells),
                status
            )));
        }
        let range: ValueRange = response.json().await?;
        Ok(range.values)
    }

    async fn append_values(&self, cells: Vec<String>) -> AppResult<()> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}:append", self.values_url(CODE_COLUMN));
        let response = self
            .http
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .bearer_auth(token)
            .json(&AppendBody { values: vec![cells] })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Integration(format!("append failed with status {}", status)));
        }
        Ok(())
    }
}

#[async_trait]
impl PartnerLedger for SheetsClient {
    async fn get_balance(&self, partner_code: &str) -> AppResult<f64> {
        let rows = self.read_values(FULL_RANGE).await?;
        let balance = balance::balance_for(&rows, partner_code);
        log::debug!("Balance for {}: {:.2}", partner_code, balance);
        Ok(balance)
    }

    async fn append_partner_row(&self, row: &PartnerRow) -> AppResult<bool> {
        let codes = self.read_values(CODE_COLUMN).await?;
        if balance::find_row(&codes, &row.partner_code).is_some() {
            log::info!("Partner code {} already present in sheet, skipping append", row.partner_code);
            return Ok(false);
        }

        self.append_values(row.cells()).await?;
        log::info!("Added partner code {} to sheet {}", row.partner_code, self.sheet_name);
        Ok(true)
    }

    async fn test_connection(&self) -> bool {
        match self.read_values("A1").await {
            Ok(_) => true,
            Err(e) => {
                log::error!("Google Sheets connection test failed: {}", e);
                false
            }
        }
    }

    async fn worksheet_info(&self) -> AppResult<WorksheetInfo> {
        let codes = self.read_values(CODE_COLUMN).await?;
        Ok(WorksheetInfo {
            row_count: codes.len(),
            partner_count: balance::partner_count(&codes),
        })
    }
}
