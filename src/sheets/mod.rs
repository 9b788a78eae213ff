//! Partner ledger backed by a Google Sheets worksheet
//!
//! Column A holds the partner code, the remaining columns are free-form.
//! The bot only appends a partner's first row and reads balances; everything
//! else in the sheet is maintained by hand.

pub mod auth;
pub mod balance;
pub mod client;

use async_trait::async_trait;

use crate::core::error::AppResult;
use crate::storage::UserRecord;

pub use auth::{ServiceAccount, StaticToken, TokenSource};
pub use client::SheetsClient;

/// Row written for a newly approved partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerRow {
    pub partner_code: String,
    pub name: String,
    pub contact: String,
    pub username: Option<String>,
}

impl PartnerRow {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            partner_code: record.partner_code(),
            name: record.name.clone(),
            contact: record.phone.clone(),
            username: record.username.clone(),
        }
    }

    /// Cell values in column order: code, name, contact, @username or `-`.
    pub fn cells(&self) -> Vec<String> {
        let username = match self.username.as_deref() {
            Some(u) if !u.is_empty() => format!("@{}", u.trim_start_matches('@')),
            _ => "-".to_string(),
        };
        vec![
            self.partner_code.clone(),
            self.name.clone(),
            self.contact.clone(),
            username,
        ]
    }
}

/// Shape of the worksheet, shown in admin statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorksheetInfo {
    /// Rows with any data, header included
    pub row_count: usize,
    /// Non-empty partner codes below the header
    pub partner_count: usize,
}

/// Spreadsheet operations the workflow and menu depend on.
#[async_trait]
pub trait PartnerLedger: Send + Sync {
    /// Sum of numeric cells in the partner's row, `0.0` when there is no row.
    async fn get_balance(&self, partner_code: &str) -> AppResult<f64>;

    /// Appends the row unless column A already holds its code.
    ///
    /// Returns `true` when a row was written.
    async fn append_partner_row(&self, row: &PartnerRow) -> AppResult<bool>;

    /// Whether the sheet can be read at all.
    async fn test_connection(&self) -> bool;

    async fn worksheet_info(&self) -> AppResult<WorksheetInfo>;
}
