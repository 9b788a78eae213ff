//! Bot configuration
//!
//! Built once at startup from environment variables (after `.env` is loaded)
//! and handed to every component as `Arc<Config>`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::core::error::{AppError, AppResult};

pub const DEFAULT_SHEET_NAME: &str = "Лист1";
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_DATABASE_PATH: &str = "users.db";
pub const DEFAULT_REFERRAL_BASE_URL: &str = "https://taplink.cc/lakeevainfo";
pub const DEFAULT_SUPPORT_USERNAME: &str = "@LakeevaaaThai";
pub const DEFAULT_BRAND_TEXT: &str = "Lethai services";
pub const DEFAULT_LOG_FILE_PATH: &str = "bot.log";

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Telegram and Sheets HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Telegram bot settings
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// Users allowed to run admin commands and press approve/reject
    pub admin_ids: Vec<i64>,
    /// Chat (usually a group) that receives registration and decision notices
    pub admin_chat_id: i64,
}

/// Spreadsheet settings
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub credentials_path: PathBuf,
    pub api_base_url: String,
}

/// Referral link settings
#[derive(Debug, Clone)]
pub struct ReferralConfig {
    /// `https://<host>/<slug>`; the partner code is appended as `?ref=<code>`
    pub base_url: String,
    pub support_username: String,
}

/// QR image assets
#[derive(Debug, Clone, Default)]
pub struct QrConfig {
    pub background_path: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
    pub brand_text: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub sheets: SheetsConfig,
    pub referral: ReferralConfig,
    pub qr: QrConfig,
    pub database_path: String,
    pub log_file_path: String,
    pub log_level: log::LevelFilter,
}

fn parse_admin_ids(raw: &str) -> Vec<i64> {
    raw.split([',', ' ', '\n', '\t'])
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

fn parse_log_level(raw: Option<String>) -> log::LevelFilter {
    raw.and_then(|level| level.trim().parse().ok())
        .unwrap_or(log::LevelFilter::Info)
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Every missing required value is reported in a single error so the
    /// operator can fix the environment in one pass.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut missing = Vec::new();

        let bot_token = get("BOT_TOKEN").or_else(|| get("TELOXIDE_TOKEN"));
        if bot_token.is_none() {
            missing.push("BOT_TOKEN");
        }

        let spreadsheet_id = get("SHEETS_ID");
        if spreadsheet_id.is_none() {
            missing.push("SHEETS_ID");
        }

        let admin_ids = get("ADMIN_USER_ID").map(|raw| parse_admin_ids(&raw)).unwrap_or_default();
        if admin_ids.is_empty() {
            missing.push("ADMIN_USER_ID");
        }

        let admin_chat_id = get("ADMIN_GROUP_ID").and_then(|raw| raw.parse::<i64>().ok());
        if admin_chat_id.is_none() {
            missing.push("ADMIN_GROUP_ID");
        }

        let (Some(bot_token), Some(spreadsheet_id), Some(admin_chat_id), true) =
            (bot_token, spreadsheet_id, admin_chat_id, missing.is_empty())
        else {
            return Err(AppError::Config(format!("missing or invalid: {}", missing.join(", "))));
        };

        let base_url = get("REFERRAL_BASE_URL").unwrap_or_else(|| DEFAULT_REFERRAL_BASE_URL.to_string());
        url::Url::parse(&base_url).map_err(|e| AppError::Config(format!("REFERRAL_BASE_URL: {}", e)))?;

        Ok(Self {
            telegram: TelegramConfig {
                bot_token: SecretString::from(bot_token),
                admin_ids,
                admin_chat_id,
            },
            sheets: SheetsConfig {
                spreadsheet_id,
                sheet_name: get("SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
                credentials_path: PathBuf::from(
                    get("CREDENTIALS_PATH").unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string()),
                ),
                api_base_url: get("SHEETS_API_URL").unwrap_or_else(|| DEFAULT_SHEETS_API_URL.to_string()),
            },
            referral: ReferralConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                support_username: get("SUPPORT_USERNAME").unwrap_or_else(|| DEFAULT_SUPPORT_USERNAME.to_string()),
            },
            qr: QrConfig {
                background_path: get("QR_BACKGROUND_PATH").map(PathBuf::from),
                font_path: get("QR_FONT_PATH").map(PathBuf::from),
                brand_text: get("QR_BRAND_TEXT").unwrap_or_else(|| DEFAULT_BRAND_TEXT.to_string()),
            },
            database_path: get("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            log_file_path: get("LOG_FILE_PATH").unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string()),
            log_level: parse_log_level(get("LOG_LEVEL")),
        })
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.telegram.admin_ids.contains(&user_id)
    }

    /// Referral link for a partner code
    pub fn referral_link(&self, partner_code: &str) -> String {
        format!("{}?ref={}", self.referral.base_url, partner_code)
    }

    /// `https://t.me/<support>` link for the support contact
    pub fn support_link(&self) -> String {
        format!("https://t.me/{}", self.referral.support_username.trim_start_matches('@'))
    }

    /// Logs the effective configuration without secrets.
    pub fn log_summary(&self) {
        log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        log::info!("Admins: {:?}, admin chat: {}", self.telegram.admin_ids, self.telegram.admin_chat_id);
        log::info!(
            "Spreadsheet: {} / {} (credentials: {})",
            self.sheets.spreadsheet_id,
            self.sheets.sheet_name,
            self.sheets.credentials_path.display()
        );
        log::info!("Database: {}", self.database_path);
        log::info!("Referral base URL: {}", self.referral.base_url);
        match (&self.qr.background_path, &self.qr.font_path) {
            (None, None) => log::info!("QR assets: none (solid background, no brand text)"),
            (bg, font) => log::info!("QR assets: background={:?}, font={:?}", bg, font),
        }
        log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
}
