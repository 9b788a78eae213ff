//! System health checks for `/health` and `partnerbot check`.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::core::config::Config;
use crate::qr::QrIssuer;
use crate::sheets::PartnerLedger;
use crate::storage::db::{self, DbPool};

/// Status of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Error,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "HEALTHY"),
            HealthStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of a single check
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub name: &'static str,
    pub status: HealthStatus,
    pub message: String,
    /// Key/value facts shown under the message
    pub details: Vec<(String, String)>,
}

impl HealthCheck {
    fn healthy(name: &'static str, message: &str) -> Self {
        Self {
            name,
            status: HealthStatus::Healthy,
            message: message.to_string(),
            details: Vec::new(),
        }
    }

    fn error(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            status: HealthStatus::Error,
            message: message.into(),
            details: Vec::new(),
        }
    }

    fn with_detail(mut self, key: &str, value: impl ToString) -> Self {
        self.details.push((key.to_string(), value.to_string()));
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }

    fn icon(&self) -> &'static str {
        if self.is_healthy() {
            "✅"
        } else {
            "❌"
        }
    }
}

/// Aggregated report of all checks
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub checks: Vec<HealthCheck>,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn new(checks: Vec<HealthCheck>) -> Self {
        Self {
            checks,
            timestamp: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(HealthCheck::is_healthy)
    }

    pub fn healthy_count(&self) -> usize {
        self.checks.iter().filter(|c| c.is_healthy()).count()
    }

    /// Format report for Telegram
    pub fn format_telegram(&self) -> String {
        let (icon, status) = if self.is_healthy() {
            ("✅", "HEALTHY")
        } else {
            ("❌", "UNHEALTHY")
        };
        let mut text = format!("🏥 Состояние системы: {} {}\n\n", icon, status);
        text.push_str(&format!(
            "📊 Проверок выполнено: {}/{}\n\n",
            self.healthy_count(),
            self.checks.len()
        ));

        for check in &self.checks {
            text.push_str(&format!("{} {}:\n   {}\n", check.icon(), check.name, check.message));
            for (key, value) in check.details.iter().take(3) {
                text.push_str(&format!("   • {}: {}\n", key, value));
            }
            text.push('\n');
        }
        text.push_str(&format!("🕐 {}", self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));
        text
    }

    /// Format report for the terminal
    pub fn format_log(&self) -> String {
        let mut text = String::new();
        for check in &self.checks {
            text.push_str(&format!("{} {}: {}\n", check.icon(), check.name, check.message));
            for (key, value) in &check.details {
                text.push_str(&format!("   {}: {}\n", key, value));
            }
        }
        text.push_str(&format!(
            "Summary: {}/{} checks passed at {}",
            self.healthy_count(),
            self.checks.len(),
            self.timestamp.to_rfc3339()
        ));
        text
    }
}

pub fn check_database(pool: &DbPool, database_path: &str) -> HealthCheck {
    const NAME: &str = "Database";
    let counts = match db::get_connection(pool).and_then(|conn| db::count_by_state(&conn)) {
        Ok(counts) => counts,
        Err(e) => {
            log::error!("Database health check failed: {}", e);
            return HealthCheck::error(NAME, format!("Database error: {}", e));
        }
    };

    let mut check = HealthCheck::healthy(NAME, "Database is accessible")
        .with_detail("total_users", counts.total())
        .with_detail("approved_users", counts.approved)
        .with_detail("pending_users", counts.pending)
        .with_detail("rejected_users", counts.rejected);
    if let Ok(meta) = std::fs::metadata(database_path) {
        check = check.with_detail("file_size", meta.len());
    }
    check
}

pub async fn check_spreadsheet(credentials_path: &Path, ledger: &dyn PartnerLedger) -> HealthCheck {
    const NAME: &str = "Google Sheets";
    if !credentials_path.is_file() {
        return HealthCheck::error(NAME, "Credentials file not found")
            .with_detail("path", credentials_path.display());
    }
    if !ledger.test_connection().await {
        return HealthCheck::error(NAME, "Google Sheets connection failed");
    }

    let check = HealthCheck::healthy(NAME, "Google Sheets connection successful");
    match ledger.worksheet_info().await {
        Ok(info) => check
            .with_detail("row_count", info.row_count)
            .with_detail("partner_count", info.partner_count),
        Err(_) => check,
    }
}

pub fn check_qr_assets(issuer: &QrIssuer) -> HealthCheck {
    const NAME: &str = "QR assets";
    let assets = issuer.asset_status();
    if assets.is_empty() {
        return HealthCheck::healthy(NAME, "No assets configured, using built-in layout");
    }

    let missing: Vec<String> = assets
        .iter()
        .filter(|(_, exists)| !exists)
        .map(|(path, _)| path.display().to_string())
        .collect();
    if missing.is_empty() {
        let mut check = HealthCheck::healthy(NAME, "All configured assets present");
        for (path, _) in &assets {
            check = check.with_detail("file", path.display());
        }
        return check;
    }
    HealthCheck::error(NAME, format!("Missing asset files: {}", missing.join(", ")))
}

/// Runs every check.
pub async fn run_all_checks(config: &Config, pool: &DbPool, ledger: &dyn PartnerLedger) -> HealthReport {
    let checks = vec![
        check_database(pool, &config.database_path),
        check_spreadsheet(&config.sheets.credentials_path, ledger).await,
        check_qr_assets(&QrIssuer::new(&config.qr)),
    ];
    let report = HealthReport::new(checks);
    log::info!(
        "Health check: {}/{} checks passed",
        report.healthy_count(),
        report.checks.len()
    );
    report
}
