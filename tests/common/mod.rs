//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use partnerbot::core::{AppError, AppResult, Config};
use partnerbot::referral::{MenuDispatcher, Workflow};
use partnerbot::sheets::balance;
use partnerbot::sheets::{PartnerLedger, PartnerRow, WorksheetInfo};
use partnerbot::storage::{create_pool, DbPool};

pub const ADMIN_ID: i64 = 1000;
pub const ADMIN_CHAT_ID: i64 = -100_500;

/// Spreadsheet held in memory, using the same row matching as the real client.
#[derive(Default)]
pub struct MemoryLedger {
    rows: Mutex<Vec<Vec<Value>>>,
    failing: AtomicBool,
    appends: AtomicUsize,
}

impl MemoryLedger {
    pub fn with_header() -> Self {
        let ledger = Self::default();
        ledger.push_row(vec![json!("Код"), json!("Имя"), json!("Контакт"), json!("Ник")]);
        ledger
    }

    pub fn push_row(&self, row: Vec<Value>) {
        self.rows.lock().unwrap().push(row);
    }

    /// Adds numeric cells to an existing partner row, as the owner would by hand.
    pub fn add_amounts(&self, partner_code: &str, amounts: &[f64]) {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.first().and_then(balance::cell_text).as_deref() == Some(partner_code))
            .expect("partner row");
        row.extend(amounts.iter().map(|a| json!(a)));
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn appends(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    pub fn rows_with_code(&self, partner_code: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.first().and_then(balance::cell_text).as_deref() == Some(partner_code))
            .count()
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Integration("sheet unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PartnerLedger for MemoryLedger {
    async fn get_balance(&self, partner_code: &str) -> AppResult<f64> {
        self.check()?;
        Ok(balance::balance_for(&self.rows.lock().unwrap(), partner_code))
    }

    async fn append_partner_row(&self, row: &PartnerRow) -> AppResult<bool> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        if balance::find_row(&rows, &row.partner_code).is_some() {
            return Ok(false);
        }
        rows.push(row.cells().into_iter().map(Value::String).collect());
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn test_connection(&self) -> bool {
        self.check().is_ok()
    }

    async fn worksheet_info(&self) -> AppResult<WorksheetInfo> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(WorksheetInfo {
            row_count: rows.len(),
            partner_count: balance::partner_count(&rows),
        })
    }
}

/// Configuration as the bot would read it from a minimal `.env`.
pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, String> = [
        ("BOT_TOKEN", "123:test"),
        ("SHEETS_ID", "sheet-id"),
        ("ADMIN_USER_ID", "1000"),
        ("ADMIN_GROUP_ID", "-100500"),
        ("REFERRAL_BASE_URL", "https://taplink.cc/partners"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| env.get(key).cloned()).expect("test config")
}

/// Everything a workflow test needs; the temp dir lives as long as the env.
pub struct TestEnv {
    pub dir: TempDir,
    pub config: Arc<Config>,
    pub pool: Arc<DbPool>,
    pub ledger: Arc<MemoryLedger>,
    pub workflow: Workflow,
    pub menu: MenuDispatcher,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("users.db");
        let config = Arc::new(test_config(&[]));
        let pool = Arc::new(create_pool(db_path.to_str().unwrap()).unwrap());
        let ledger = Arc::new(MemoryLedger::with_header());
        let as_ledger: Arc<dyn PartnerLedger> = ledger.clone();

        let workflow = Workflow::new(Arc::clone(&pool), Arc::clone(&as_ledger), config.telegram.admin_ids.clone());
        let menu = MenuDispatcher::new(Arc::clone(&config), as_ledger);

        Self {
            dir,
            config,
            pool,
            ledger,
            workflow,
            menu,
        }
    }
}
