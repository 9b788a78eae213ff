//! Partnerbot - Telegram referral bot for partners
//!
//! This library provides everything the bot binary needs: partner
//! registration with admin approval, referral links with branded QR codes,
//! and partner balances kept in a Google Sheets ledger.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, validation and health checks
//! - `storage`: SQLite user store
//! - `sheets`: Google Sheets ledger client
//! - `qr`: Branded QR code rendering
//! - `referral`: Registration/approval workflow and partner menu
//! - `telegram`: Telegram bot integration and handlers

pub mod cli;
pub mod core;
pub mod qr;
pub mod referral;
pub mod sheets;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{AppError, AppResult, Config};
pub use qr::QrIssuer;
pub use referral::{MenuDispatcher, Workflow};
pub use sheets::{PartnerLedger, SheetsClient};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
