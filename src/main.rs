use anyhow::Result;
use dotenvy::dotenv;
use std::path::Path;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;

use partnerbot::cli::{Cli, Commands};
use partnerbot::core::health::run_all_checks;
use partnerbot::core::logging::install_panic_hook;
use partnerbot::core::{init_logger, Config};
use partnerbot::qr::QrIssuer;
use partnerbot::sheets::{PartnerLedger, SheetsClient};
use partnerbot::storage::{create_pool, DbPool};
use partnerbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, RegistrationState};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    install_panic_hook();

    // Load environment variables from .env if present
    let _ = dotenv();

    let config = Arc::new(Config::from_env()?);
    init_logger(&config.log_file_path, config.log_level)?;
    config.log_summary();

    match cli.command {
        Some(Commands::Run) => run_bot(config).await,
        Some(Commands::Check) => run_check(config).await,
        Some(Commands::RenderQr { code, out }) => run_render_qr(&config, &code, &out),
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot(config).await
        }
    }
}

fn open_storage(config: &Config) -> Result<Arc<DbPool>> {
    let pool = create_pool(&config.database_path)
        .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;
    Ok(Arc::new(pool))
}

fn open_ledger(config: &Config) -> Result<Arc<dyn PartnerLedger>> {
    let client = SheetsClient::from_config(&config.sheets)
        .map_err(|e| anyhow::anyhow!("Failed to initialize Google Sheets client: {}", e))?;
    Ok(Arc::new(client))
}

async fn run_bot(config: Arc<Config>) -> Result<()> {
    log::info!("Starting bot...");

    let db_pool = open_storage(&config)?;
    let ledger = open_ledger(&config)?;

    if ledger.test_connection().await {
        log::info!("✅ Google Sheets connection OK");
    } else {
        log::warn!("⚠️ Google Sheets is not reachable. Balances and approvals will report errors until it recovers.");
    }

    let bot = create_bot(&config)?;

    let bot_info = bot
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Bot API: {}", e))?;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username.as_deref(), bot_info.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let deps = HandlerDeps::new(Arc::clone(&config), db_pool, ledger);

    log::info!("Bot is running. Press Ctrl+C to stop.");
    Dispatcher::builder(bot, schema(deps))
        .dependencies(dptree::deps![InMemStorage::<RegistrationState>::new()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Runs every health check once and fails if any of them is unhealthy.
async fn run_check(config: Arc<Config>) -> Result<()> {
    let db_pool = open_storage(&config)?;
    let ledger = open_ledger(&config)?;

    let report = run_all_checks(&config, &db_pool, ledger.as_ref()).await;
    println!("{}", report.format_log());

    if report.is_healthy() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} of {} checks failed",
            report.checks.len() - report.healthy_count(),
            report.checks.len()
        ))
    }
}

fn run_render_qr(config: &Config, code: &str, out: &Path) -> Result<()> {
    let url = config.referral_link(code);
    let issuer = QrIssuer::new(&config.qr);

    let png = match issuer.generate(&url) {
        Ok(png) => png,
        Err(e) => {
            log::warn!("Branded QR failed ({}), rendering plain code", e);
            QrIssuer::generate_plain(&url)?
        }
    };

    std::fs::write(out, &png).map_err(|e| anyhow::anyhow!("Failed to write {}: {}", out.display(), e))?;
    log::info!("QR code for {} written to {} ({} bytes)", url, out.display(), png.len());
    Ok(())
}
