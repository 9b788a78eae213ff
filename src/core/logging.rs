//! Logging initialization
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A panic hook that routes panics into the log

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file (appended to, created if missing)
/// * `level` - Maximum level written to both sinks
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to open the file or a logger is already set
pub fn init_logger(log_file_path: &str, level: LevelFilter) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", log_file_path, e))?;

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build();

    CombinedLogger::init(vec![
        TermLogger::new(level, config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, config, log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs panics from dispatcher tasks instead of only printing them to stderr.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn test_init_logger_creates_log_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bot.log");

        // A second init in the same test binary fails because a global logger
        // is already installed; the file is opened before that check.
        let _ = init_logger(path.to_str().unwrap(), LevelFilter::Info);

        assert!(path.exists());
    }

    #[test]
    fn test_init_logger_bad_path() {
        let result = init_logger("/nonexistent-dir/deeper/bot.log", LevelFilter::Info);
        assert!(result.is_err());
    }
}
