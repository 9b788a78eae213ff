//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command menu registration

use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, Config};

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Я умею:")]
pub enum Command {
    #[command(description = "регистрация или главное меню")]
    Start,
    #[command(description = "заявки на подтверждение (только для администратора)")]
    Admin,
    #[command(description = "статистика системы (только для администратора)")]
    Stats,
    #[command(description = "одобренные пользователи (только для администратора)")]
    Users,
    #[command(description = "проверка состояния системы (только для администратора)")]
    Health,
}

/// Creates a Bot instance with the configured token and request timeout
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to build the HTTP client
pub fn create_bot(config: &Config) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(config.telegram.bot_token.expose_secret(), client))
}

/// Sets up bot commands in Telegram UI
///
/// Only `/start` is advertised; admin commands stay out of the public menu.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(vec![BotCommand::new("start", "регистрация или главное меню")])
        .await?;

    Ok(())
}
