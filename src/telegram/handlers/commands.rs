//! Slash command and admin keyboard routing

use teloxide::prelude::*;
use teloxide::types::Message;

use super::registration::handle_start_command;
use super::types::{sender_id, HandlerDeps, HandlerError, RegistrationDialogue};
use crate::telegram::admin::{handle_admin_command, handle_health_command, handle_stats_command, handle_users_command};
use crate::telegram::bot::Command;
use crate::telegram::Bot;

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: RegistrationDialogue,
    deps: HandlerDeps,
) -> Result<(), HandlerError> {
    log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);
    let Some(user_id) = sender_id(&msg) else {
        return Ok(());
    };

    match cmd {
        Command::Start => handle_start_command(&bot, &msg, &dialogue, &deps).await,
        Command::Admin => handle_admin_command(&bot, msg.chat.id, user_id, &deps).await,
        Command::Stats => handle_stats_command(&bot, msg.chat.id, user_id, &deps).await,
        Command::Users => handle_users_command(&bot, msg.chat.id, user_id, &deps).await,
        Command::Health => handle_health_command(&bot, msg.chat.id, user_id, &deps).await,
    }
}
