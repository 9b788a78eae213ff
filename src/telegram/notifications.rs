use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::core::config::Config;
use crate::core::error::AppError;
use crate::telegram::handlers::HandlerError;
use crate::storage::db::UserRecord;
use crate::telegram::{keyboards, texts, Bot};

/// Sends a plain-text message to the admin notification chat.
///
/// Failures are logged and swallowed: a notice that cannot be delivered
/// must not fail the user's request.
pub async fn notify_admin_chat(bot: &Bot, config: &Config, text: &str) {
    let chat_id = ChatId(config.telegram.admin_chat_id);
    if let Err(e) = bot.send_message(chat_id, text).await {
        log::error!("Failed to send admin notification to {}: {}", chat_id, e);
    }
}

/// Announces a new registration with approve/reject buttons attached.
pub async fn notify_admin_new_registration(bot: &Bot, config: &Config, user: &UserRecord) {
    let chat_id = ChatId(config.telegram.admin_chat_id);
    let keyboard = keyboards::pending_panel_keyboard(std::slice::from_ref(user));
    if let Err(e) = bot
        .send_message(chat_id, texts::new_registration(user))
        .reply_markup(keyboard)
        .await
    {
        log::error!("Failed to notify admin chat about user {}: {}", user.telegram_id, e);
    }
}

/// Sends a message to a partner's private chat.
pub async fn notify_user(bot: &Bot, user_id: i64, text: &str) {
    if let Err(e) = bot.send_message(ChatId(user_id), text).await {
        log::error!("Error notifying user {}: {}", user_id, e);
    }
}

/// Logs a failed request and tells the user what went wrong.
///
/// Validation errors are expected input problems and log at `warn`.
pub async fn reply_with_error(bot: &Bot, chat_id: ChatId, context: &str, err: &AppError) -> Result<(), HandlerError> {
    if matches!(err, AppError::Validation(_)) {
        log::warn!("{} in chat {}: {}", context, chat_id, err);
    } else {
        log::error!("{} in chat {}: {}", context, chat_id, err);
    }
    bot.send_message(chat_id, err.user_message()).await?;
    Ok(())
}
