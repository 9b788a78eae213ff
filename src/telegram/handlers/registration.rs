//! /start and the contact → name registration dialogue

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{sender_id, user_id_of, HandlerDeps, HandlerError, RegistrationDialogue, RegistrationState};
use crate::core::error::AppError;
use crate::referral::{Access, RegistrationRequest, SharedContact};
use crate::telegram::notifications::{notify_admin_new_registration, reply_with_error};
use crate::telegram::{keyboards, texts, Bot};

/// Entry point for every user: admin greeting, menu, status or registration.
pub async fn handle_start_command(
    bot: &Bot,
    msg: &Message,
    dialogue: &RegistrationDialogue,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let Some(user_id) = sender_id(msg) else {
        return Ok(());
    };

    if deps.config.is_admin(user_id) {
        dialogue.exit().await?;
        bot.send_message(msg.chat.id, texts::ADMIN_WELCOME)
            .reply_markup(keyboards::admin_keyboard())
            .await?;
        return Ok(());
    }

    let access = match deps.workflow.access(user_id) {
        Ok(access) => access,
        Err(e) => {
            dialogue.exit().await?;
            return reply_with_error(bot, msg.chat.id, "Start access check failed", &e).await;
        }
    };
    match access {
        Access::Approved(_) => {
            dialogue.exit().await?;
            bot.send_message(msg.chat.id, texts::MAIN_MENU)
                .reply_markup(keyboards::main_menu_keyboard())
                .await?;
        }
        Access::Pending(_) => {
            dialogue.exit().await?;
            bot.send_message(msg.chat.id, texts::APPROVAL_WAITING).await?;
        }
        Access::Rejected(_) => {
            dialogue.exit().await?;
            bot.send_message(msg.chat.id, texts::approval_rejected(deps.menu.support_contact()))
                .await?;
        }
        Access::Unseen => {
            log::info!("Starting registration for user {}", user_id);
            dialogue.update(RegistrationState::AwaitingContact).await?;
            bot.send_message(msg.chat.id, texts::WELCOME)
                .reply_markup(keyboards::contact_keyboard())
                .await?;
        }
    }
    Ok(())
}

/// `AwaitingContact`: accepts only the requester's own shared contact.
pub async fn receive_contact(
    bot: Bot,
    msg: Message,
    dialogue: RegistrationDialogue,
    deps: HandlerDeps,
) -> Result<(), HandlerError> {
    let Some(user_id) = sender_id(&msg) else {
        return Ok(());
    };
    let Some(contact) = msg.contact() else {
        bot.send_message(msg.chat.id, texts::CONTACT_REQUIRED)
            .reply_markup(keyboards::contact_keyboard())
            .await?;
        return Ok(());
    };

    let shared = SharedContact {
        owner_id: contact.user_id.and_then(|id| i64::try_from(id.0).ok()),
        phone: contact.phone_number.clone(),
    };
    match deps.workflow.verify_contact(user_id, &shared) {
        Ok(phone) => {
            dialogue.update(RegistrationState::AwaitingName { phone }).await?;
            bot.send_message(msg.chat.id, texts::NAME_REQUEST)
                .reply_markup(keyboards::remove_keyboard())
                .await?;
        }
        Err(e) => {
            log::warn!("Contact from user {} rejected: {}", user_id, e);
            bot.send_message(msg.chat.id, e.user_message())
                .reply_markup(keyboards::contact_keyboard())
                .await?;
        }
    }
    Ok(())
}

/// `AwaitingName`: validates the name and stores the PENDING record.
pub async fn receive_name(
    bot: Bot,
    msg: Message,
    dialogue: RegistrationDialogue,
    phone: String,
    deps: HandlerDeps,
) -> Result<(), HandlerError> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(user_id) = user_id_of(from) else {
        return Ok(());
    };
    let Some(name) = msg.text() else {
        bot.send_message(msg.chat.id, texts::NAME_REQUEST).await?;
        return Ok(());
    };

    let request = RegistrationRequest {
        telegram_id: user_id,
        name: name.to_string(),
        phone,
        username: from.username.clone(),
    };
    match deps.workflow.register(request) {
        Ok(user) => {
            dialogue.exit().await?;
            bot.send_message(msg.chat.id, texts::REGISTRATION_SUCCESS).await?;
            notify_admin_new_registration(&bot, &deps.config, &user).await;
        }
        Err(AppError::Validation(message)) => {
            // Stay in AwaitingName so the user can retry
            bot.send_message(msg.chat.id, message).await?;
        }
        Err(e) => {
            dialogue.exit().await?;
            reply_with_error(&bot, msg.chat.id, "Registration failed", &e).await?;
        }
    }
    Ok(())
}
