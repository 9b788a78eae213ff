//! Approve/reject inline button callbacks

use teloxide::prelude::*;
use teloxide::types::CallbackQuery;

use super::types::{user_id_of, HandlerDeps, HandlerError};
use crate::core::error::AppError;
use crate::referral::{AdminAction, Decision};
use crate::telegram::notifications::{notify_admin_chat, notify_user};
use crate::telegram::{keyboards, texts, Bot};

/// Text for the edited panel message and the callback alert.
fn decision_summary(decision: &Decision) -> (String, String) {
    let user = &decision.user;
    match (decision.action, &decision.sheet_error) {
        (AdminAction::Approve(_), Some(_)) => (
            format!(
                "⚠️ Пользователь {} (ID: {}) одобрен, но не добавлен в Google Sheets.\nНажмите кнопку ниже, чтобы повторить.",
                user.name, user.telegram_id
            ),
            "⚠️ Одобрен, но ошибка Google Sheets.".to_string(),
        ),
        (AdminAction::Approve(_), None) => (
            format!("✅ Пользователь {} (ID: {}) одобрен!", user.name, user.telegram_id),
            if decision.already_decided {
                "✅ Пользователь уже одобрен, таблица проверена.".to_string()
            } else {
                "✅ Пользователь одобрен!".to_string()
            },
        ),
        (AdminAction::Reject(_), _) => (
            format!("❌ Пользователь {} (ID: {}) отклонен.", user.name, user.telegram_id),
            "❌ Пользователь отклонен!".to_string(),
        ),
    }
}

pub async fn handle_admin_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> Result<(), HandlerError> {
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let admin_id = user_id_of(&q.from).unwrap_or_default();

    let outcome = match data.parse::<AdminAction>() {
        Ok(action) => deps.workflow.decide(admin_id, action).await,
        Err(e) => Err(e),
    };

    let decision = match outcome {
        Ok(decision) => decision,
        Err(e) => {
            if !matches!(e, AppError::Validation(_)) {
                log::error!("Admin callback {} from {} failed: {}", data, admin_id, e);
            }
            bot.answer_callback_query(q.id.clone())
                .text(e.user_message())
                .show_alert(true)
                .await?;
            return Ok(());
        }
    };

    let user = &decision.user;
    if !decision.already_decided {
        match decision.action {
            AdminAction::Approve(_) => {
                notify_user(&bot, user.telegram_id, texts::APPROVAL_SUCCESS).await;
                let link = deps.menu.referral_url(&user.partner_code());
                notify_admin_chat(&bot, &deps.config, &texts::user_approved(user, &link)).await;
            }
            AdminAction::Reject(_) => {
                notify_user(&bot, user.telegram_id, &texts::approval_rejected(deps.menu.support_contact())).await;
                notify_admin_chat(&bot, &deps.config, &texts::user_rejected(user)).await;
            }
        }
    }

    let (panel_text, alert) = decision_summary(&decision);
    bot.answer_callback_query(q.id.clone()).text(alert).show_alert(true).await?;

    if let Some(message) = q.message.as_ref() {
        let edit = bot.edit_message_text(message.chat().id, message.id(), panel_text);
        let result = if decision.sheet_error.is_some() {
            edit.reply_markup(keyboards::retry_approve_keyboard(user.telegram_id)).await
        } else {
            edit.await
        };
        if let Err(e) = result {
            log::warn!("Could not update admin panel message: {}", e);
        }
    }
    Ok(())
}
