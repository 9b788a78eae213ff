//! Admin commands: approval panel, statistics, partner list, health

use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::core::health;
use crate::storage::db::UserRecord;
use crate::telegram::handlers::{HandlerDeps, HandlerError};
use crate::telegram::notifications::reply_with_error;
use crate::telegram::{keyboards, texts, Bot};

/// Telegram rejects messages above 4096 chars; keep some headroom
pub const MAX_MESSAGE_LENGTH: usize = 4000;
const PANEL_LIST_LIMIT: usize = 10;
const USERS_LIST_LIMIT: usize = 20;

/// Splits text into chunks of at most `limit` characters, preferring line breaks.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > limit {
            // A single oversized line is cut on char boundaries
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

pub fn format_pending_panel(pending: &[UserRecord]) -> String {
    if pending.is_empty() {
        return "👥 Админ панель\n\n📋 Нет пользователей, ожидающих подтверждения.".to_string();
    }

    let mut text = String::from("👥 Админ панель\n\n📋 Пользователи, ожидающие подтверждения:\n\n");
    for (i, user) in pending.iter().take(PANEL_LIST_LIMIT).enumerate() {
        text.push_str(&format!(
            "{}. ID: {}\n   Имя: {}\n   Телефон: {}\n   Дата: {}\n\n",
            i + 1,
            user.telegram_id,
            user.name,
            user.phone,
            user.created_at
        ));
    }
    if pending.len() > PANEL_LIST_LIMIT {
        text.push_str(&format!(
            "... и еще {} пользователей\n\n",
            pending.len() - PANEL_LIST_LIMIT
        ));
    }
    text
}

pub fn format_users_list(approved: &[UserRecord], link_for: impl Fn(&str) -> String) -> String {
    if approved.is_empty() {
        return "📋 Нет одобренных пользователей.".to_string();
    }

    let mut text = String::from("👥 Одобренные пользователи:\n\n");
    for (i, user) in approved.iter().take(USERS_LIST_LIMIT).enumerate() {
        text.push_str(&format!(
            "{}. ID: {}\n   Имя: {}\n   Телефон: {}\n   Одобрен: {}\n   Ссылка: {}\n\n",
            i + 1,
            user.telegram_id,
            user.name,
            user.phone,
            user.decided_at.as_deref().unwrap_or("-"),
            link_for(&user.partner_code())
        ));
    }
    if approved.len() > USERS_LIST_LIMIT {
        text.push_str(&format!("... и еще {} пользователей\n", approved.len() - USERS_LIST_LIMIT));
    }
    text
}

/// Rejects non-admins with the standard message. Returns whether to continue.
async fn ensure_admin(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> Result<bool, HandlerError> {
    if deps.config.is_admin(user_id) {
        return Ok(true);
    }
    log::warn!("User {} tried to use an admin command", user_id);
    bot.send_message(chat_id, texts::NOT_ADMIN).await?;
    Ok(false)
}

/// /admin: pending registrations with approve/reject buttons
pub async fn handle_admin_command(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    if !ensure_admin(bot, chat_id, user_id, deps).await? {
        return Ok(());
    }

    let pending = match deps.workflow.pending() {
        Ok(pending) => pending,
        Err(e) => return reply_with_error(bot, chat_id, "Loading pending users failed", &e).await,
    };
    log::info!("Admin {} opened panel with {} pending users", user_id, pending.len());

    let text = format_pending_panel(&pending);
    if pending.is_empty() {
        bot.send_message(chat_id, text).await?;
    } else {
        bot.send_message(chat_id, text)
            .reply_markup(keyboards::pending_panel_keyboard(&pending))
            .await?;
    }
    Ok(())
}

/// /stats: state counts and spreadsheet status
pub async fn handle_stats_command(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    if !ensure_admin(bot, chat_id, user_id, deps).await? {
        return Ok(());
    }

    let counts = match deps.workflow.counts() {
        Ok(counts) => counts,
        Err(e) => return reply_with_error(bot, chat_id, "Loading user counts failed", &e).await,
    };
    let mut text = String::from("📊 Статистика реферальной системы\n\n");
    text.push_str(&format!("⏳ Ожидают подтверждения: {}\n", counts.pending));
    text.push_str(&format!("✅ Одобренных пользователей: {}\n", counts.approved));
    text.push_str(&format!("🚫 Отклоненных заявок: {}\n", counts.rejected));
    text.push_str(&format!("📈 Всего зарегистрированных: {}\n\n", counts.total()));

    if deps.ledger.test_connection().await {
        text.push_str("📋 Google Sheets:\n   • Подключение: ✅\n");
        match deps.ledger.worksheet_info().await {
            Ok(info) => {
                text.push_str(&format!("   • Партнеров в таблице: {}\n", info.partner_count));
                text.push_str(&format!("   • Строк в таблице: {}\n", info.row_count));
            }
            Err(e) => {
                log::error!("Failed to read worksheet info: {}", e);
                text.push_str("   • Партнеров в таблице: N/A\n   • Строк в таблице: N/A\n");
            }
        }
    } else {
        text.push_str("📋 Google Sheets: ❌ Нет подключения\n");
    }

    bot.send_message(chat_id, text).await?;
    Ok(())
}

/// /users: approved partners with their links
pub async fn handle_users_command(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    if !ensure_admin(bot, chat_id, user_id, deps).await? {
        return Ok(());
    }

    let approved = match deps.workflow.approved() {
        Ok(approved) => approved,
        Err(e) => return reply_with_error(bot, chat_id, "Loading approved users failed", &e).await,
    };
    let text = format_users_list(&approved, |code| deps.config.referral_link(code));
    for chunk in split_message(&text, MAX_MESSAGE_LENGTH) {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}

/// /health: database, spreadsheet and QR asset checks
pub async fn handle_health_command(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    if !ensure_admin(bot, chat_id, user_id, deps).await? {
        return Ok(());
    }

    let report = health::run_all_checks(&deps.config, &deps.db_pool, deps.ledger.as_ref()).await;
    for chunk in split_message(&report.format_telegram(), MAX_MESSAGE_LENGTH) {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}
