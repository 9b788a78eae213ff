//! Partner menu (reply keyboard) handlers

use teloxide::prelude::*;
use teloxide::types::{InputFile, Message};

use super::types::{sender_id, HandlerDeps, HandlerError};
use crate::referral::{Access, MenuAction};
use crate::telegram::notifications::reply_with_error;
use crate::telegram::{keyboards, texts, Bot};

pub async fn handle_menu_action(
    bot: Bot,
    msg: Message,
    action: MenuAction,
    deps: HandlerDeps,
) -> Result<(), HandlerError> {
    let Some(user_id) = sender_id(&msg) else {
        return Ok(());
    };
    log::info!("Menu action {:?} from user {}", action, user_id);

    if deps.config.is_admin(user_id) {
        bot.send_message(msg.chat.id, texts::ADMIN_NO_REFERRAL).await?;
        return Ok(());
    }

    let access = match deps.workflow.access(user_id) {
        Ok(access) => access,
        Err(e) => return reply_with_error(&bot, msg.chat.id, "Menu access check failed", &e).await,
    };
    let record = match access {
        Access::Approved(record) => record,
        Access::Pending(_) => {
            bot.send_message(msg.chat.id, texts::APPROVAL_WAITING).await?;
            return Ok(());
        }
        Access::Rejected(_) => {
            bot.send_message(msg.chat.id, texts::approval_rejected(deps.menu.support_contact()))
                .await?;
            return Ok(());
        }
        Access::Unseen => {
            bot.send_message(msg.chat.id, texts::START_FIRST).await?;
            return Ok(());
        }
    };

    match action {
        MenuAction::ReferralLink => {
            let card = match deps.menu.referral_card(&record) {
                Ok(card) => card,
                Err(e) => return reply_with_error(&bot, msg.chat.id, "Referral card failed", &e).await,
            };
            bot.send_message(msg.chat.id, texts::referral_link(&card.url))
                .reply_markup(keyboards::main_menu_keyboard())
                .await?;
            match card.qr {
                Some(png) => {
                    let photo = InputFile::memory(png).file_name(format!("qr_{}.png", record.partner_code()));
                    bot.send_photo(msg.chat.id, photo).caption(texts::QR_CAPTION).await?;
                }
                None => log::warn!("Sent referral link without QR to user {}", user_id),
            }
        }
        MenuAction::Balance => {
            let text = match deps.menu.balance(&record).await {
                Ok(balance) => texts::balance_info(balance, deps.menu.support_contact()),
                Err(e) => {
                    log::error!("Failed to load balance for {}: {}", user_id, e);
                    texts::ERROR_BALANCE.to_string()
                }
            };
            bot.send_message(msg.chat.id, text)
                .reply_markup(keyboards::main_menu_keyboard())
                .await?;
        }
        MenuAction::Support => {
            let request = bot.send_message(msg.chat.id, texts::support_info(deps.menu.support_contact()));
            match keyboards::support_keyboard(&deps.config.support_link()) {
                Some(keyboard) => request.reply_markup(keyboard).await?,
                None => request.reply_markup(keyboards::main_menu_keyboard()).await?,
            };
        }
    }
    Ok(())
}
