//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::callbacks::handle_admin_callback;
use super::commands::handle_command;
use super::menu::handle_menu_action;
use super::registration::{receive_contact, receive_name};
use super::types::{sender_id, HandlerDeps, HandlerError, RegistrationDialogue, RegistrationState, RegistrationStorage};
use crate::referral::MenuAction;
use crate::telegram::bot::Command;
use crate::telegram::keyboards::admin_command_for;
use crate::telegram::texts;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Messages enter the registration dialogue first so every branch can read
/// or advance it; commands and menu buttons take priority over dialogue
/// states, which lets `/start` restart a half-finished registration.
///
/// The dispatcher must provide an `Arc<RegistrationStorage>` dependency.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let messages = Update::filter_message()
        .enter_dialogue::<Message, RegistrationStorage, RegistrationState>()
        .branch(command_handler(deps.clone()))
        .branch(admin_keyboard_handler(deps.clone()))
        .branch(menu_handler(deps.clone()))
        .branch(contact_handler(deps.clone()))
        .branch(name_handler(deps.clone()))
        .branch(fallback_handler());

    dptree::entry().branch(messages).branch(callback_handler(deps))
}

/// Handler for commands from the `Command` enum
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .filter_command::<Command>()
        .endpoint(move |bot: Bot, msg: Message, cmd: Command, dialogue: RegistrationDialogue| {
            let deps = deps.clone();
            async move { handle_command(bot, msg, cmd, dialogue, deps).await }
        })
}

/// Admin reply-keyboard buttons, routed to the matching admin command
fn admin_keyboard_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::filter_map(|msg: Message| msg.text().and_then(admin_command_for)).endpoint(
        move |bot: Bot, msg: Message, cmd: Command, dialogue: RegistrationDialogue| {
            let deps = deps.clone();
            async move {
                log::info!("🎯 Admin keyboard button {:?} from chat {}", cmd, msg.chat.id);
                handle_command(bot, msg, cmd, dialogue, deps).await
            }
        },
    )
}

/// Partner menu buttons
fn menu_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::filter_map(|msg: Message| msg.text().and_then(MenuAction::from_text)).endpoint(
        move |bot: Bot, msg: Message, action: MenuAction| {
            let deps = deps.clone();
            async move { handle_menu_action(bot, msg, action, deps).await }
        },
    )
}

fn contact_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::case![RegistrationState::AwaitingContact].endpoint(
        move |bot: Bot, msg: Message, dialogue: RegistrationDialogue| {
            let deps = deps.clone();
            async move { receive_contact(bot, msg, dialogue, deps).await }
        },
    )
}

fn name_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::case![RegistrationState::AwaitingName { phone }].endpoint(
        move |bot: Bot, msg: Message, dialogue: RegistrationDialogue, phone: String| {
            let deps = deps.clone();
            async move { receive_name(bot, msg, dialogue, phone, deps).await }
        },
    )
}

/// Anything else in a private chat gets a pointer to /start
fn fallback_handler() -> UpdateHandler<HandlerError> {
    dptree::filter(|msg: Message| msg.chat.is_private()).endpoint(|bot: Bot, msg: Message| async move {
        log::debug!("Unhandled message from {:?}", sender_id(&msg));
        bot.send_message(msg.chat.id, texts::START_FIRST).await?;
        Ok::<(), HandlerError>(())
    })
}

/// Handler for approve/reject inline buttons
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move { handle_admin_callback(bot, q, deps).await }
    })
}
