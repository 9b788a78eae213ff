//! Reply and inline keyboards

use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, KeyboardRemove,
};

use crate::referral::{AdminAction, MenuAction};
use crate::storage::db::UserRecord;
use crate::telegram::bot::Command;
use crate::telegram::texts;

/// Inline approve/reject buttons are shown for this many pending users
pub const PANEL_BUTTON_LIMIT: usize = 5;

/// Admin reply-keyboard entries and the command each one runs.
pub const ADMIN_BUTTONS: [(&str, Command); 4] = [
    ("📊 Статистика", Command::Stats),
    ("👥 Список пользователей", Command::Users),
    ("⚙️ Админ панель", Command::Admin),
    ("🏥 Здоровье системы", Command::Health),
];

pub fn admin_command_for(text: &str) -> Option<Command> {
    let text = text.trim();
    ADMIN_BUTTONS
        .iter()
        .find(|(label, _)| *label == text)
        .map(|(_, command)| command.clone())
}

pub fn contact_keyboard() -> KeyboardMarkup {
    let button = KeyboardButton::new(texts::SHARE_CONTACT_BUTTON).request(ButtonRequest::Contact);
    KeyboardMarkup::new(vec![vec![button]])
        .resize_keyboard()
        .one_time_keyboard()
}

pub fn main_menu_keyboard() -> KeyboardMarkup {
    let rows = MenuAction::ALL
        .iter()
        .map(|action| vec![KeyboardButton::new(action.label())])
        .collect::<Vec<_>>();
    KeyboardMarkup::new(rows).resize_keyboard()
}

pub fn admin_keyboard() -> KeyboardMarkup {
    let rows = ADMIN_BUTTONS
        .iter()
        .map(|(label, _)| vec![KeyboardButton::new(*label)])
        .collect::<Vec<_>>();
    KeyboardMarkup::new(rows).resize_keyboard()
}

pub fn remove_keyboard() -> KeyboardRemove {
    KeyboardRemove::new()
}

/// One approve/reject row per pending user, up to [`PANEL_BUTTON_LIMIT`].
pub fn pending_panel_keyboard(users: &[UserRecord]) -> InlineKeyboardMarkup {
    let rows = users
        .iter()
        .take(PANEL_BUTTON_LIMIT)
        .map(|user| {
            vec![
                InlineKeyboardButton::callback(
                    format!("✅ {} ({})", user.name, user.telegram_id),
                    AdminAction::Approve(user.telegram_id).callback_data(),
                ),
                InlineKeyboardButton::callback(
                    "❌ Отклонить",
                    AdminAction::Reject(user.telegram_id).callback_data(),
                ),
            ]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// Single button that repeats an approval whose spreadsheet write failed.
pub fn retry_approve_keyboard(user_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🔁 Повторить добавление в таблицу",
        AdminAction::Approve(user_id).callback_data(),
    )]])
}

/// "Write to support" button, `None` if the link is not a valid URL.
pub fn support_keyboard(link: &str) -> Option<InlineKeyboardMarkup> {
    let url = url::Url::parse(link)
        .map_err(|e| log::warn!("Invalid support link {}: {}", link, e))
        .ok()?;
    Some(InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        "💬 Написать в поддержку",
        url,
    )]]))
}
