//! User-facing message texts

use indoc::{formatdoc, indoc};

use crate::storage::db::UserRecord;

pub const WELCOME: &str = indoc! {"
    🏝️ Добро пожаловать в реферальную систему Lethai!

    Для регистрации поделитесь своим контактом, нажав кнопку ниже:"};

pub const ADMIN_WELCOME: &str = indoc! {"
    👑 Добро пожаловать, администратор!

    Используйте кнопки ниже или команды:

    /admin - заявки на подтверждение
    /stats - статистика системы
    /users - одобренные пользователи
    /health - проверка состояния системы

    Администраторы не получают реферальные коды."};

pub const SHARE_CONTACT_BUTTON: &str = "📱 Поделиться контактом";
pub const CONTACT_REQUIRED: &str = "Пожалуйста, поделитесь контактом, нажав кнопку:";
pub const NAME_REQUEST: &str = "Отлично! Теперь введите ваше имя:";

pub const REGISTRATION_SUCCESS: &str = indoc! {"
    ✅ Регистрация успешно завершена!

    Ожидайте подтверждения в реферальной системе.
    Мы уведомим вас, как только ваша заявка будет рассмотрена."};

pub const APPROVAL_WAITING: &str = indoc! {"
    Ожидайте подтверждения в реферальной системе.
    Мы уведомим вас, как только ваша заявка будет рассмотрена."};

pub const APPROVAL_SUCCESS: &str = indoc! {"
    🎉 Поздравляем! Ваша заявка одобрена!

    Теперь вы можете использовать реферальную систему Lethai.
    Используйте команду /start для доступа к меню."};

pub const MAIN_MENU: &str = indoc! {"
    Добро пожаловать в реферальную систему Lethai! 🏝️

    Выберите действие из меню ниже:"};

pub const START_FIRST: &str = "Для начала работы отправьте команду /start";
pub const QR_CAPTION: &str = "Ваш реферальный QR-код";
pub const ERROR_BALANCE: &str = "Ошибка при загрузке баланса, попробуйте позже.";
pub const NOT_ADMIN: &str = "❌ У вас нет прав администратора.";
pub const ADMIN_NO_REFERRAL: &str = "⚠️ У администраторов нет реферальных кодов.";

pub fn approval_rejected(support: &str) -> String {
    formatdoc! {"
        ❌ К сожалению, ваша заявка была отклонена.

        По вопросам обращайтесь в поддержку: {support}",
        support = support,
    }
}

pub fn referral_link(link: &str) -> String {
    formatdoc! {"
        🔗 Ваша реферальная ссылка:

        {link}

        Поделитесь этой ссылкой с друзьями и получайте бонусы за каждую регистрацию! 🎁

        💡 Как это работает:
        • Поделитесь ссылкой с друзьями
        • Они регистрируются по вашей ссылке
        • Вы получаете бонус за каждого реферала
        • Баланс обновляется автоматически",
        link = link,
    }
}

pub fn balance_info(balance: f64, support: &str) -> String {
    formatdoc! {"
        💰 Ваш текущий баланс: {balance:.2} ₽

        📊 Баланс обновляется автоматически при поступлении новых рефералов.
        💬 По вопросам вывода обращайтесь к {support}",
        balance = balance,
        support = support,
    }
}

pub fn support_info(support: &str) -> String {
    formatdoc! {"
        🆘 Поддержка Lethai

        По всем вопросам обращайтесь к нашему менеджеру:
        {support}

        Мы поможем вам с любыми вопросами по реферальной программе! 💬

        ⏰ Время ответа: обычно в течение 1-2 часов в рабочее время",
        support = support,
    }
}

/// Admin-channel notice for a new registration.
pub fn new_registration(user: &UserRecord) -> String {
    formatdoc! {"
        🆕 Новая регистрация в реферальной системе:

        👤 ID: {id}
        📝 Имя: {name}
        📱 Телефон: {phone}{username}

        Используйте /admin для рассмотрения заявки.",
        id = user.telegram_id,
        name = user.name,
        phone = user.phone,
        username = user.username.as_deref().map(|u| format!("\n💬 @{}", u)).unwrap_or_default(),
    }
}

pub fn user_approved(user: &UserRecord, link: &str) -> String {
    formatdoc! {"
        ✅ Пользователь одобрен:

        👤 ID: {id}
        📝 Имя: {name}
        📱 Телефон: {phone}
        🔗 Реферальная ссылка: {link}",
        link = link,
        id = user.telegram_id,
        name = user.name,
        phone = user.phone,
    }
}

pub fn user_rejected(user: &UserRecord) -> String {
    formatdoc! {"
        ❌ Пользователь отклонен:

        👤 ID: {id}
        📝 Имя: {name}
        📱 Телефон: {phone}",
        id = user.telegram_id,
        name = user.name,
        phone = user.phone,
    }
}
