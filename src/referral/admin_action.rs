use std::fmt;
use std::str::FromStr;

use crate::core::error::AppError;

/// Admin decision carried in inline-button callback data.
///
/// Wire format is `approve_<telegram_id>` / `reject_<telegram_id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminAction {
    Approve(i64),
    Reject(i64),
}

impl AdminAction {
    pub fn user_id(&self) -> i64 {
        match self {
            AdminAction::Approve(id) | AdminAction::Reject(id) => *id,
        }
    }

    pub fn callback_data(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminAction::Approve(id) => write!(f, "approve_{}", id),
            AdminAction::Reject(id) => write!(f, "reject_{}", id),
        }
    }
}

impl FromStr for AdminAction {
    type Err = AppError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::Validation(format!("Некорректные данные кнопки: {}", data));
        let (verb, id) = data.split_once('_').ok_or_else(invalid)?;
        let id: i64 = id.parse().map_err(|_| invalid())?;
        match verb {
            "approve" => Ok(AdminAction::Approve(id)),
            "reject" => Ok(AdminAction::Reject(id)),
            _ => Err(invalid()),
        }
    }
}
