//! Registration input validation
//!
//! Checks the two values a partner provides during registration:
//! - display name (typed as free text)
//! - phone number (taken from a shared Telegram contact)

use thiserror::Error;

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MIN_PHONE_LENGTH: usize = 10;
pub const MAX_PHONE_LENGTH: usize = 20;

/// Validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is shorter than {MIN_NAME_LENGTH} characters")]
    NameTooShort,

    #[error("name is longer than {MAX_NAME_LENGTH} characters")]
    NameTooLong,

    #[error("name contains unsupported characters: {0}")]
    NameCharacters(String),

    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// The shared contact belongs to someone other than the sender
    #[error("contact belongs to user {owner:?}, not {requester}")]
    ContactMismatch { requester: i64, owner: Option<i64> },
}

impl ValidationError {
    /// Message shown inline to the user; the registration step is repeated.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::NameTooShort => "Пожалуйста, введите корректное имя (минимум 2 символа):",
            ValidationError::NameCharacters(_) => {
                "Имя может содержать только буквы, пробелы, дефис, точку и апостроф. Попробуйте еще раз:"
            }
            ValidationError::NameTooLong => "Имя слишком длинное. Пожалуйста, введите имя до 50 символов:",
            ValidationError::InvalidPhone(_) => "Не удалось получить номер телефона. Попробуйте еще раз:",
            ValidationError::ContactMismatch { .. } => {
                "Пожалуйста, поделитесь своим собственным контактом, нажав кнопку:"
            }
        }
    }
}

/// Validates a display name and returns it trimmed.
///
/// Letters of any script, spaces, `-`, `.` and apostrophes (`'`, `’`) are accepted.
///
/// # Examples
/// ```
/// use partnerbot::core::validation::validate_name;
///
/// assert_eq!(validate_name("  Анна ").unwrap(), "Анна");
/// assert!(validate_name("A").is_err());
/// ```
pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    let length = name.chars().count();

    if length < MIN_NAME_LENGTH {
        return Err(ValidationError::NameTooShort);
    }
    if length > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_alphabetic() || c.is_whitespace() || matches!(*c, '-' | '.' | '\'' | '’')))
    {
        return Err(ValidationError::NameCharacters(bad.to_string()));
    }

    Ok(name.to_string())
}

/// Normalizes and validates a phone number.
///
/// Spaces, dashes and parentheses are dropped. A leading `+` is kept.
/// The remaining characters must be digits.
pub fn validate_phone(raw: &str) -> Result<String, ValidationError> {
    let normalized: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    let digits = normalized.strip_prefix('+').unwrap_or(&normalized);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPhone(raw.to_string()));
    }
    if normalized.len() < MIN_PHONE_LENGTH || normalized.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::InvalidPhone(raw.to_string()));
    }

    Ok(normalized)
}

/// Checks that a shared contact belongs to the user who sent it.
pub fn validate_contact_owner(requester: i64, owner: Option<i64>) -> Result<(), ValidationError> {
    if owner == Some(requester) {
        Ok(())
    } else {
        Err(ValidationError::ContactMismatch { requester, owner })
    }
}
