use thiserror::Error;

use crate::core::validation::ValidationError;

/// Centralized error types for the application
///
/// Every component returns this enum so the Telegram layer can turn any failure
/// into a user-facing message with [`AppError::user_message`].
///
/// # Example
///
/// ```no_run
/// use partnerbot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad user input: shown inline, the conversation does not advance
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation on a user that has no record
    #[error("User {0} not found")]
    NotFound(i64),

    /// Spreadsheet, OAuth or network failure
    #[error("Integration error: {0}")]
    Integration(String),

    /// QR asset could not be loaded or the image could not be encoded
    #[error("Render error: {0}")]
    Render(String),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Text shown to the Telegram user for this error.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(_) => "Пользователь не найден. Начните заново командой /start".to_string(),
            AppError::Integration(_) => "Ошибка подключения к Google Sheets. Попробуйте позже.".to_string(),
            AppError::Render(_) => "Произошла ошибка при генерации QR-кода.".to_string(),
            AppError::Database(_) | AppError::DatabasePool(_) => "Ошибка базы данных. Попробуйте позже.".to_string(),
            AppError::Config(_) | AppError::Telegram(_) | AppError::Io(_) => {
                "Произошла ошибка. Попробуйте позже или обратитесь в поддержку.".to_string()
            }
        }
    }

    pub fn is_integration(&self) -> bool {
        matches!(self, AppError::Integration(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Integration(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Integration(format!("service account signing failed: {}", err))
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Render(err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.user_message().to_string())
    }
}
