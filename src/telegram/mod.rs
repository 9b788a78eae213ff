//! Telegram bot integration and handlers

pub mod admin;
pub mod bot;
pub mod handlers;
pub mod keyboards;
pub mod notifications;
pub mod texts;

/// Bot type used throughout the crate
pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError, RegistrationState, RegistrationStorage};
