//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the Telegram bot.
//! Handlers delegate to `referral` for every decision, so the same workflow
//! is exercised by the integration tests without a Telegram connection.

mod callbacks;
mod commands;
mod menu;
mod registration;
mod schema;
mod types;

pub use schema::schema;
pub use types::{
    sender_id, user_id_of, HandlerDeps, HandlerError, RegistrationDialogue, RegistrationState, RegistrationStorage,
};
