//! Telegram front end: command definitions, dispatcher schema and handlers.

pub mod access;
pub mod bot;
mod callbacks;
mod commands;
pub mod messages;
pub mod schema;
pub mod texts;
pub mod types;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
