//! Quedabot - Telegram front end for the Quedada event platform
//!
//! The library only holds what the binary and the tests share: the CLI
//! definition and the `telegram` module (commands, dispatcher schema,
//! handlers and reply texts). All domain logic lives in `quedacore`.

pub mod cli;
pub mod telegram;

pub use telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
