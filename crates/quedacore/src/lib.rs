//! Quedacore - domain layer of the Quedada Telegram bot
//!
//! Everything here is Telegram-agnostic: the backend gateway, the per-chat
//! session registry and the event publication wizard only deal in chat ids
//! and plain strings, so they can be driven from tests (or another frontend)
//! without a bot in sight.
//!
//! # Module Structure
//!
//! - `config`: environment-driven configuration statics
//! - `gateway`: backend access (REST client and in-memory file backend)
//! - `logging`: logger initialization and startup summary
//! - `session`: login sessions with cross-device exclusivity
//! - `wizard`: the step-by-step event publication flow

pub mod config;
pub mod gateway;
pub mod logging;
pub mod session;
pub mod wizard;

// Re-export commonly used types for convenience
pub use gateway::{Credencial, Gateway, GatewayError};
pub use logging::{init_logger, log_startup_configuration};
pub use session::{LoginError, Session, SessionRegistry};
pub use wizard::{ConfirmOutcome, StartOutcome, StepOutcome, WizardStore};
