//! The step-by-step event publication flow.
//!
//! Eleven questions, a confirmation, and a single submission attempt.
//! [`parse`] validates each answer, [`state`] holds the machine, and
//! [`store`] keys it all by chat.

pub mod parse;
pub mod state;
pub mod store;

pub use parse::FieldError;
pub use state::{EventDraft, WizardState};
pub use store::{ConfirmOutcome, StartOutcome, StepOutcome, WizardStore};
