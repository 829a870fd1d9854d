//! Handler types and shared dependencies.

use std::sync::Arc;

use quedacore::{Gateway, SessionRegistry, WizardStore};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub gateway: Arc<dyn Gateway>,
    pub sessions: Arc<SessionRegistry>,
    pub wizards: Arc<WizardStore>,
}

impl HandlerDeps {
    pub fn new(gateway: Arc<dyn Gateway>, sessions: Arc<SessionRegistry>, wizards: Arc<WizardStore>) -> Self {
        Self {
            gateway,
            sessions,
            wizards,
        }
    }

    /// Wires the registries around one gateway. Handy in tests; `main`
    /// builds the pieces itself so it can spawn their cleanup tasks.
    pub fn from_gateway(gateway: Arc<dyn Gateway>, moneda_defecto: impl Into<String>) -> Self {
        let sessions = Arc::new(SessionRegistry::new(Arc::clone(&gateway)));
        let wizards = Arc::new(WizardStore::new(Arc::clone(&gateway), moneda_defecto));
        Self::new(gateway, sessions, wizards)
    }
}
