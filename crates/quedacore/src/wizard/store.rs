//! Per-chat wizard sessions.
//!
//! At most one wizard per chat, same keying as the session registry. The
//! store owns the state machines and the submission path; handlers only
//! ever see the outcome enums.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use super::state::WizardState;
use crate::gateway::types::Evento;
use crate::gateway::{Gateway, GatewayError};
use crate::session::Session;

/// Result of `/publicar_evento`.
#[derive(Debug)]
pub enum StartOutcome {
    /// A fresh wizard; carries the first question.
    Started(String),
    /// This chat already has one going. It is left untouched: the user
    /// has to finish it or /cancelar first.
    AlreadyActive,
}

/// Result of feeding one reply to an active wizard.
#[derive(Debug)]
pub enum StepOutcome {
    /// Accepted; carries the next question.
    Prompt(String),
    /// Rejected; carries the re-prompt. The step was not consumed.
    Invalid(String),
    /// All eleven answers collected; carries the summary to confirm.
    ReadyForConfirmation(String),
}

/// Result of the confirm button.
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// The backend accepted the event. The wizard is gone.
    Submitted(Evento),
    /// The backend refused or was unreachable. The wizard is gone too;
    /// publishing starts over from step 1.
    Failed(String),
    /// Steps are still missing; the wizard is left as it was.
    NotReady,
    /// No wizard in this chat.
    NotActive,
}

struct Entrada {
    estado: WizardState,
    ultimo_uso: Instant,
}

/// Map chat id -> wizard in progress. Share it as `Arc<WizardStore>`.
pub struct WizardStore {
    gateway: Arc<dyn Gateway>,
    moneda_defecto: String,
    borradores: DashMap<i64, Entrada>,
}

impl WizardStore {
    /// `moneda_defecto` prices bare amounts ("1500" -> 1500 EUR).
    pub fn new(gateway: Arc<dyn Gateway>, moneda_defecto: impl Into<String>) -> Self {
        WizardStore {
            gateway,
            moneda_defecto: moneda_defecto.into(),
            borradores: DashMap::new(),
        }
    }

    /// Opens a wizard for the chat, unless one is already running.
    pub fn start(&self, chat_id: i64) -> StartOutcome {
        if self.borradores.contains_key(&chat_id) {
            return StartOutcome::AlreadyActive;
        }
        let estado = WizardState::nuevo();
        let pregunta = estado.pregunta();
        self.borradores.insert(
            chat_id,
            Entrada {
                estado,
                ultimo_uso: Instant::now(),
            },
        );
        log::info!("Chat {} started the publication wizard", chat_id);
        StartOutcome::Started(pregunta)
    }

    pub fn is_active(&self, chat_id: i64) -> bool {
        self.borradores.contains_key(&chat_id)
    }

    /// Feeds a reply to the chat's wizard. `None` when no wizard is
    /// running, so the caller can fall through to other text handling.
    pub fn advance(&self, chat_id: i64, texto: &str) -> Option<StepOutcome> {
        let mut entrada = self.borradores.get_mut(&chat_id)?;
        entrada.ultimo_uso = Instant::now();
        let resultado = match entrada.estado.aplicar(texto, &self.moneda_defecto) {
            Err(error) => StepOutcome::Invalid(error.to_string()),
            Ok(()) if entrada.estado.listo_para_confirmar() => {
                StepOutcome::ReadyForConfirmation(entrada.estado.pregunta())
            }
            Ok(()) => StepOutcome::Prompt(entrada.estado.pregunta()),
        };
        Some(resultado)
    }

    /// Submits the chat's completed wizard as `sesion`'s organizer.
    ///
    /// The wizard is removed before the backend call, so one submission
    /// attempt is all it gets: failure reports and discards, never
    /// retries.
    pub async fn confirm(&self, chat_id: i64, sesion: &Session) -> ConfirmOutcome {
        {
            let Some(entrada) = self.borradores.get(&chat_id) else {
                return ConfirmOutcome::NotActive;
            };
            if !entrada.estado.listo_para_confirmar() {
                return ConfirmOutcome::NotReady;
            }
        }
        let Some((_, entrada)) = self.borradores.remove(&chat_id) else {
            return ConfirmOutcome::NotActive;
        };
        let WizardState::Confirmacion { borrador } = entrada.estado else {
            return ConfirmOutcome::NotReady;
        };

        let payload = borrador.into_payload(sesion.actor_id);
        match self.gateway.crear_evento(&sesion.credencial, payload).await {
            Ok(evento) => {
                log::info!("Chat {} published evento {} ({})", chat_id, evento.id, evento.titulo);
                ConfirmOutcome::Submitted(evento)
            }
            Err(error) => {
                log::warn!("Chat {} failed to publish: {}", chat_id, error);
                ConfirmOutcome::Failed(motivo(&error))
            }
        }
    }

    /// Throws the chat's wizard away. Returns false if there was none.
    pub fn cancel(&self, chat_id: i64) -> bool {
        let habia = self.borradores.remove(&chat_id).is_some();
        if habia {
            log::info!("Chat {} cancelled the publication wizard", chat_id);
        }
        habia
    }

    pub fn len(&self) -> usize {
        self.borradores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.borradores.is_empty()
    }

    /// Removes wizards idle for longer than `ttl`. Abandoned drafts are
    /// simply dropped; nothing was sent to the backend yet.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let ahora = Instant::now();
        let antes = self.borradores.len();
        self.borradores.retain(|chat_id, entrada| {
            let vivo = ahora.duration_since(entrada.ultimo_uso) < ttl;
            if !vivo {
                log::info!("Wizard for chat {} expired at step {}", chat_id, entrada.estado.paso());
            }
            vivo
        });
        antes - self.borradores.len()
    }

    /// Spawns the periodic expiry sweep.
    pub fn spawn_cleanup_task(self: Arc<Self>, ttl: Duration, cada: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(cada);
            tick.tick().await;
            loop {
                tick.tick().await;
                let evicted = self.evict_idle(ttl);
                if evicted > 0 {
                    log::debug!("Wizard sweep evicted {} abandoned draft(s)", evicted);
                }
            }
        })
    }
}

/// User-facing reason for a failed submission.
fn motivo(error: &GatewayError) -> String {
    match error {
        GatewayError::Unauthorized => "la sesión ya no es válida, vuelve a iniciar sesión".to_string(),
        GatewayError::Api { status, body } if !body.is_empty() => format!("el backend lo rechazó ({status}): {body}"),
        GatewayError::Api { status, .. } => format!("el backend lo rechazó ({status})"),
        GatewayError::Network(_) => "no se pudo contactar con el backend".to_string(),
    }
}
