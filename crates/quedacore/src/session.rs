//! Per-chat login sessions.
//!
//! The registry is keyed by Telegram chat id, so a chat can hold at most one
//! session. Cross-device exclusivity is enforced through the durable binding
//! marker on the backend account record (`chatVinculado`): login claims it,
//! logout and expiry release it, and a marker held by another chat makes the
//! login fail. The marker is never stolen; the other chat has to log out (or
//! idle out) first.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use reqwest::StatusCode;
use thiserror::Error;
use tokio::time::Instant;

use crate::gateway::types::Role;
use crate::gateway::{Credencial, Gateway, GatewayError};

/// What the bot knows about a logged-in chat.
#[derive(Debug, Clone)]
pub struct Session {
    pub chat_id: i64,
    pub usuario_id: i64,
    pub nombre_usuario: String,
    pub nombre: String,
    pub rol: Role,
    /// Participant or organizer id, what the REST resources are keyed by.
    pub actor_id: i64,
    pub credencial: Credencial,
}

/// Why a login was refused.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("usuario o contraseña incorrectos")]
    InvalidCredentials,
    #[error("esa cuenta ya tiene una sesión abierta en otro chat")]
    AlreadyLoggedInElsewhere,
    #[error(transparent)]
    Gateway(GatewayError),
}

impl From<GatewayError> for LoginError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthorized => LoginError::InvalidCredentials,
            // The backend refuses to rebind an account that is already
            // bound to a different chat.
            GatewayError::Api { status, .. } if status == StatusCode::CONFLICT => {
                LoginError::AlreadyLoggedInElsewhere
            }
            other => LoginError::Gateway(other),
        }
    }
}

struct Entrada {
    sesion: Session,
    ultimo_uso: Instant,
}

/// In-memory map chat id -> session, backed by the gateway for the
/// binding marker. Share it as `Arc<SessionRegistry>`.
pub struct SessionRegistry {
    gateway: Arc<dyn Gateway>,
    sesiones: DashMap<i64, Entrada>,
}

impl SessionRegistry {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        SessionRegistry {
            gateway,
            sesiones: DashMap::new(),
        }
    }

    /// Authenticates against the backend and, if the account is free,
    /// binds it to this chat and stores the session.
    ///
    /// A chat that logs in again replaces its own session: the previous
    /// account's binding is released first. A marker held by another chat
    /// is respected and surfaces as [`LoginError::AlreadyLoggedInElsewhere`]
    /// before any state changes hands.
    pub async fn login(
        &self,
        chat_id: i64,
        nombre_usuario: &str,
        contrasena: &str,
    ) -> Result<Session, LoginError> {
        let usuario = self.gateway.autenticar(nombre_usuario, contrasena).await?;

        if let Some(otro) = usuario.chat_vinculado {
            if otro != chat_id {
                return Err(LoginError::AlreadyLoggedInElsewhere);
            }
        }

        // Explicit replacement: drop this chat's previous session before
        // claiming the new account. Same account keeps its marker.
        if let Some((_, anterior)) = self.sesiones.remove(&chat_id) {
            if anterior.sesion.usuario_id != usuario.id {
                if let Err(err) = self.gateway.desvincular_chat(&anterior.sesion.credencial).await {
                    log::warn!(
                        "Could not release the previous binding for chat {}: {}",
                        chat_id,
                        err
                    );
                }
            }
        }

        let credencial = Credencial::new(nombre_usuario, contrasena);
        // Claiming the marker can still lose a race with a login from
        // another chat; the backend's 409 becomes AlreadyLoggedInElsewhere.
        self.gateway.vincular_chat(&credencial, chat_id).await?;

        let sesion = Session {
            chat_id,
            usuario_id: usuario.id,
            nombre_usuario: usuario.nombre_usuario,
            nombre: usuario.nombre,
            rol: usuario.rol,
            actor_id: usuario.actor_id,
            credencial,
        };
        log::info!(
            "Chat {} logged in as {} ({})",
            chat_id,
            sesion.nombre_usuario,
            sesion.rol.etiqueta()
        );
        self.sesiones.insert(
            chat_id,
            Entrada {
                sesion: sesion.clone(),
                ultimo_uso: Instant::now(),
            },
        );
        Ok(sesion)
    }

    /// Drops the chat's session and releases the binding marker.
    /// Returns false when there was nothing to log out.
    pub async fn logout(&self, chat_id: i64) -> bool {
        let Some((_, entrada)) = self.sesiones.remove(&chat_id) else {
            return false;
        };
        if let Err(err) = self.gateway.desvincular_chat(&entrada.sesion.credencial).await {
            // The local session is gone either way; the marker will be
            // reclaimed on the next successful login from this account.
            log::warn!("Could not release the binding for chat {}: {}", chat_id, err);
        }
        log::info!("Chat {} logged out ({})", chat_id, entrada.sesion.nombre_usuario);
        true
    }

    /// Clones the session out so no map lock is held by the caller.
    pub fn get(&self, chat_id: i64) -> Option<Session> {
        self.sesiones.get(&chat_id).map(|e| e.sesion.clone())
    }

    pub fn is_logged_in(&self, chat_id: i64) -> bool {
        self.sesiones.contains_key(&chat_id)
    }

    /// Marks the session as active, pushing back its expiry.
    pub fn touch(&self, chat_id: i64) {
        if let Some(mut entrada) = self.sesiones.get_mut(&chat_id) {
            entrada.ultimo_uso = Instant::now();
        }
    }

    pub fn len(&self) -> usize {
        self.sesiones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sesiones.is_empty()
    }

    /// Removes sessions idle for longer than `ttl` and releases their
    /// markers. Returns how many were evicted.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let ahora = Instant::now();
        let caducadas: Vec<i64> = self
            .sesiones
            .iter()
            .filter(|e| ahora.duration_since(e.ultimo_uso) >= ttl)
            .map(|e| *e.key())
            .collect();

        let mut evicted = 0;
        for chat_id in caducadas {
            // remove() re-checks under the shard lock; a touch that raced
            // the scan keeps the session alive.
            let Some((_, entrada)) = self
                .sesiones
                .remove_if(&chat_id, |_, e| ahora.duration_since(e.ultimo_uso) >= ttl)
            else {
                continue;
            };
            if let Err(err) = self.gateway.desvincular_chat(&entrada.sesion.credencial).await {
                log::warn!("Could not release the binding for expired chat {}: {}", chat_id, err);
            }
            log::info!(
                "Session for chat {} expired after inactivity ({})",
                chat_id,
                entrada.sesion.nombre_usuario
            );
            evicted += 1;
        }
        evicted
    }

    /// Spawns the periodic expiry sweep.
    pub fn spawn_cleanup_task(self: Arc<Self>, ttl: Duration, cada: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(cada);
            // The first tick fires immediately; skip it so a fresh boot
            // does not sweep an empty map.
            tick.tick().await;
            loop {
                tick.tick().await;
                let evicted = self.evict_idle(ttl).await;
                if evicted > 0 {
                    log::debug!("Session sweep evicted {} idle session(s)", evicted);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::file::{Cuenta, Datos, FileGateway};
    use crate::gateway::types::Usuario;
    use pretty_assertions::assert_eq;

    fn cuenta(id: i64, nombre_usuario: &str, rol: Role) -> Cuenta {
        Cuenta {
            usuario: Usuario {
                id,
                nombre_usuario: nombre_usuario.to_string(),
                nombre: format!("Nombre {nombre_usuario}"),
                rol,
                actor_id: 100 + id,
                chat_vinculado: None,
            },
            contrasena: "clave".to_string(),
        }
    }

    fn registro() -> SessionRegistry {
        let datos = Datos {
            usuarios: vec![cuenta(1, "ana", Role::User), cuenta(2, "carla", Role::Organizer)],
            eventos: vec![],
            inscripciones: vec![],
        };
        SessionRegistry::new(Arc::new(FileGateway::from_datos(datos)))
    }

    #[tokio::test]
    async fn login_stores_one_session_per_chat() {
        let registro = registro();
        let sesion = registro.login(10, "ana", "clave").await.unwrap();
        assert_eq!(sesion.usuario_id, 1);
        assert_eq!(sesion.actor_id, 101);
        assert!(registro.is_logged_in(10));
        assert_eq!(registro.len(), 1);

        // Same chat logging in again replaces, never duplicates.
        registro.login(10, "carla", "clave").await.unwrap();
        assert_eq!(registro.len(), 1);
        assert_eq!(registro.get(10).unwrap().nombre_usuario, "carla");
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let registro = registro();
        let err = registro.login(10, "ana", "mala").await.unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));
        assert!(!registro.is_logged_in(10));
    }

    #[tokio::test]
    async fn second_chat_cannot_take_a_bound_account() {
        let registro = registro();
        registro.login(10, "ana", "clave").await.unwrap();

        let err = registro.login(20, "ana", "clave").await.unwrap_err();
        assert!(matches!(err, LoginError::AlreadyLoggedInElsewhere));
        // The first chat's session is untouched.
        assert!(registro.is_logged_in(10));
        assert!(!registro.is_logged_in(20));
    }

    #[tokio::test]
    async fn logout_releases_the_account_for_other_chats() {
        let registro = registro();
        registro.login(10, "ana", "clave").await.unwrap();
        assert!(registro.logout(10).await);
        assert!(!registro.is_logged_in(10));

        registro.login(20, "ana", "clave").await.unwrap();
        assert!(registro.is_logged_in(20));
    }

    #[tokio::test]
    async fn logout_without_session_reports_false() {
        let registro = registro();
        assert!(!registro.logout(99).await);
    }

    #[tokio::test]
    async fn replacing_the_account_frees_the_old_one() {
        let registro = registro();
        registro.login(10, "ana", "clave").await.unwrap();
        registro.login(10, "carla", "clave").await.unwrap();

        // ana's marker was released by the replacement, so another chat
        // can claim her now.
        registro.login(20, "ana", "clave").await.unwrap();
        assert_eq!(registro.get(10).unwrap().nombre_usuario, "carla");
        assert_eq!(registro.get(20).unwrap().nombre_usuario, "ana");
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_expire_and_release_the_marker() {
        let registro = registro();
        registro.login(10, "ana", "clave").await.unwrap();

        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(registro.evict_idle(Duration::from_secs(60)).await, 1);
        assert!(!registro.is_logged_in(10));

        // The marker went away with the session.
        registro.login(20, "ana", "clave").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn touch_defers_expiry() {
        let registro = registro();
        registro.login(10, "ana", "clave").await.unwrap();

        tokio::time::advance(Duration::from_secs(50)).await;
        registro.touch(10);
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(registro.evict_idle(Duration::from_secs(60)).await, 0);
        assert!(registro.is_logged_in(10));
    }
}
