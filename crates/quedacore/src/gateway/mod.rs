//! Backend Gateway: the stateless adapter to the event platform.
//!
//! Two implementations share one trait: [`rest::RestGateway`] talks to
//! the live REST API, [`file::FileGateway`] serves a local JSON seed for
//! demos and tests. Handlers only ever see `Arc<dyn Gateway>`.

pub mod file;
pub mod rest;
pub mod types;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config;
use types::{
    EstadisticasCompletas, EstadoInscripcion, Evento, EventoNuevo, Inscripcion, InscripcionNueva, Participante,
    Usuario,
};

/// Opaque Basic-style credential derived from a successful login.
///
/// Stored inside the session and attached to every authenticated call.
/// `Debug` redacts it so it can never leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credencial(String);

impl Credencial {
    pub fn new(nombre_usuario: &str, contrasena: &str) -> Self {
        let token = base64::engine::general_purpose::STANDARD.encode(format!("{nombre_usuario}:{contrasena}"));
        Self(token)
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Basic {}", self.0)
    }

    /// Recovers the `usuario:contraseña` pair. The file gateway checks
    /// credentials locally; the REST backend decodes the header itself.
    pub fn decode(&self) -> Option<(String, String)> {
        let raw = base64::engine::general_purpose::STANDARD.decode(&self.0).ok()?;
        let raw = String::from_utf8(raw).ok()?;
        let (usuario, contrasena) = raw.split_once(':')?;
        Some((usuario.to_string(), contrasena.to_string()))
    }
}

impl fmt::Debug for Credencial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credencial(***)")
    }
}

/// Errors talking to the backend.
///
/// 401 gets its own variant: "bad credentials" must read differently to
/// the user than "the backend is down".
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("credenciales no válidas o sesión caducada")]
    Unauthorized,
    #[error("el backend respondió {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("error de red hablando con el backend: {0}")]
    Network(#[from] reqwest::Error),
}

impl GatewayError {
    /// Synthesizes the same shape a REST backend would return.
    pub(crate) fn api(status: StatusCode, body: impl Into<String>) -> Self {
        GatewayError::Api {
            status,
            body: body.into(),
        }
    }
}

/// Operations the bot needs from the platform. Stateless per call;
/// authenticated operations take the caller's [`Credencial`].
#[async_trait]
pub trait Gateway: Send + Sync {
    /// `POST /login`. Returns the account record, including the binding
    /// marker consulted for cross-device exclusivity.
    async fn autenticar(&self, nombre_usuario: &str, contrasena: &str) -> Result<Usuario, GatewayError>;

    /// `PUT /user` with a chat id: claims the binding marker.
    async fn vincular_chat(&self, cred: &Credencial, chat_id: i64) -> Result<(), GatewayError>;

    /// `PUT /user` with null: releases the binding marker.
    async fn desvincular_chat(&self, cred: &Credencial) -> Result<(), GatewayError>;

    /// `GET /eventos`. Public, no credential.
    async fn eventos(&self) -> Result<Vec<Evento>, GatewayError>;

    /// `POST /eventos`.
    async fn crear_evento(&self, cred: &Credencial, evento: EventoNuevo) -> Result<Evento, GatewayError>;

    /// `GET /participantes/inscripciones/{actor_id}`, optionally
    /// filtered by state via the `estado` query parameter.
    async fn inscripciones(
        &self,
        cred: &Credencial,
        actor_id: i64,
        estado: Option<EstadoInscripcion>,
    ) -> Result<Vec<Inscripcion>, GatewayError>;

    /// `POST /inscripciones`. The backend decides between acceptance
    /// and the waitlist.
    async fn crear_inscripcion(&self, cred: &Credencial, nueva: InscripcionNueva) -> Result<Inscripcion, GatewayError>;

    /// `DELETE /inscripciones/{id}`.
    async fn cancelar_inscripcion(&self, cred: &Credencial, id: i64) -> Result<(), GatewayError>;

    /// `PUT /organizadores/eventos/{id}` closing the inscription window.
    async fn cerrar_inscripciones(&self, cred: &Credencial, evento_id: i64) -> Result<Evento, GatewayError>;

    /// `GET /eventos/{id}/participantes`.
    async fn participantes(&self, cred: &Credencial, evento_id: i64) -> Result<Vec<Participante>, GatewayError>;

    /// `GET /waitlist/{id}`.
    async fn lista_espera(&self, cred: &Credencial, evento_id: i64) -> Result<Vec<Participante>, GatewayError>;

    /// `GET /estadisticas/completas`.
    async fn estadisticas(&self, cred: &Credencial) -> Result<EstadisticasCompletas, GatewayError>;
}

/// Builds the gateway selected by `DATA_MODE`.
pub fn from_env() -> anyhow::Result<Arc<dyn Gateway>> {
    match config::data::MODE.as_str() {
        "file" => {
            let gateway = file::FileGateway::from_path(config::data::FILE.as_str())?;
            Ok(Arc::new(gateway))
        }
        "api" => {
            let gateway = rest::RestGateway::from_env()?;
            Ok(Arc::new(gateway))
        }
        other => Err(anyhow::anyhow!("DATA_MODE desconocido: {other} (esperaba \"api\" o \"file\")")),
    }
}
