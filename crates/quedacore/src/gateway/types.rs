//! Wire types for the event platform's REST API.
//!
//! Field names mirror the backend's JSON (Spanish, camelCase). The same
//! structs back both data-source modes, so the file gateway serves and
//! accepts exactly what the REST backend would.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Account role as the backend reports it.
///
/// Ordering is the authorization hierarchy: `Admin > Organizer > User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "USUARIO")]
    User,
    #[serde(rename = "ORGANIZADOR")]
    Organizer,
    #[serde(rename = "ADMINISTRADOR")]
    Admin,
}

impl Role {
    /// True when this role satisfies `required` under the hierarchy.
    pub fn at_least(self, required: Role) -> bool {
        self >= required
    }

    /// Human-readable Spanish label for replies.
    pub fn etiqueta(self) -> &'static str {
        match self {
            Role::User => "usuario",
            Role::Organizer => "organizador",
            Role::Admin => "administrador",
        }
    }
}

/// Backend user record returned by `POST /login`.
///
/// `chat_vinculado` is the durable binding marker behind cross-device
/// exclusivity: the chat currently owning this account, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: i64,
    pub nombre_usuario: String,
    pub nombre: String,
    pub rol: Role,
    /// Participant/organizer domain id, distinct from the login id.
    pub actor_id: i64,
    #[serde(default)]
    pub chat_vinculado: Option<i64>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credenciales {
    pub nombre_usuario: String,
    pub contrasena: String,
}

/// Body for `PUT /user`: rebinds (or releases, with `None`) the chat
/// marker on the authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VinculoChat {
    pub chat_vinculado: Option<i64>,
}

/// Where an event happens: a meeting link or a street address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ubicacion {
    pub es_virtual: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enlace_virtual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localidad: Option<String>,
}

/// Event price. Free events carry amount 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Precio {
    pub es_gratis: bool,
    pub moneda: String,
    pub cantidad: f64,
}

/// A published event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evento {
    pub id: i64,
    pub titulo: String,
    pub descripcion: String,
    pub fecha_inicio: NaiveDateTime,
    pub duracion_horas: f64,
    pub ubicacion: Ubicacion,
    pub capacidad_maxima: u32,
    pub capacidad_minima: u32,
    pub precio: Precio,
    pub categoria: String,
    #[serde(default)]
    pub etiquetas: Vec<String>,
    pub organizador_id: i64,
    #[serde(default = "abiertas_por_defecto")]
    pub inscripciones_abiertas: bool,
}

fn abiertas_por_defecto() -> bool {
    true
}

/// Creation payload for `POST /eventos`; the backend assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventoNuevo {
    pub titulo: String,
    pub descripcion: String,
    pub fecha_inicio: NaiveDateTime,
    pub duracion_horas: f64,
    pub ubicacion: Ubicacion,
    pub capacidad_maxima: u32,
    pub capacidad_minima: u32,
    pub precio: Precio,
    pub categoria: String,
    pub etiquetas: Vec<String>,
    pub organizador_id: i64,
}

/// Inscription state. Waitlisted entries hold `EnEspera` until a seat
/// frees up; cancelled entries are kept for the organizer's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EstadoInscripcion {
    Aceptada,
    EnEspera,
    Cancelada,
}

/// One participant's inscription into one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inscripcion {
    pub id: i64,
    pub evento_id: i64,
    pub participante_id: i64,
    pub estado: EstadoInscripcion,
}

/// Creation payload for `POST /inscripciones`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InscripcionNueva {
    pub evento_id: i64,
    pub participante_id: i64,
}

/// An attendee (or waitlisted participant) as listed per event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participante {
    pub id: i64,
    pub nombre: String,
}

/// Platform-wide statistics from `GET /estadisticas/completas`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstadisticasCompletas {
    pub total_eventos: u64,
    pub eventos_activos: u64,
    pub total_inscripciones: u64,
    pub inscripciones_en_espera: u64,
    pub total_usuarios: u64,
}
