//! Flat-file implementation of the gateway.
//!
//! Loads accounts and events from a JSON seed and keeps everything in
//! memory, applying the same rules the REST backend applies (Basic
//! credential check, binding marker, waitlist overflow, closed
//! inscriptions). Lets the bot run demos without a live backend, and
//! gives tests a gateway with real semantics.

use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::types::{
    EstadisticasCompletas, EstadoInscripcion, Evento, EventoNuevo, Inscripcion, InscripcionNueva, Participante, Role,
    Usuario,
};
use super::{Credencial, Gateway, GatewayError};

/// Seed document: accounts plus any pre-published events.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Datos {
    pub usuarios: Vec<Cuenta>,
    pub eventos: Vec<Evento>,
    pub inscripciones: Vec<Inscripcion>,
}

/// A seeded account: the public record plus its password.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cuenta {
    #[serde(flatten)]
    pub usuario: Usuario,
    pub contrasena: String,
}

struct Estado {
    cuentas: Vec<Cuenta>,
    eventos: Vec<Evento>,
    inscripciones: Vec<Inscripcion>,
    siguiente_evento: i64,
    siguiente_inscripcion: i64,
}

pub struct FileGateway {
    estado: RwLock<Estado>,
}

impl FileGateway {
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).with_context(|| format!("no se pudo leer {}", path.display()))?;
        let datos: Datos =
            serde_json::from_str(&raw).with_context(|| format!("JSON inválido en {}", path.display()))?;
        Ok(Self::from_datos(datos))
    }

    pub fn from_datos(datos: Datos) -> Self {
        let siguiente_evento = datos.eventos.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let siguiente_inscripcion = datos.inscripciones.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        Self {
            estado: RwLock::new(Estado {
                cuentas: datos.usuarios,
                eventos: datos.eventos,
                inscripciones: datos.inscripciones,
                siguiente_evento,
                siguiente_inscripcion,
            }),
        }
    }

    // Lock poisoning cannot corrupt this state (every mutation is a
    // single push or field write), so a poisoned guard is recovered.
    fn leer(&self) -> RwLockReadGuard<'_, Estado> {
        self.estado.read().unwrap_or_else(|e| e.into_inner())
    }

    fn escribir(&self) -> RwLockWriteGuard<'_, Estado> {
        self.estado.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn cuenta_por_credencial(estado: &Estado, cred: &Credencial) -> Result<Usuario, GatewayError> {
    let (nombre, contrasena) = cred.decode().ok_or(GatewayError::Unauthorized)?;
    estado
        .cuentas
        .iter()
        .find(|c| c.usuario.nombre_usuario == nombre && c.contrasena == contrasena)
        .map(|c| c.usuario.clone())
        .ok_or(GatewayError::Unauthorized)
}

fn nombre_de_actor(estado: &Estado, actor_id: i64) -> String {
    estado
        .cuentas
        .iter()
        .find(|c| c.usuario.actor_id == actor_id)
        .map(|c| c.usuario.nombre.clone())
        .unwrap_or_else(|| format!("participante {actor_id}"))
}

fn aceptadas_del_evento(estado: &Estado, evento_id: i64) -> u32 {
    estado
        .inscripciones
        .iter()
        .filter(|i| i.evento_id == evento_id && i.estado == EstadoInscripcion::Aceptada)
        .count() as u32
}

#[async_trait]
impl Gateway for FileGateway {
    async fn autenticar(&self, nombre_usuario: &str, contrasena: &str) -> Result<Usuario, GatewayError> {
        let estado = self.leer();
        estado
            .cuentas
            .iter()
            .find(|c| c.usuario.nombre_usuario == nombre_usuario && c.contrasena == contrasena)
            .map(|c| c.usuario.clone())
            .ok_or(GatewayError::Unauthorized)
    }

    async fn vincular_chat(&self, cred: &Credencial, chat_id: i64) -> Result<(), GatewayError> {
        let mut estado = self.escribir();
        let usuario = cuenta_por_credencial(&estado, cred)?;
        match usuario.chat_vinculado {
            Some(otro) if otro != chat_id => {
                return Err(GatewayError::api(
                    StatusCode::CONFLICT,
                    format!("la cuenta ya está vinculada al chat {otro}"),
                ))
            }
            _ => {}
        }
        if let Some(cuenta) = estado.cuentas.iter_mut().find(|c| c.usuario.id == usuario.id) {
            cuenta.usuario.chat_vinculado = Some(chat_id);
        }
        Ok(())
    }

    async fn desvincular_chat(&self, cred: &Credencial) -> Result<(), GatewayError> {
        let mut estado = self.escribir();
        let usuario = cuenta_por_credencial(&estado, cred)?;
        if let Some(cuenta) = estado.cuentas.iter_mut().find(|c| c.usuario.id == usuario.id) {
            cuenta.usuario.chat_vinculado = None;
        }
        Ok(())
    }

    async fn eventos(&self) -> Result<Vec<Evento>, GatewayError> {
        Ok(self.leer().eventos.clone())
    }

    async fn crear_evento(&self, cred: &Credencial, evento: EventoNuevo) -> Result<Evento, GatewayError> {
        let mut estado = self.escribir();
        let usuario = cuenta_por_credencial(&estado, cred)?;
        if !usuario.rol.at_least(Role::Organizer) {
            return Err(GatewayError::api(StatusCode::FORBIDDEN, "se requiere rol organizador"));
        }
        let id = estado.siguiente_evento;
        estado.siguiente_evento += 1;
        let creado = Evento {
            id,
            titulo: evento.titulo,
            descripcion: evento.descripcion,
            fecha_inicio: evento.fecha_inicio,
            duracion_horas: evento.duracion_horas,
            ubicacion: evento.ubicacion,
            capacidad_maxima: evento.capacidad_maxima,
            capacidad_minima: evento.capacidad_minima,
            precio: evento.precio,
            categoria: evento.categoria,
            etiquetas: evento.etiquetas,
            organizador_id: evento.organizador_id,
            inscripciones_abiertas: true,
        };
        estado.eventos.push(creado.clone());
        Ok(creado)
    }

    async fn inscripciones(
        &self,
        cred: &Credencial,
        actor_id: i64,
        estado_filtro: Option<EstadoInscripcion>,
    ) -> Result<Vec<Inscripcion>, GatewayError> {
        let estado = self.leer();
        cuenta_por_credencial(&estado, cred)?;
        Ok(estado
            .inscripciones
            .iter()
            .filter(|i| i.participante_id == actor_id)
            .filter(|i| estado_filtro.map_or(true, |f| i.estado == f))
            .cloned()
            .collect())
    }

    async fn crear_inscripcion(&self, cred: &Credencial, nueva: InscripcionNueva) -> Result<Inscripcion, GatewayError> {
        let mut estado = self.escribir();
        cuenta_por_credencial(&estado, cred)?;

        let evento = estado
            .eventos
            .iter()
            .find(|e| e.id == nueva.evento_id)
            .ok_or_else(|| GatewayError::api(StatusCode::NOT_FOUND, "evento no encontrado"))?;
        if !evento.inscripciones_abiertas {
            return Err(GatewayError::api(StatusCode::CONFLICT, "las inscripciones están cerradas"));
        }
        let capacidad = evento.capacidad_maxima;
        let evento_id = evento.id;

        let repetida = estado.inscripciones.iter().any(|i| {
            i.evento_id == evento_id && i.participante_id == nueva.participante_id && i.estado != EstadoInscripcion::Cancelada
        });
        if repetida {
            return Err(GatewayError::api(StatusCode::CONFLICT, "ya existe una inscripción para este evento"));
        }

        let estado_inscripcion = if aceptadas_del_evento(&estado, evento_id) >= capacidad {
            EstadoInscripcion::EnEspera
        } else {
            EstadoInscripcion::Aceptada
        };

        let id = estado.siguiente_inscripcion;
        estado.siguiente_inscripcion += 1;
        let inscripcion = Inscripcion {
            id,
            evento_id,
            participante_id: nueva.participante_id,
            estado: estado_inscripcion,
        };
        estado.inscripciones.push(inscripcion.clone());
        Ok(inscripcion)
    }

    async fn cancelar_inscripcion(&self, cred: &Credencial, id: i64) -> Result<(), GatewayError> {
        let mut estado = self.escribir();
        let usuario = cuenta_por_credencial(&estado, cred)?;

        let (evento_id, participante_id) = {
            let inscripcion = estado
                .inscripciones
                .iter()
                .find(|i| i.id == id)
                .ok_or_else(|| GatewayError::api(StatusCode::NOT_FOUND, "inscripción no encontrada"))?;
            (inscripcion.evento_id, inscripcion.participante_id)
        };
        if participante_id != usuario.actor_id && !usuario.rol.at_least(Role::Admin) {
            return Err(GatewayError::api(StatusCode::FORBIDDEN, "la inscripción pertenece a otro participante"));
        }

        let era_aceptada = estado
            .inscripciones
            .iter_mut()
            .find(|i| i.id == id)
            .map(|i| {
                let era = i.estado == EstadoInscripcion::Aceptada;
                i.estado = EstadoInscripcion::Cancelada;
                era
            })
            .unwrap_or(false);

        // A freed seat promotes the oldest waitlisted participant.
        if era_aceptada {
            if let Some(espera) = estado
                .inscripciones
                .iter_mut()
                .filter(|i| i.evento_id == evento_id && i.estado == EstadoInscripcion::EnEspera)
                .min_by_key(|i| i.id)
            {
                espera.estado = EstadoInscripcion::Aceptada;
            }
        }
        Ok(())
    }

    async fn cerrar_inscripciones(&self, cred: &Credencial, evento_id: i64) -> Result<Evento, GatewayError> {
        let mut estado = self.escribir();
        let usuario = cuenta_por_credencial(&estado, cred)?;
        if !usuario.rol.at_least(Role::Organizer) {
            return Err(GatewayError::api(StatusCode::FORBIDDEN, "se requiere rol organizador"));
        }
        let evento = estado
            .eventos
            .iter_mut()
            .find(|e| e.id == evento_id)
            .ok_or_else(|| GatewayError::api(StatusCode::NOT_FOUND, "evento no encontrado"))?;
        if evento.organizador_id != usuario.actor_id && !usuario.rol.at_least(Role::Admin) {
            return Err(GatewayError::api(StatusCode::FORBIDDEN, "el evento pertenece a otro organizador"));
        }
        evento.inscripciones_abiertas = false;
        Ok(evento.clone())
    }

    async fn participantes(&self, cred: &Credencial, evento_id: i64) -> Result<Vec<Participante>, GatewayError> {
        let estado = self.leer();
        cuenta_por_credencial(&estado, cred)?;
        Ok(estado
            .inscripciones
            .iter()
            .filter(|i| i.evento_id == evento_id && i.estado == EstadoInscripcion::Aceptada)
            .map(|i| Participante {
                id: i.participante_id,
                nombre: nombre_de_actor(&estado, i.participante_id),
            })
            .collect())
    }

    async fn lista_espera(&self, cred: &Credencial, evento_id: i64) -> Result<Vec<Participante>, GatewayError> {
        let estado = self.leer();
        cuenta_por_credencial(&estado, cred)?;
        Ok(estado
            .inscripciones
            .iter()
            .filter(|i| i.evento_id == evento_id && i.estado == EstadoInscripcion::EnEspera)
            .map(|i| Participante {
                id: i.participante_id,
                nombre: nombre_de_actor(&estado, i.participante_id),
            })
            .collect())
    }

    async fn estadisticas(&self, cred: &Credencial) -> Result<EstadisticasCompletas, GatewayError> {
        let estado = self.leer();
        let usuario = cuenta_por_credencial(&estado, cred)?;
        if !usuario.rol.at_least(Role::Admin) {
            return Err(GatewayError::api(StatusCode::FORBIDDEN, "se requiere rol administrador"));
        }
        Ok(EstadisticasCompletas {
            total_eventos: estado.eventos.len() as u64,
            eventos_activos: estado.eventos.iter().filter(|e| e.inscripciones_abiertas).count() as u64,
            total_inscripciones: estado
                .inscripciones
                .iter()
                .filter(|i| i.estado != EstadoInscripcion::Cancelada)
                .count() as u64,
            inscripciones_en_espera: estado
                .inscripciones
                .iter()
                .filter(|i| i.estado == EstadoInscripcion::EnEspera)
                .count() as u64,
            total_usuarios: estado.cuentas.len() as u64,
        })
    }
}
