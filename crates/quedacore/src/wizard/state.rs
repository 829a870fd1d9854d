//! The publication wizard's state machine.
//!
//! One enum variant per step, each carrying exactly the fields validated so
//! far. A reply either moves the machine one variant forward or leaves it
//! where it is with a [`FieldError`]; no partially-valid field ever exists.

use chrono::{NaiveDate, NaiveTime};

use super::parse::{self, FieldError};
use crate::gateway::types::{EventoNuevo, Precio, Ubicacion};

/// Where a chat's wizard currently stands. The variant names the field
/// being asked for.
#[derive(Debug, Clone)]
pub enum WizardState {
    Titulo,
    Descripcion {
        titulo: String,
    },
    Fecha {
        titulo: String,
        descripcion: String,
    },
    Hora {
        titulo: String,
        descripcion: String,
        fecha: NaiveDate,
    },
    Duracion {
        titulo: String,
        descripcion: String,
        fecha: NaiveDate,
        hora: NaiveTime,
    },
    Ubicacion {
        titulo: String,
        descripcion: String,
        fecha: NaiveDate,
        hora: NaiveTime,
        duracion_horas: f64,
    },
    CapacidadMaxima {
        titulo: String,
        descripcion: String,
        fecha: NaiveDate,
        hora: NaiveTime,
        duracion_horas: f64,
        ubicacion: Ubicacion,
    },
    CapacidadMinima {
        titulo: String,
        descripcion: String,
        fecha: NaiveDate,
        hora: NaiveTime,
        duracion_horas: f64,
        ubicacion: Ubicacion,
        capacidad_maxima: u32,
    },
    Precio {
        titulo: String,
        descripcion: String,
        fecha: NaiveDate,
        hora: NaiveTime,
        duracion_horas: f64,
        ubicacion: Ubicacion,
        capacidad_maxima: u32,
        capacidad_minima: u32,
    },
    Categoria {
        titulo: String,
        descripcion: String,
        fecha: NaiveDate,
        hora: NaiveTime,
        duracion_horas: f64,
        ubicacion: Ubicacion,
        capacidad_maxima: u32,
        capacidad_minima: u32,
        precio: Precio,
    },
    Etiquetas {
        titulo: String,
        descripcion: String,
        fecha: NaiveDate,
        hora: NaiveTime,
        duracion_horas: f64,
        ubicacion: Ubicacion,
        capacidad_maxima: u32,
        capacidad_minima: u32,
        precio: Precio,
        categoria: String,
    },
    /// Every field collected; waiting for the confirm/cancel buttons.
    Confirmacion {
        borrador: EventDraft,
    },
}

impl WizardState {
    pub fn nuevo() -> Self {
        WizardState::Titulo
    }

    /// 1-based step number, 12 being the confirmation.
    pub fn paso(&self) -> u8 {
        match self {
            WizardState::Titulo => 1,
            WizardState::Descripcion { .. } => 2,
            WizardState::Fecha { .. } => 3,
            WizardState::Hora { .. } => 4,
            WizardState::Duracion { .. } => 5,
            WizardState::Ubicacion { .. } => 6,
            WizardState::CapacidadMaxima { .. } => 7,
            WizardState::CapacidadMinima { .. } => 8,
            WizardState::Precio { .. } => 9,
            WizardState::Categoria { .. } => 10,
            WizardState::Etiquetas { .. } => 11,
            WizardState::Confirmacion { .. } => 12,
        }
    }

    /// The question the user should be answering right now.
    pub fn pregunta(&self) -> String {
        let texto = match self {
            WizardState::Titulo => "📌 ¿Cómo se titula el evento?",
            WizardState::Descripcion { .. } => "📝 Escribe una breve descripción.",
            WizardState::Fecha { .. } => "📅 ¿Qué día se celebra? Formato AAAA-MM-DD, por ejemplo 2025-06-01.",
            WizardState::Hora { .. } => "🕐 ¿A qué hora empieza? Formato HH:MM de 24 horas, por ejemplo 18:30.",
            WizardState::Duracion { .. } => "⏱ ¿Cuántas horas dura? Por ejemplo 1.5",
            WizardState::Ubicacion { .. } => {
                "📍 ¿Dónde se celebra? Pega el enlace si es virtual, o escribe la dirección (calle, localidad)."
            }
            WizardState::CapacidadMaxima { .. } => "👥 ¿Cuántas plazas hay como máximo?",
            WizardState::CapacidadMinima { .. } => "👥 ¿Cuántos asistentes necesita como mínimo? (0 si da igual)",
            WizardState::Precio { .. } => {
                "💰 ¿Cuánto cuesta? Escribe GRATIS, una cantidad, o moneda y cantidad como \"EUR 12.50\"."
            }
            WizardState::Categoria { .. } => "🏷 ¿En qué categoría encaja? Por ejemplo tecnología, deporte, música.",
            WizardState::Etiquetas { .. } => "🔖 Etiquetas separadas por comas, o un guion (-) si no quieres ninguna.",
            WizardState::Confirmacion { borrador } => return borrador.resumen(),
        };
        format!("Paso {} de 11\n{}", self.paso(), texto)
    }

    /// Feeds one reply into the machine. On success the state advances;
    /// on a validation error it stays put and the error carries the
    /// re-prompt.
    pub fn aplicar(&mut self, texto: &str, moneda_defecto: &str) -> Result<(), FieldError> {
        let actual = std::mem::replace(self, WizardState::Titulo);
        match Self::transicion(actual, texto, moneda_defecto) {
            Ok(siguiente) => {
                *self = siguiente;
                Ok(())
            }
            Err((mismo, error)) => {
                *self = mismo;
                Err(error)
            }
        }
    }

    pub fn listo_para_confirmar(&self) -> bool {
        matches!(self, WizardState::Confirmacion { .. })
    }

    fn transicion(estado: Self, texto: &str, moneda_defecto: &str) -> Result<Self, (Self, FieldError)> {
        match estado {
            WizardState::Titulo => match parse::titulo(texto) {
                Ok(titulo) => Ok(WizardState::Descripcion { titulo }),
                Err(e) => Err((WizardState::Titulo, e)),
            },
            WizardState::Descripcion { titulo } => Ok(WizardState::Fecha {
                titulo,
                descripcion: parse::descripcion(texto),
            }),
            WizardState::Fecha { titulo, descripcion } => match parse::fecha(texto) {
                Ok(fecha) => Ok(WizardState::Hora {
                    titulo,
                    descripcion,
                    fecha,
                }),
                Err(e) => Err((WizardState::Fecha { titulo, descripcion }, e)),
            },
            WizardState::Hora {
                titulo,
                descripcion,
                fecha,
            } => match parse::hora(texto) {
                Ok(hora) => Ok(WizardState::Duracion {
                    titulo,
                    descripcion,
                    fecha,
                    hora,
                }),
                Err(e) => Err((
                    WizardState::Hora {
                        titulo,
                        descripcion,
                        fecha,
                    },
                    e,
                )),
            },
            WizardState::Duracion {
                titulo,
                descripcion,
                fecha,
                hora,
            } => match parse::duracion(texto) {
                Ok(duracion_horas) => Ok(WizardState::Ubicacion {
                    titulo,
                    descripcion,
                    fecha,
                    hora,
                    duracion_horas,
                }),
                Err(e) => Err((
                    WizardState::Duracion {
                        titulo,
                        descripcion,
                        fecha,
                        hora,
                    },
                    e,
                )),
            },
            WizardState::Ubicacion {
                titulo,
                descripcion,
                fecha,
                hora,
                duracion_horas,
            } => Ok(WizardState::CapacidadMaxima {
                titulo,
                descripcion,
                fecha,
                hora,
                duracion_horas,
                ubicacion: parse::ubicacion(texto),
            }),
            WizardState::CapacidadMaxima {
                titulo,
                descripcion,
                fecha,
                hora,
                duracion_horas,
                ubicacion,
            } => match parse::capacidad_maxima(texto) {
                Ok(capacidad_maxima) => Ok(WizardState::CapacidadMinima {
                    titulo,
                    descripcion,
                    fecha,
                    hora,
                    duracion_horas,
                    ubicacion,
                    capacidad_maxima,
                }),
                Err(e) => Err((
                    WizardState::CapacidadMaxima {
                        titulo,
                        descripcion,
                        fecha,
                        hora,
                        duracion_horas,
                        ubicacion,
                    },
                    e,
                )),
            },
            WizardState::CapacidadMinima {
                titulo,
                descripcion,
                fecha,
                hora,
                duracion_horas,
                ubicacion,
                capacidad_maxima,
            } => Ok(WizardState::Precio {
                titulo,
                descripcion,
                fecha,
                hora,
                duracion_horas,
                ubicacion,
                capacidad_maxima,
                capacidad_minima: parse::capacidad_minima(texto),
            }),
            WizardState::Precio {
                titulo,
                descripcion,
                fecha,
                hora,
                duracion_horas,
                ubicacion,
                capacidad_maxima,
                capacidad_minima,
            } => match parse::precio(texto, moneda_defecto) {
                Ok(precio) => Ok(WizardState::Categoria {
                    titulo,
                    descripcion,
                    fecha,
                    hora,
                    duracion_horas,
                    ubicacion,
                    capacidad_maxima,
                    capacidad_minima,
                    precio,
                }),
                Err(e) => Err((
                    WizardState::Precio {
                        titulo,
                        descripcion,
                        fecha,
                        hora,
                        duracion_horas,
                        ubicacion,
                        capacidad_maxima,
                        capacidad_minima,
                    },
                    e,
                )),
            },
            WizardState::Categoria {
                titulo,
                descripcion,
                fecha,
                hora,
                duracion_horas,
                ubicacion,
                capacidad_maxima,
                capacidad_minima,
                precio,
            } => Ok(WizardState::Etiquetas {
                titulo,
                descripcion,
                fecha,
                hora,
                duracion_horas,
                ubicacion,
                capacidad_maxima,
                capacidad_minima,
                precio,
                categoria: texto.trim().to_string(),
            }),
            WizardState::Etiquetas {
                titulo,
                descripcion,
                fecha,
                hora,
                duracion_horas,
                ubicacion,
                capacidad_maxima,
                capacidad_minima,
                precio,
                categoria,
            } => Ok(WizardState::Confirmacion {
                borrador: EventDraft {
                    titulo,
                    descripcion,
                    fecha,
                    hora,
                    duracion_horas,
                    ubicacion,
                    capacidad_maxima,
                    capacidad_minima,
                    precio,
                    categoria,
                    etiquetas: parse::etiquetas(texto),
                },
            }),
            // Text at the confirmation step changes nothing; the caller
            // re-shows the summary with the buttons.
            confirmacion @ WizardState::Confirmacion { .. } => Ok(confirmacion),
        }
    }
}

/// A fully-collected event waiting for confirmation. Immutable once built;
/// submission consumes it.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub titulo: String,
    pub descripcion: String,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub duracion_horas: f64,
    pub ubicacion: Ubicacion,
    pub capacidad_maxima: u32,
    pub capacidad_minima: u32,
    pub precio: Precio,
    pub categoria: String,
    pub etiquetas: Vec<String>,
}

impl EventDraft {
    /// The confirmation summary, one line per answer.
    pub fn resumen(&self) -> String {
        let ubicacion = if self.ubicacion.es_virtual {
            format!("{} (virtual)", self.ubicacion.enlace_virtual.as_deref().unwrap_or("-"))
        } else {
            match (&self.ubicacion.direccion, &self.ubicacion.localidad) {
                (Some(direccion), Some(localidad)) => format!("{direccion}, {localidad}"),
                (Some(direccion), None) => direccion.clone(),
                _ => "-".to_string(),
            }
        };
        let precio = if self.precio.es_gratis {
            "GRATIS".to_string()
        } else {
            format!("{} {}", self.precio.cantidad, self.precio.moneda)
        };
        let etiquetas = if self.etiquetas.is_empty() {
            "-".to_string()
        } else {
            self.etiquetas.join(", ")
        };
        format!(
            "📋 Así quedará el evento:\n\n\
             📌 Título: {}\n\
             📝 Descripción: {}\n\
             📅 Comienzo: {} a las {}\n\
             ⏱ Duración: {} h\n\
             📍 Ubicación: {}\n\
             👥 Plazas: {} (mínimo {})\n\
             💰 Precio: {}\n\
             🏷 Categoría: {}\n\
             🔖 Etiquetas: {}\n\n\
             ¿Lo publico?",
            self.titulo,
            if self.descripcion.is_empty() { "-" } else { self.descripcion.as_str() },
            self.fecha.format("%d/%m/%Y"),
            self.hora.format("%H:%M"),
            self.duracion_horas,
            ubicacion,
            self.capacidad_maxima,
            self.capacidad_minima,
            precio,
            self.categoria,
            etiquetas,
        )
    }

    /// Assembles the creation payload, stamping the organizer in.
    pub fn into_payload(self, organizador_id: i64) -> EventoNuevo {
        EventoNuevo {
            titulo: self.titulo,
            descripcion: self.descripcion,
            fecha_inicio: self.fecha.and_time(self.hora),
            duracion_horas: self.duracion_horas,
            ubicacion: self.ubicacion,
            capacidad_maxima: self.capacidad_maxima,
            capacidad_minima: self.capacidad_minima,
            precio: self.precio,
            categoria: self.categoria,
            etiquetas: self.etiquetas,
            organizador_id,
        }
    }
}
