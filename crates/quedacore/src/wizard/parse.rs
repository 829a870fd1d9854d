//! Field validation for the publication wizard.
//!
//! One function per step. Each takes the raw reply text and either returns
//! the typed value or a [`FieldError`] whose `Display` is the re-prompt
//! shown to the user, format examples included.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::gateway::types::{Precio, Ubicacion};

/// Validation failure for a single wizard step. The message is what the
/// user reads, so it carries the expected format.
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("El título no puede estar vacío. Escribe el nombre del evento.")]
    TituloVacio,
    #[error("No reconozco esa fecha. Usa el formato AAAA-MM-DD, por ejemplo 2025-06-01.")]
    FechaInvalida,
    #[error("No reconozco esa hora. Usa el formato HH:MM de 24 horas, por ejemplo 18:30.")]
    HoraInvalida,
    #[error("La duración debe ser un número de horas mayor que cero, por ejemplo 1.5")]
    DuracionInvalida,
    #[error("La capacidad máxima debe ser un número entero mayor que cero, por ejemplo 50.")]
    CapacidadInvalida,
    #[error("No entiendo ese precio. Escribe GRATIS, una cantidad como 10, o moneda y cantidad como \"EUR 12.50\".")]
    PrecioInvalido,
}

/// Step 1: any non-empty text.
pub fn titulo(texto: &str) -> Result<String, FieldError> {
    let titulo = texto.trim();
    if titulo.is_empty() {
        return Err(FieldError::TituloVacio);
    }
    Ok(titulo.to_string())
}

/// Step 2: anything goes, even the empty string.
pub fn descripcion(texto: &str) -> String {
    texto.trim().to_string()
}

/// Step 3: a real calendar date, `YYYY-MM-DD`.
pub fn fecha(texto: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(texto.trim(), "%Y-%m-%d").map_err(|_| FieldError::FechaInvalida)
}

/// Step 4: 24h `HH:MM`.
pub fn hora(texto: &str) -> Result<NaiveTime, FieldError> {
    NaiveTime::parse_from_str(texto.trim(), "%H:%M").map_err(|_| FieldError::HoraInvalida)
}

/// Step 5: duration in hours, strictly positive. A decimal comma is
/// accepted ("1,5" reads as 1.5).
pub fn duracion(texto: &str) -> Result<f64, FieldError> {
    let horas: f64 = numero(texto).ok_or(FieldError::DuracionInvalida)?;
    if horas <= 0.0 {
        return Err(FieldError::DuracionInvalida);
    }
    Ok(horas)
}

/// Step 6: never fails. Anything starting with `http` or `www` is a
/// virtual location; the rest is a physical address, split on the first
/// comma into street address and locality.
pub fn ubicacion(texto: &str) -> Ubicacion {
    let texto = texto.trim();
    let minusculas = texto.to_lowercase();
    if minusculas.starts_with("http") || minusculas.starts_with("www") {
        return Ubicacion {
            es_virtual: true,
            enlace_virtual: Some(texto.to_string()),
            direccion: None,
            localidad: None,
        };
    }
    let (direccion, localidad) = match texto.split_once(',') {
        Some((calle, resto)) => (calle.trim().to_string(), Some(resto.trim().to_string())),
        None => (texto.to_string(), None),
    };
    Ubicacion {
        es_virtual: false,
        enlace_virtual: None,
        direccion: Some(direccion),
        localidad: localidad.filter(|l| !l.is_empty()),
    }
}

/// Step 7: positive integer, strict.
pub fn capacidad_maxima(texto: &str) -> Result<u32, FieldError> {
    match texto.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(FieldError::CapacidadInvalida),
    }
}

/// Step 8: integer >= 0, lenient. Anything unparsable falls back to 0.
pub fn capacidad_minima(texto: &str) -> u32 {
    texto.trim().parse::<u32>().unwrap_or(0)
}

/// Step 9: `GRATIS`/`FREE`/`0` for a free event, `<MONEDA> <CANTIDAD>`,
/// or a bare amount priced in `moneda_defecto`. An amount of zero always
/// reads as free.
pub fn precio(texto: &str, moneda_defecto: &str) -> Result<Precio, FieldError> {
    let texto = texto.trim();
    if texto.eq_ignore_ascii_case("gratis") || texto.eq_ignore_ascii_case("free") {
        return Ok(gratis(moneda_defecto));
    }

    let piezas: Vec<&str> = texto.split_whitespace().collect();
    let (moneda, cantidad) = match piezas.as_slice() {
        [solo] => {
            let cantidad = numero(solo).ok_or(FieldError::PrecioInvalido)?;
            (moneda_defecto.to_string(), cantidad)
        }
        [moneda, cantidad] => {
            if !moneda.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(FieldError::PrecioInvalido);
            }
            let cantidad = numero(cantidad).ok_or(FieldError::PrecioInvalido)?;
            (moneda.to_uppercase(), cantidad)
        }
        _ => return Err(FieldError::PrecioInvalido),
    };
    if cantidad < 0.0 {
        return Err(FieldError::PrecioInvalido);
    }
    if cantidad == 0.0 {
        return Ok(gratis(moneda_defecto));
    }
    Ok(Precio {
        es_gratis: false,
        moneda,
        cantidad,
    })
}

/// Step 11: comma-separated tags, or a single dash for none.
pub fn etiquetas(texto: &str) -> Vec<String> {
    let texto = texto.trim();
    if texto == "-" {
        return Vec::new();
    }
    texto
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn gratis(moneda_defecto: &str) -> Precio {
    Precio {
        es_gratis: true,
        moneda: moneda_defecto.to_string(),
        cantidad: 0.0,
    }
}

fn numero(texto: &str) -> Option<f64> {
    texto.trim().replace(',', ".").parse::<f64>().ok().filter(|n| n.is_finite())
}
