//! Shared fixtures for the integration tests: a small in-memory platform
//! with one user of each role and room for events.

#![allow(dead_code)]

use std::sync::Arc;

use quedacore::gateway::file::{Cuenta, Datos, FileGateway};
use quedacore::gateway::types::{Evento, Precio, Role, Ubicacion, Usuario};
use quedacore::Gateway;

pub const CONTRASENA: &str = "clave";

pub fn cuenta(id: i64, nombre_usuario: &str, rol: Role) -> Cuenta {
    Cuenta {
        usuario: Usuario {
            id,
            nombre_usuario: nombre_usuario.to_string(),
            nombre: format!("Nombre {nombre_usuario}"),
            rol,
            actor_id: 100 + id,
            chat_vinculado: None,
        },
        contrasena: CONTRASENA.to_string(),
    }
}

pub fn evento(id: i64, capacidad_maxima: u32, organizador_id: i64) -> Evento {
    Evento {
        id,
        titulo: format!("Evento {id}"),
        descripcion: "una quedada".to_string(),
        fecha_inicio: chrono::NaiveDate::from_ymd_opt(2099, 6, 1)
            .and_then(|d| d.and_hms_opt(19, 0, 0))
            .expect("valid fixture date"),
        duracion_horas: 1.5,
        ubicacion: Ubicacion {
            es_virtual: false,
            enlace_virtual: None,
            direccion: Some("Calle Mayor 1".to_string()),
            localidad: Some("Madrid".to_string()),
        },
        capacidad_maxima,
        capacidad_minima: 0,
        precio: Precio {
            es_gratis: true,
            moneda: "EUR".to_string(),
            cantidad: 0.0,
        },
        categoria: "social".to_string(),
        etiquetas: vec![],
        organizador_id,
        inscripciones_abiertas: true,
    }
}

/// ana (USER), carla (ORGANIZER), dario (ADMIN), plus one open event
/// organized by carla. All passwords are [`CONTRASENA`].
pub fn plataforma() -> Arc<FileGateway> {
    let datos = Datos {
        usuarios: vec![
            cuenta(1, "ana", Role::User),
            cuenta(2, "carla", Role::Organizer),
            cuenta(3, "dario", Role::Admin),
        ],
        eventos: vec![evento(1, 10, 102)],
        inscripciones: vec![],
    };
    Arc::new(FileGateway::from_datos(datos))
}

pub fn como_gateway(plataforma: &Arc<FileGateway>) -> Arc<dyn Gateway> {
    Arc::clone(plataforma) as Arc<dyn Gateway>
}
