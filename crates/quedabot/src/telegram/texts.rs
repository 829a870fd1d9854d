//! Every reply the bot sends, in one place.
//!
//! Handlers stay free of string literals so the wording can be reviewed
//! (and tested) without chasing it through the dispatcher.

use quedacore::gateway::types::{EstadisticasCompletas, EstadoInscripcion, Evento, Inscripcion, Participante, Role};
use quedacore::Session;

pub const DEBES_INICIAR_SESION: &str = "🔐 Primero inicia sesión: envía /login y te pediré tus credenciales.";

pub const NO_ENTIENDO: &str = "No te he entendido. Escribe /ayuda para ver lo que puedo hacer.";

pub const DISCULPA_BACKEND: &str = "😔 No he podido hablar con la plataforma. Inténtalo de nuevo en un momento.";

pub const PIDE_CREDENCIALES: &str =
    "Envíame tus credenciales en un solo mensaje con el formato usuario:contraseña\n\
     El mensaje se borrará en cuanto lo procese.";

pub const CREDENCIALES_INCORRECTAS: &str = "❌ Usuario o contraseña incorrectos. Prueba otra vez con /login.";

pub const SESION_EN_OTRO_CHAT: &str =
    "⚠️ Esa cuenta ya tiene una sesión abierta en otro chat. Ciérrala allí con /logout y vuelve a intentarlo.";

pub const SESION_CERRADA: &str = "👋 Sesión cerrada. Hasta pronto.";

pub const SESION_CADUCADA: &str =
    "⌛ Tu sesión ya no es válida en la plataforma. Entra de nuevo con /login.";

pub const SIN_SESION_QUE_CERRAR: &str = "No habías iniciado sesión.";

pub const PUBLICACION_CANCELADA: &str = "🗑 Publicación cancelada. Cuando quieras, /publicar_evento empieza otra.";

pub const SIN_PUBLICACION_EN_CURSO: &str = "No hay ninguna publicación en curso.";

pub const PUBLICACION_YA_EN_CURSO: &str =
    "Ya tienes una publicación a medias. Termínala, o descártala con /cancelar antes de empezar otra.";

pub fn publicacion_iniciada(pregunta: &str) -> String {
    format!(
        "🪄 Vamos a publicar un evento. Te haré once preguntas; responde a cada una en un mensaje. \
         Puedes salir en cualquier momento con /cancelar.\n\n{pregunta}"
    )
}

pub const CONFIRMACION_PENDIENTE: &str = "Todavía quedan pasos por completar.";

pub const USO_MIS_INSCRIPCIONES: &str =
    "Uso: /mis_inscripciones [estado]\nEstados: aceptada, en_espera, cancelada. Sin estado las muestro todas.";

pub const USO_INSCRIBIRME: &str = "Uso: /inscribirme <id del evento>\nLos ids salen en /eventos.";

pub const USO_CANCELAR_INSCRIPCION: &str =
    "Uso: /cancelar_inscripcion <id de la inscripción>\nLos ids salen en /mis_inscripciones.";

pub const USO_PARTICIPANTES: &str = "Uso: /participantes <id del evento>";

pub const USO_LISTA_ESPERA: &str = "Uso: /lista_espera <id del evento>";

pub const USO_CERRAR_INSCRIPCIONES: &str = "Uso: /cerrar_inscripciones <id del evento>";

pub fn bienvenida() -> String {
    "¡Hola! 👋 Soy el bot de Quedada.\n\n\
     Puedo enseñarte los eventos publicados, apuntarte a ellos y, si eres organizador, \
     ayudarte a publicar los tuyos paso a paso.\n\n\
     Empieza con /eventos para curiosear, o /login para entrar con tu cuenta. \
     Con /ayuda tienes la lista completa de comandos."
        .to_string()
}

pub fn ayuda() -> String {
    "Esto es lo que sé hacer:\n\n\
     Para todo el mundo\n\
     /start - saludo y primeros pasos\n\
     /eventos - lista los eventos publicados\n\
     /login - inicia sesión en la plataforma\n\
     /ayuda - esta ayuda\n\n\
     Con sesión iniciada\n\
     /mis_inscripciones [estado] - tus inscripciones\n\
     /inscribirme <id> - apúntate a un evento\n\
     /cancelar_inscripcion <id> - cancela una inscripción\n\
     /logout - cierra la sesión\n\n\
     Para organizadores\n\
     /publicar_evento - publica un evento paso a paso\n\
     /cancelar - descarta la publicación en curso\n\
     /participantes <id> - participantes aceptados de tu evento\n\
     /lista_espera <id> - lista de espera de tu evento\n\
     /cerrar_inscripciones <id> - cierra las inscripciones\n\n\
     Para administradores\n\
     /estadisticas - estadísticas de la plataforma"
        .to_string()
}

pub fn solo_para(rol: Role) -> String {
    match rol {
        Role::Admin => "⛔ Ese comando es solo para administradores.".to_string(),
        Role::Organizer => "⛔ Ese comando es solo para organizadores.".to_string(),
        Role::User => "⛔ Ese comando requiere una cuenta de la plataforma.".to_string(),
    }
}

pub fn sesion_iniciada(sesion: &Session) -> String {
    format!(
        "✅ ¡Hola, {}! Has iniciado sesión como {}.",
        sesion.nombre,
        sesion.rol.etiqueta()
    )
}

pub fn ya_con_sesion(sesion: &Session) -> String {
    format!(
        "Ya tienes la sesión iniciada como {} ({}). Si quieres cambiar de cuenta, \
         envíame las credenciales nuevas con el formato usuario:contraseña",
        sesion.nombre,
        sesion.rol.etiqueta()
    )
}

fn linea_evento(evento: &Evento) -> String {
    let donde = if evento.ubicacion.es_virtual {
        "💻 virtual".to_string()
    } else {
        match &evento.ubicacion.localidad {
            Some(localidad) => format!("📍 {localidad}"),
            None => "📍 presencial".to_string(),
        }
    };
    let precio = if evento.precio.es_gratis {
        "gratis".to_string()
    } else {
        format!("{} {}", evento.precio.cantidad, evento.precio.moneda)
    };
    let cierre = if evento.inscripciones_abiertas { "" } else { " · inscripciones cerradas" };
    format!(
        "#{} {}\n    {} · {} · {}{}",
        evento.id,
        evento.titulo,
        evento.fecha_inicio.format("%d/%m/%Y %H:%M"),
        donde,
        precio,
        cierre,
    )
}

pub fn lista_eventos(eventos: &[Evento]) -> String {
    if eventos.is_empty() {
        return "No hay eventos publicados todavía.".to_string();
    }
    let lineas: Vec<String> = eventos.iter().map(linea_evento).collect();
    format!(
        "📅 Eventos publicados:\n\n{}\n\nApúntate con /inscribirme <id>.",
        lineas.join("\n")
    )
}

pub fn estado_etiqueta(estado: EstadoInscripcion) -> &'static str {
    match estado {
        EstadoInscripcion::Aceptada => "aceptada",
        EstadoInscripcion::EnEspera => "en espera",
        EstadoInscripcion::Cancelada => "cancelada",
    }
}

pub fn lista_inscripciones(inscripciones: &[Inscripcion], filtro: Option<EstadoInscripcion>) -> String {
    if inscripciones.is_empty() {
        return match filtro {
            Some(estado) => format!("No tienes inscripciones con estado \"{}\".", estado_etiqueta(estado)),
            None => "No tienes ninguna inscripción. Mira /eventos y apúntate a algo.".to_string(),
        };
    }
    let lineas: Vec<String> = inscripciones
        .iter()
        .map(|i| format!("#{} evento {} · {}", i.id, i.evento_id, estado_etiqueta(i.estado)))
        .collect();
    format!(
        "🎟 Tus inscripciones:\n\n{}\n\nCancela con /cancelar_inscripcion <id>.",
        lineas.join("\n")
    )
}

pub fn inscripcion_creada(inscripcion: &Inscripcion) -> String {
    match inscripcion.estado {
        EstadoInscripcion::Aceptada => format!(
            "🎉 ¡Dentro! Inscripción #{} aceptada para el evento {}.",
            inscripcion.id, inscripcion.evento_id
        ),
        EstadoInscripcion::EnEspera => format!(
            "⏳ El evento {} está completo; quedas en lista de espera (inscripción #{}). \
             Si alguien cancela, entras automáticamente.",
            inscripcion.evento_id, inscripcion.id
        ),
        EstadoInscripcion::Cancelada => format!(
            "Inscripción #{} registrada como cancelada.",
            inscripcion.id
        ),
    }
}

pub fn inscripcion_cancelada(id: i64) -> String {
    format!("🗑 Inscripción #{id} cancelada. Si había lista de espera, la primera persona ocupa tu plaza.")
}

pub fn lista_participantes(evento_id: i64, participantes: &[Participante]) -> String {
    if participantes.is_empty() {
        return format!("El evento {evento_id} no tiene participantes aceptados todavía.");
    }
    let lineas: Vec<String> = participantes.iter().map(|p| format!("• {} (#{})", p.nombre, p.id)).collect();
    format!(
        "👥 Participantes aceptados del evento {} ({}):\n{}",
        evento_id,
        participantes.len(),
        lineas.join("\n")
    )
}

pub fn lista_espera(evento_id: i64, participantes: &[Participante]) -> String {
    if participantes.is_empty() {
        return format!("El evento {evento_id} no tiene lista de espera.");
    }
    let lineas: Vec<String> = participantes.iter().map(|p| format!("• {} (#{})", p.nombre, p.id)).collect();
    format!(
        "⏳ Lista de espera del evento {} ({}):\n{}",
        evento_id,
        participantes.len(),
        lineas.join("\n")
    )
}

pub fn inscripciones_cerradas(evento: &Evento) -> String {
    format!("🔒 Inscripciones cerradas para \"{}\" (evento {}).", evento.titulo, evento.id)
}

pub fn estadisticas(est: &EstadisticasCompletas) -> String {
    format!(
        "📊 Estadísticas de la plataforma\n\n\
         Eventos: {} ({} activos)\n\
         Inscripciones: {} ({} en espera)\n\
         Usuarios: {}",
        est.total_eventos, est.eventos_activos, est.total_inscripciones, est.inscripciones_en_espera, est.total_usuarios,
    )
}

pub fn evento_publicado(evento: &Evento) -> String {
    format!(
        "🎉 ¡Publicado! \"{}\" ya está visible como evento {}.\n\
         Los asistentes pueden apuntarse con /inscribirme {}.",
        evento.titulo, evento.id, evento.id
    )
}

pub fn publicacion_fallida(motivo: &str) -> String {
    format!(
        "❌ No se pudo publicar el evento: {motivo}\n\
         El borrador se ha descartado; /publicar_evento empieza uno nuevo."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use quedacore::gateway::types::{Precio, Ubicacion};

    fn evento(id: i64, abiertas: bool) -> Evento {
        Evento {
            id,
            titulo: format!("Evento {id}"),
            descripcion: "d".to_string(),
            fecha_inicio: chrono::NaiveDate::from_ymd_opt(2099, 1, 1)
                .and_then(|d| d.and_hms_opt(18, 0, 0))
                .unwrap(),
            duracion_horas: 2.0,
            ubicacion: Ubicacion {
                es_virtual: true,
                enlace_virtual: Some("https://meet.example/x".to_string()),
                direccion: None,
                localidad: None,
            },
            capacidad_maxima: 50,
            capacidad_minima: 0,
            precio: Precio {
                es_gratis: true,
                moneda: "EUR".to_string(),
                cantidad: 0.0,
            },
            categoria: "tech".to_string(),
            etiquetas: vec![],
            organizador_id: 1,
            inscripciones_abiertas: abiertas,
        }
    }

    #[test]
    fn event_list_shows_ids_dates_and_closures() {
        let texto = lista_eventos(&[evento(1, true), evento(2, false)]);
        assert!(texto.contains("#1 Evento 1"));
        assert!(texto.contains("01/01/2099 18:00"));
        assert!(texto.contains("inscripciones cerradas"));
    }

    #[test]
    fn empty_lists_do_not_render_headers() {
        assert!(lista_eventos(&[]).contains("No hay eventos"));
        assert!(lista_inscripciones(&[], None).contains("ninguna inscripción"));
        assert!(lista_inscripciones(&[], Some(EstadoInscripcion::EnEspera)).contains("en espera"));
    }

    #[test]
    fn help_lists_every_command() {
        let texto = ayuda();
        for comando in [
            "/start",
            "/ayuda",
            "/login",
            "/logout",
            "/eventos",
            "/mis_inscripciones",
            "/inscribirme",
            "/cancelar_inscripcion",
            "/publicar_evento",
            "/cancelar",
            "/participantes",
            "/lista_espera",
            "/cerrar_inscripciones",
            "/estadisticas",
        ] {
            assert!(texto.contains(comando), "help should mention {comando}");
        }
    }
}
