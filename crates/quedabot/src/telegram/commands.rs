//! Command handler implementations (/start, /login, /eventos, ...).
//!
//! Every handler follows the same shape: resolve the gate, parse the
//! argument if the command takes one, call the gateway, render the
//! reply through [`texts`]. Backend refusals become user messages via
//! [`report_gateway_error`] instead of bubbling into the dispatcher.

use teloxide::prelude::*;
use teloxide::types::Message;

use quedacore::gateway::types::{EstadoInscripcion, InscripcionNueva};
use quedacore::{GatewayError, StartOutcome};

use super::access::gate;
use super::texts;
use super::types::{HandlerDeps, HandlerError};

/// Argument text after a command keyword, if any.
fn argumento<'a>(msg: &'a Message, comando: &str) -> Option<&'a str> {
    let resto = msg.text()?.strip_prefix(comando)?.trim();
    if resto.is_empty() {
        None
    } else {
        Some(resto)
    }
}

fn id_argumento(msg: &Message, comando: &str) -> Option<i64> {
    argumento(msg, comando).and_then(|texto| texto.parse().ok())
}

/// Turn a gateway failure into a user-facing reply.
///
/// A 401 here means the backend revoked the credentials behind our
/// back, so the cached session (and any draft riding on it) is stale
/// and gets dropped before the user is asked to log in again.
async fn report_gateway_error(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    contexto: &str,
    err: GatewayError,
) -> ResponseResult<()> {
    match err {
        GatewayError::Unauthorized => {
            log::warn!("{contexto}: credentials for chat {} no longer valid", chat_id.0);
            deps.wizards.cancel(chat_id.0);
            deps.sessions.logout(chat_id.0).await;
            bot.send_message(chat_id, texts::SESION_CADUCADA).await?;
        }
        GatewayError::Api { status, body } if !body.is_empty() => {
            log::info!("{contexto} rejected for chat {}: {status} {body}", chat_id.0);
            bot.send_message(chat_id, format!("❌ {body}")).await?;
        }
        GatewayError::Api { status, .. } => {
            log::info!("{contexto} rejected for chat {}: {status}", chat_id.0);
            bot.send_message(chat_id, format!("❌ La plataforma lo ha rechazado (código {status}).")).await?;
        }
        GatewayError::Network(err) => {
            log::error!("{contexto} failed for chat {}: {err}", chat_id.0);
            bot.send_message(chat_id, texts::DISCULPA_BACKEND).await?;
        }
    }
    Ok(())
}

/// Handle /start
pub(super) async fn handle_start(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, texts::bienvenida()).await?;
    Ok(())
}

/// Handle /ayuda
pub(super) async fn handle_ayuda(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, texts::ayuda()).await?;
    Ok(())
}

/// Handle /login
///
/// Only explains the expected format; the actual credentials arrive as
/// a free-text message and are routed in `messages`.
pub(super) async fn handle_login(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    match deps.sessions.get(msg.chat.id.0) {
        Some(sesion) => {
            bot.send_message(msg.chat.id, texts::ya_con_sesion(&sesion)).await?;
        }
        None => {
            bot.send_message(msg.chat.id, texts::PIDE_CREDENCIALES).await?;
        }
    }
    Ok(())
}

/// Handle /logout
pub(super) async fn handle_logout(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    // A draft cannot outlive the session that started it.
    if deps.wizards.cancel(chat_id.0) {
        log::info!("Chat {} discarded an event draft on logout", chat_id.0);
    }
    if deps.sessions.logout(chat_id.0).await {
        log::info!("Chat {} logged out", chat_id.0);
        bot.send_message(chat_id, texts::SESION_CERRADA).await?;
    } else {
        bot.send_message(chat_id, texts::SIN_SESION_QUE_CERRAR).await?;
    }
    Ok(())
}

/// Handle /eventos. Public: works without a session.
pub(super) async fn handle_eventos(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    match deps.gateway.eventos().await {
        Ok(eventos) => {
            bot.send_message(msg.chat.id, texts::lista_eventos(&eventos)).await?;
        }
        Err(err) => report_gateway_error(bot, msg.chat.id, deps, "/eventos", err).await?,
    }
    Ok(())
}

/// Handle /publicar_evento
pub(super) async fn handle_publicar_evento(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let Some(sesion) = gate(bot, chat_id, deps, "publicar_evento").await? else {
        return Ok(());
    };

    match deps.wizards.start(chat_id.0) {
        StartOutcome::Started(pregunta) => {
            log::info!("Chat {} ({}) started an event draft", chat_id.0, sesion.nombre_usuario);
            bot.send_message(chat_id, texts::publicacion_iniciada(&pregunta)).await?;
        }
        StartOutcome::AlreadyActive => {
            bot.send_message(chat_id, texts::PUBLICACION_YA_EN_CURSO).await?;
        }
    }
    Ok(())
}

/// Handle /cancelar
pub(super) async fn handle_cancelar(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    if gate(bot, chat_id, deps, "cancelar").await?.is_none() {
        return Ok(());
    }

    if deps.wizards.cancel(chat_id.0) {
        log::info!("Chat {} discarded its event draft", chat_id.0);
        bot.send_message(chat_id, texts::PUBLICACION_CANCELADA).await?;
    } else {
        bot.send_message(chat_id, texts::SIN_PUBLICACION_EN_CURSO).await?;
    }
    Ok(())
}

/// Handle /estadisticas
pub(super) async fn handle_estadisticas(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let Some(sesion) = gate(bot, chat_id, deps, "estadisticas").await? else {
        return Ok(());
    };

    match deps.gateway.estadisticas(&sesion.credencial).await {
        Ok(est) => {
            bot.send_message(chat_id, texts::estadisticas(&est)).await?;
        }
        Err(err) => report_gateway_error(bot, chat_id, deps, "/estadisticas", err).await?,
    }
    Ok(())
}

/// Handle /mis_inscripciones [estado]
pub(super) async fn handle_mis_inscripciones(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let Some(sesion) = gate(bot, chat_id, deps, "mis_inscripciones").await? else {
        return Ok(());
    };

    let filtro = match argumento(msg, "/mis_inscripciones") {
        None => None,
        Some(texto) => match texto.parse::<EstadoInscripcion>() {
            Ok(estado) => Some(estado),
            Err(_) => {
                bot.send_message(chat_id, texts::USO_MIS_INSCRIPCIONES).await?;
                return Ok(());
            }
        },
    };

    match deps.gateway.inscripciones(&sesion.credencial, sesion.actor_id, filtro).await {
        Ok(inscripciones) => {
            bot.send_message(chat_id, texts::lista_inscripciones(&inscripciones, filtro)).await?;
        }
        Err(err) => report_gateway_error(bot, chat_id, deps, "/mis_inscripciones", err).await?,
    }
    Ok(())
}

/// Handle /inscribirme <id>
pub(super) async fn handle_inscribirme(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let Some(sesion) = gate(bot, chat_id, deps, "inscribirme").await? else {
        return Ok(());
    };
    let Some(evento_id) = id_argumento(msg, "/inscribirme") else {
        bot.send_message(chat_id, texts::USO_INSCRIBIRME).await?;
        return Ok(());
    };

    let nueva = InscripcionNueva {
        evento_id,
        participante_id: sesion.actor_id,
    };
    match deps.gateway.crear_inscripcion(&sesion.credencial, nueva).await {
        Ok(inscripcion) => {
            log::info!(
                "Chat {} registered for event {} as inscription {} ({})",
                chat_id.0,
                evento_id,
                inscripcion.id,
                inscripcion.estado
            );
            bot.send_message(chat_id, texts::inscripcion_creada(&inscripcion)).await?;
        }
        Err(err) => report_gateway_error(bot, chat_id, deps, "/inscribirme", err).await?,
    }
    Ok(())
}

/// Handle /cancelar_inscripcion <id>
pub(super) async fn handle_cancelar_inscripcion(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let Some(sesion) = gate(bot, chat_id, deps, "cancelar_inscripcion").await? else {
        return Ok(());
    };
    let Some(id) = id_argumento(msg, "/cancelar_inscripcion") else {
        bot.send_message(chat_id, texts::USO_CANCELAR_INSCRIPCION).await?;
        return Ok(());
    };

    match deps.gateway.cancelar_inscripcion(&sesion.credencial, id).await {
        Ok(()) => {
            log::info!("Chat {} cancelled inscription {}", chat_id.0, id);
            bot.send_message(chat_id, texts::inscripcion_cancelada(id)).await?;
        }
        Err(err) => report_gateway_error(bot, chat_id, deps, "/cancelar_inscripcion", err).await?,
    }
    Ok(())
}

/// Handle /participantes <id de evento>
pub(super) async fn handle_participantes(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let Some(sesion) = gate(bot, chat_id, deps, "participantes").await? else {
        return Ok(());
    };
    let Some(evento_id) = id_argumento(msg, "/participantes") else {
        bot.send_message(chat_id, texts::USO_PARTICIPANTES).await?;
        return Ok(());
    };

    match deps.gateway.participantes(&sesion.credencial, evento_id).await {
        Ok(participantes) => {
            bot.send_message(chat_id, texts::lista_participantes(evento_id, &participantes)).await?;
        }
        Err(err) => report_gateway_error(bot, chat_id, deps, "/participantes", err).await?,
    }
    Ok(())
}

/// Handle /lista_espera <id de evento>
pub(super) async fn handle_lista_espera(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let Some(sesion) = gate(bot, chat_id, deps, "lista_espera").await? else {
        return Ok(());
    };
    let Some(evento_id) = id_argumento(msg, "/lista_espera") else {
        bot.send_message(chat_id, texts::USO_LISTA_ESPERA).await?;
        return Ok(());
    };

    match deps.gateway.lista_espera(&sesion.credencial, evento_id).await {
        Ok(espera) => {
            bot.send_message(chat_id, texts::lista_espera(evento_id, &espera)).await?;
        }
        Err(err) => report_gateway_error(bot, chat_id, deps, "/lista_espera", err).await?,
    }
    Ok(())
}

/// Handle /cerrar_inscripciones <id de evento>
pub(super) async fn handle_cerrar_inscripciones(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let Some(sesion) = gate(bot, chat_id, deps, "cerrar_inscripciones").await? else {
        return Ok(());
    };
    let Some(evento_id) = id_argumento(msg, "/cerrar_inscripciones") else {
        bot.send_message(chat_id, texts::USO_CERRAR_INSCRIPCIONES).await?;
        return Ok(());
    };

    match deps.gateway.cerrar_inscripciones(&sesion.credencial, evento_id).await {
        Ok(evento) => {
            log::info!("Chat {} closed registrations for event {}", chat_id.0, evento_id);
            bot.send_message(chat_id, texts::inscripciones_cerradas(&evento)).await?;
        }
        Err(err) => report_gateway_error(bot, chat_id, deps, "/cerrar_inscripciones", err).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Message is cumbersome to build by hand, so the argument helpers
    // are exercised through their text-level core here.
    fn resto<'a>(texto: &'a str, comando: &str) -> Option<&'a str> {
        let resto = texto.strip_prefix(comando)?.trim();
        if resto.is_empty() {
            None
        } else {
            Some(resto)
        }
    }

    #[test]
    fn argument_extraction_trims_and_rejects_empty() {
        assert_eq!(resto("/inscribirme 5", "/inscribirme"), Some("5"));
        assert_eq!(resto("/inscribirme   5  ", "/inscribirme"), Some("5"));
        assert_eq!(resto("/inscribirme", "/inscribirme"), None);
        assert_eq!(resto("/inscribirme   ", "/inscribirme"), None);
    }

    #[test]
    fn inscription_state_argument_parses_wire_names() {
        assert_eq!("aceptada".parse::<EstadoInscripcion>().ok(), Some(EstadoInscripcion::Aceptada));
        assert_eq!("en_espera".parse::<EstadoInscripcion>().ok(), Some(EstadoInscripcion::EnEspera));
        assert_eq!("cancelada".parse::<EstadoInscripcion>().ok(), Some(EstadoInscripcion::Cancelada));
        assert!("pendiente".parse::<EstadoInscripcion>().is_err());
    }
}
