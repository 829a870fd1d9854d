//! Role gating for commands.
//!
//! One table maps each command keyword to the minimum role it needs
//! (`None` means public). The hierarchy is cumulative: an administrator
//! can do everything an organizer can, an organizer everything a user
//! can. [`gate`] resolves the chat's session, answers refusals itself,
//! and hands the session back only when the command may proceed.

use teloxide::prelude::*;

use quedacore::gateway::types::Role;
use quedacore::Session;

use super::texts;
use super::types::HandlerDeps;

/// Minimum role for a command keyword (the part after `/`, without
/// arguments). `None` means anyone, logged in or not.
pub fn required_role(comando: &str) -> Option<Role> {
    match comando {
        "start" | "ayuda" | "login" | "eventos" => None,
        "logout" | "mis_inscripciones" | "inscribirme" | "cancelar_inscripcion" => Some(Role::User),
        "publicar_evento" | "cancelar" | "participantes" | "lista_espera" | "cerrar_inscripciones" => {
            Some(Role::Organizer)
        }
        "estadisticas" => Some(Role::Admin),
        // Unknown keywords never reach the gate; fail closed anyway.
        _ => Some(Role::Admin),
    }
}

/// Gate verdict, kept free of Telegram types so it can be unit tested.
#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    MustLogin,
    Forbidden(Role),
}

pub fn decide(rol: Option<Role>, comando: &str) -> Decision {
    match required_role(comando) {
        None => Decision::Allow,
        Some(requerido) => match rol {
            None => Decision::MustLogin,
            Some(rol) if rol.at_least(requerido) => Decision::Allow,
            Some(_) => Decision::Forbidden(requerido),
        },
    }
}

/// Enforces the table for one command. Refusals are answered here;
/// `Ok(None)` means the caller is done.
pub async fn gate(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps, comando: &str) -> ResponseResult<Option<Session>> {
    let sesion = deps.sessions.get(chat_id.0);
    match decide(sesion.as_ref().map(|s| s.rol), comando) {
        Decision::Allow => {
            deps.sessions.touch(chat_id.0);
            Ok(sesion)
        }
        Decision::MustLogin => {
            bot.send_message(chat_id, texts::DEBES_INICIAR_SESION).await?;
            Ok(None)
        }
        Decision::Forbidden(requerido) => {
            log::info!("Chat {} tried /{} without the {} role", chat_id.0, comando, requerido.etiqueta());
            bot.send_message(chat_id, texts::solo_para(requerido)).await?;
            Ok(None)
        }
    }
}
