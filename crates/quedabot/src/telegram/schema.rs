//! Dispatcher schema and handler chain builders.

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::bot::Command;
use super::callbacks::handle_callback;
use super::commands::{
    handle_ayuda, handle_cancelar, handle_cancelar_inscripcion, handle_cerrar_inscripciones, handle_estadisticas,
    handle_eventos, handle_inscribirme, handle_lista_espera, handle_login, handle_logout, handle_mis_inscripciones,
    handle_participantes, handle_publicar_evento, handle_start,
};
use super::messages::handle_text;
use super::types::{HandlerDeps, HandlerError};

/// Creates the main dispatcher schema for the bot.
///
/// The same handler tree drives production and tests. Branch order
/// matters: argument-taking commands are matched by prefix before the
/// `Command` parser, and the free-text handler is the catch-all for
/// everything that is not a command.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_mis_inscripciones = deps.clone();
    let deps_inscribirme = deps.clone();
    let deps_cancelar_inscripcion = deps.clone();
    let deps_participantes = deps.clone();
    let deps_lista_espera = deps.clone();
    let deps_cerrar = deps.clone();
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps.clone();

    dptree::entry()
        // Commands with arguments (not representable as unit variants of Command)
        .branch(mis_inscripciones_handler(deps_mis_inscripciones))
        .branch(inscribirme_handler(deps_inscribirme))
        .branch(cancelar_inscripcion_handler(deps_cancelar_inscripcion))
        .branch(participantes_handler(deps_participantes))
        .branch(lista_espera_handler(deps_lista_espera))
        .branch(cerrar_inscripciones_handler(deps_cerrar))
        // Plain commands
        .branch(command_handler(deps_commands))
        // Wizard answers, credential submissions, fallback
        .branch(message_handler(deps_messages))
        // Confirmation keyboard presses
        .branch(callback_handler(deps_callback))
}

/// Handler for /mis_inscripciones [estado]
fn mis_inscripciones_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            msg.text()
                .map(|text| text.starts_with("/mis_inscripciones"))
                .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_mis_inscripciones(&bot, &msg, &deps).await }
        })
}

/// Handler for /inscribirme <id>
fn inscribirme_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| text.starts_with("/inscribirme")).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_inscribirme(&bot, &msg, &deps).await }
        })
}

/// Handler for /cancelar_inscripcion <id>
///
/// Must sit in front of the `Command` parser so that `/cancelar` (the
/// wizard discard) never swallows it.
fn cancelar_inscripcion_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            msg.text()
                .map(|text| text.starts_with("/cancelar_inscripcion"))
                .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_cancelar_inscripcion(&bot, &msg, &deps).await }
        })
}

/// Handler for /participantes <id de evento>
fn participantes_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| text.starts_with("/participantes")).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_participantes(&bot, &msg, &deps).await }
        })
}

/// Handler for /lista_espera <id de evento>
fn lista_espera_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| text.starts_with("/lista_espera")).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_lista_espera(&bot, &msg, &deps).await }
        })
}

/// Handler for /cerrar_inscripciones <id de evento>
fn cerrar_inscripciones_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            msg.text()
                .map(|text| text.starts_with("/cerrar_inscripciones"))
                .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_cerrar_inscripciones(&bot, &msg, &deps).await }
        })
}

/// Handler for the commands in the `Command` enum.
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    Command::Start => handle_start(&bot, &msg).await?,
                    Command::Ayuda => handle_ayuda(&bot, &msg).await?,
                    Command::Login => handle_login(&bot, &msg, &deps).await?,
                    Command::Logout => handle_logout(&bot, &msg, &deps).await?,
                    Command::Eventos => handle_eventos(&bot, &msg, &deps).await?,
                    Command::PublicarEvento => handle_publicar_evento(&bot, &msg, &deps).await?,
                    Command::Cancelar => handle_cancelar(&bot, &msg, &deps).await?,
                    Command::Estadisticas => handle_estadisticas(&bot, &msg, &deps).await?,
                }
                Ok(())
            }
        },
    ))
}

/// Handler for regular messages (wizard answers, credentials, anything else)
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let deps = deps.clone();
        async move {
            handle_text(bot, msg, deps).await?;
            Ok(())
        }
    })
}

/// Handler for callback queries (inline keyboard buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            handle_callback(bot, q, deps).await?;
            Ok(())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use quedacore::gateway::file::FileGateway;
    use quedacore::gateway::Gateway;

    #[test]
    fn schema_builds() {
        let gateway: Arc<dyn Gateway> = Arc::new(FileGateway::from_datos(Default::default()));
        let deps = HandlerDeps::from_gateway(gateway, "EUR");
        let _tree = schema(deps);
    }
}
