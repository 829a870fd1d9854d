//! Bot instance creation and the command set.
//!
//! Only argument-less commands live in the [`Command`] enum; commands that
//! take an id or a filter are matched by prefix in the schema and parse
//! their own text. `setup_bot_commands` registers them all with Telegram
//! so the `/` menu shows the full list.

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use quedacore::config;

/// Commands with no arguments, parsed by teloxide.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case", description = "Puedo hacer esto:")]
pub enum Command {
    #[command(description = "empieza a hablar conmigo")]
    Start,
    #[command(description = "muestra esta ayuda")]
    Ayuda,
    #[command(description = "inicia sesión en la plataforma")]
    Login,
    #[command(description = "cierra tu sesión")]
    Logout,
    #[command(description = "lista los eventos publicados")]
    Eventos,
    #[command(description = "publica un evento paso a paso")]
    PublicarEvento,
    #[command(description = "cancela la publicación en curso")]
    Cancelar,
    #[command(description = "estadísticas de la plataforma")]
    Estadisticas,
}

/// Creates the Bot instance from `BOT_TOKEN` with a bounded HTTP timeout.
pub fn create_bot() -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("BOT_TOKEN is not set");
    }
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(config::BOT_TOKEN.as_str(), client))
}

/// Registers every command, prefix-matched ones included, in the
/// Telegram command menu.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "empieza a hablar conmigo"),
        BotCommand::new("ayuda", "muestra la ayuda"),
        BotCommand::new("login", "inicia sesión en la plataforma"),
        BotCommand::new("logout", "cierra tu sesión"),
        BotCommand::new("eventos", "lista los eventos publicados"),
        BotCommand::new("mis_inscripciones", "tus inscripciones, opcionalmente por estado"),
        BotCommand::new("inscribirme", "apúntate a un evento por su id"),
        BotCommand::new("cancelar_inscripcion", "cancela una inscripción por su id"),
        BotCommand::new("publicar_evento", "publica un evento paso a paso"),
        BotCommand::new("cancelar", "cancela la publicación en curso"),
        BotCommand::new("participantes", "participantes aceptados de tu evento"),
        BotCommand::new("lista_espera", "lista de espera de tu evento"),
        BotCommand::new("cerrar_inscripciones", "cierra las inscripciones de tu evento"),
        BotCommand::new("estadisticas", "estadísticas de la plataforma"),
    ])
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_are_snake_case() {
        let descripciones = format!("{}", Command::descriptions());
        assert!(descripciones.contains("Puedo hacer esto"));
        assert!(descripciones.contains("/publicar_evento"));
        assert!(descripciones.contains("/estadisticas"));
    }

    #[test]
    fn commands_parse_from_text() {
        assert!(matches!(Command::parse("/publicar_evento", "quedabot"), Ok(Command::PublicarEvento)));
        assert!(matches!(Command::parse("/cancelar", "quedabot"), Ok(Command::Cancelar)));
        // Argument-taking commands are not in the enum; the schema routes
        // them by prefix instead.
        assert!(Command::parse("/inscribirme 5", "quedabot").is_err());
    }
}
