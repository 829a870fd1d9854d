//! Free-text routing: wizard answers, credential submissions, fallback.
//!
//! Anything that is not a slash command lands here. Priority matters:
//! a chat with a wizard in progress gets every plain message as the
//! answer to the current step, even if it happens to look like a
//! `usuario:contraseña` pair.

use once_cell::sync::Lazy;
use regex::Regex;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use quedacore::{LoginError, StepOutcome};

use crate::telegram::texts;
use crate::telegram::types::HandlerDeps;

/// A whole message of the form `usuario:contraseña`, nothing around it.
static CREDENCIALES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\s:]+):(\S+)$").expect("Failed to compile credentials regex"));

/// Callback payloads for the confirmation keyboard. The router in
/// `callbacks` matches on the same constants.
pub const CALLBACK_CONFIRMAR: &str = "wiz:confirmar";
pub const CALLBACK_CANCELAR: &str = "wiz:cancelar";

pub fn confirmation_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Publicar", CALLBACK_CONFIRMAR),
        InlineKeyboardButton::callback("❌ Cancelar", CALLBACK_CANCELAR),
    ]])
}

/// Handle a plain text message.
///
/// Wizard answers take priority, then credential submissions, then the
/// fallback hint. Credential messages are deleted after processing so
/// the password does not linger in the chat history.
pub async fn handle_text(bot: Bot, msg: Message, deps: HandlerDeps) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if deps.wizards.is_active(chat_id.0) {
        // The wizard only exists for organizers; if the session expired
        // under it the draft is useless, so drop both together.
        if deps.sessions.get(chat_id.0).is_none() {
            deps.wizards.cancel(chat_id.0);
            log::info!("Wizard for chat {} dropped: session expired mid-flow", chat_id.0);
            bot.send_message(chat_id, texts::DEBES_INICIAR_SESION).await?;
            return Ok(());
        }
        deps.sessions.touch(chat_id.0);

        match deps.wizards.advance(chat_id.0, text) {
            Some(StepOutcome::Prompt(pregunta)) => {
                bot.send_message(chat_id, pregunta).await?;
            }
            Some(StepOutcome::Invalid(motivo)) => {
                bot.send_message(chat_id, format!("⚠️ {motivo}")).await?;
            }
            Some(StepOutcome::ReadyForConfirmation(resumen)) => {
                bot.send_message(chat_id, resumen)
                    .reply_markup(confirmation_keyboard())
                    .await?;
            }
            // Evicted between is_active and advance; treat as no wizard.
            None => {
                bot.send_message(chat_id, texts::NO_ENTIENDO).await?;
            }
        }
        return Ok(());
    }

    if let Some(captura) = CREDENCIALES.captures(text) {
        let nombre_usuario = captura[1].to_string();
        let contrasena = captura[2].to_string();
        // The message holds a password in plain sight. Best effort only:
        // the bot may lack delete rights in this chat.
        let _ = bot.delete_message(chat_id, msg.id).await;

        match deps.sessions.login(chat_id.0, &nombre_usuario, &contrasena).await {
            Ok(sesion) => {
                bot.send_message(chat_id, texts::sesion_iniciada(&sesion)).await?;
            }
            Err(LoginError::InvalidCredentials) => {
                bot.send_message(chat_id, texts::CREDENCIALES_INCORRECTAS).await?;
            }
            Err(LoginError::AlreadyLoggedInElsewhere) => {
                log::info!("Chat {} refused: account already bound to another chat", chat_id.0);
                bot.send_message(chat_id, texts::SESION_EN_OTRO_CHAT).await?;
            }
            Err(LoginError::Gateway(err)) => {
                log::error!("Login for chat {} failed: {}", chat_id.0, err);
                bot.send_message(chat_id, texts::DISCULPA_BACKEND).await?;
            }
        }
        return Ok(());
    }

    bot.send_message(chat_id, texts::NO_ENTIENDO).await?;
    Ok(())
}
