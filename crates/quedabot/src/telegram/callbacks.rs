//! Inline keyboard callbacks for the publication confirmation.

use teloxide::prelude::*;
use teloxide::types::MessageId;

use quedacore::ConfirmOutcome;

use super::messages::{CALLBACK_CANCELAR, CALLBACK_CONFIRMAR};
use super::texts;
use super::types::HandlerDeps;

/// Best effort: the confirmation message may already have been edited
/// or deleted by the time the button press arrives.
async fn quitar_teclado(bot: &Bot, chat_id: ChatId, message_id: MessageId) {
    if let Err(e) = bot.edit_message_reply_markup(chat_id, message_id).await {
        log::warn!("Failed to remove confirmation keyboard: {}", e);
    }
}

/// Handles button presses from the wizard confirmation keyboard.
pub(super) async fn handle_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> ResponseResult<()> {
    let callback_id = q.id.clone();
    let chat_id = q.message.as_ref().map(|m| m.chat().id);
    let message_id = q.message.as_ref().map(|m| m.id());

    // Answer first so the client drops the spinner whatever happens next.
    bot.answer_callback_query(callback_id).await?;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let (Some(chat_id), Some(message_id)) = (chat_id, message_id) else {
        log::warn!("Callback {:?} without an attached message", data);
        return Ok(());
    };

    match data {
        CALLBACK_CONFIRMAR => {
            let Some(sesion) = deps.sessions.get(chat_id.0) else {
                // Session expired between the summary and the press.
                deps.wizards.cancel(chat_id.0);
                quitar_teclado(&bot, chat_id, message_id).await;
                bot.send_message(chat_id, texts::DEBES_INICIAR_SESION).await?;
                return Ok(());
            };
            deps.sessions.touch(chat_id.0);

            match deps.wizards.confirm(chat_id.0, &sesion).await {
                ConfirmOutcome::Submitted(evento) => {
                    log::info!(
                        "Chat {} published event {} (\"{}\")",
                        chat_id.0,
                        evento.id,
                        evento.titulo
                    );
                    quitar_teclado(&bot, chat_id, message_id).await;
                    bot.send_message(chat_id, texts::evento_publicado(&evento)).await?;
                }
                ConfirmOutcome::Failed(motivo) => {
                    log::warn!("Chat {} lost its draft: {}", chat_id.0, motivo);
                    quitar_teclado(&bot, chat_id, message_id).await;
                    bot.send_message(chat_id, texts::publicacion_fallida(&motivo)).await?;
                }
                ConfirmOutcome::NotReady => {
                    bot.send_message(chat_id, texts::CONFIRMACION_PENDIENTE).await?;
                }
                ConfirmOutcome::NotActive => {
                    quitar_teclado(&bot, chat_id, message_id).await;
                    bot.send_message(chat_id, texts::SIN_PUBLICACION_EN_CURSO).await?;
                }
            }
        }
        CALLBACK_CANCELAR => {
            quitar_teclado(&bot, chat_id, message_id).await;
            if deps.wizards.cancel(chat_id.0) {
                log::info!("Chat {} discarded its event draft", chat_id.0);
                bot.send_message(chat_id, texts::PUBLICACION_CANCELADA).await?;
            } else {
                bot.send_message(chat_id, texts::SIN_PUBLICACION_EN_CURSO).await?;
            }
        }
        otro => {
            log::warn!("Unknown callback payload: {}", otro);
        }
    }

    Ok(())
}
