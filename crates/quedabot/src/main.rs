use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use quedabot::cli::{Cli, Commands};
use quedabot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use quedacore::{config, gateway, init_logger, log_startup_configuration, SessionRegistry, WizardStore};

/// Main entry point for the Telegram bot.
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, gateway, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Set up global panic handler to catch panics in the dispatcher.
    // This lets us log the panic and reconnect instead of terminating.
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // .env before the logger: the log file path itself may come from
    // the environment, and the config statics read it lazily.
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Ping) => ping().await,
        Some(Commands::Run) | None => run_bot().await,
    }
}

/// Quick connectivity check: list the published events and exit.
async fn ping() -> Result<()> {
    let gateway = gateway::from_env()?;
    let eventos = gateway.eventos().await?;
    println!("backend ok: {} eventos publicados", eventos.len());
    Ok(())
}

async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");
    log_startup_configuration();

    let bot = create_bot()?;
    setup_bot_commands(&bot).await?;

    let gateway = gateway::from_env()?;
    let sessions = Arc::new(SessionRegistry::new(Arc::clone(&gateway)));
    let wizards = Arc::new(WizardStore::new(
        Arc::clone(&gateway),
        config::DEFAULT_CURRENCY.clone(),
    ));

    // Idle sessions must release their backend binding; abandoned
    // drafts just vanish.
    Arc::clone(&sessions).spawn_cleanup_task(config::expiry::session_ttl(), config::expiry::cleanup_interval());
    Arc::clone(&wizards).spawn_cleanup_task(config::expiry::wizard_ttl(), config::expiry::cleanup_interval());

    let handler_deps = HandlerDeps::new(gateway, sessions, wizards);
    let handler = schema(handler_deps);

    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    log::info!("Starting bot in long polling mode");

    // Run the dispatcher with retry logic
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // Run the dispatcher in a separate task to isolate panics; they
        // surface here through the JoinHandle.
        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            // Polling listener that drops pending updates on start
            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    log::error!("Dispatcher panicked: {}", join_err);

                    if retry_count < max_retries {
                        retry_count += 1;
                        log::info!(
                            "Retrying dispatcher connection after panic (attempt {}/{})...",
                            retry_count,
                            max_retries
                        );
                        exponential_backoff(retry_count).await;
                    } else {
                        log::error!("Max retries reached after panic. Exiting...");
                        break;
                    }
                } else {
                    log::warn!("Dispatcher task was cancelled: {}", join_err);
                    break;
                }
            }
        }

        // Delay between retries to avoid hammering the API
        if retry_count > 0 {
            sleep(config::retry::dispatcher_delay()).await;
        }
    }

    Ok(())
}

/// Exponential backoff delay for retries
async fn exponential_backoff(retry_count: u32) {
    let delay = Duration::from_secs(config::retry::EXPONENTIAL_BACKOFF_BASE.pow(retry_count));
    sleep(delay).await;
}
