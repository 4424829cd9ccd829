//! # Training Roster Bot Main Entry Point
//!
//! Initializes logging, loads configuration, opens the roster file and runs
//! the Telegram bot next to the health check server.

use anyhow::Result;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use training_roster_bot::bot::handlers::{BotHandler, DialogueState};
use training_roster_bot::config::Config;
use training_roster_bot::database::store::RosterStore;
use training_roster_bot::services::health::HealthService;
use training_roster_bot::services::notifier::PromotionNotifier;
use training_roster_bot::services::roster::RosterService;
use training_roster_bot::utils::logging::log_system_event;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "training_roster_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Training Roster Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Data file: {}, HTTP Port: {}, Limits: {} main + {} reserve",
        config.data_path.display(),
        config.http_port,
        config.limits.max_main,
        config.limits.max_reserve
    );

    // Open roster storage
    let store = RosterStore::open(config.data_path.clone(), config.defaults.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open roster file: {}", e))?;
    let roster = RosterService::new(store, config.limits, config.admin_id).await;
    log_system_event("roster_ready", Some(&config.data_path.display().to_string()));

    // Initialize bot
    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let notifier = PromotionNotifier::new(bot.clone());
    let handler = BotHandler::new(roster.clone(), notifier, config.bot.clone());
    info!("Telegram bot initialized successfully");

    // Initialize health service
    let health_service = HealthService::new(roster);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    // Run both the bot and health server concurrently
    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .dependencies(dptree::deps![InMemStorage::<DialogueState>::new()])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    log_system_event("shutdown", None);
    info!("Application stopped");
    Ok(())
}
