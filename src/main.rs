//! # Sports Games Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database and the
//! reminder scheduler, then runs the Telegram bot next to the HTTP server.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sports_games_bot::bot::commands::Command;
use sports_games_bot::bot::dispatcher::CommandRouter;
use sports_games_bot::bot::handlers::BotHandler;
use sports_games_bot::config::Config;
use sports_games_bot::database::connection::DatabaseManager;
use sports_games_bot::database::repository::Storage;
use sports_games_bot::database::sqlite::SqliteStorage;
use sports_games_bot::services::api;
use sports_games_bot::services::health::HealthService;
use sports_games_bot::services::notifier::{Notifier, TelegramNotifier};
use sports_games_bot::services::scheduler::CronTaskScheduler;
use sports_games_bot::utils::logging::log_system_event;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sports_games_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Sports Games Bot v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded - Database: {}, HTTP Port: {}", config.database_url, config.http_port);

    // Initialize database
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    db_manager.run_migrations().await?;
    let db = Arc::new(db_manager);
    let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::new(&db));
    log_system_event("database ready", None);

    // Initialize bot transport and reminder scheduler
    let bot = Bot::new(&config.telegram_bot_token);
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!("Could not register bot commands: {}", e);
    }
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(bot.clone()));

    let scheduler = CronTaskScheduler::new().await?;
    scheduler.start().await?;

    let router = Arc::new(CommandRouter::new(storage.clone(), notifier, Arc::new(scheduler.clone())));
    let handler = BotHandler::new(router.clone());
    log_system_event("bot initialized", None);

    // HTTP: CRUD API plus health checks
    let health_service = HealthService::new(db.clone(), router.sessions(), router.reminders().clone());
    let app = api::router(storage)
        .merge(health_service.router)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;
    info!("HTTP server starting on port {}", config.http_port);

    // Run both the bot and the HTTP server concurrently
    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let http_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = http_task => {
            if let Err(e) = result {
                tracing::error!("HTTP task error: {}", e);
            }
        }
    }

    // Pending reminders live only in memory and are lost here
    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!("Error stopping task scheduler: {}", e);
    }

    log_system_event("application stopped", None);
    Ok(())
}
