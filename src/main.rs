//! # Flyver Bot Main Entry Point
//!
//! This is the main entry point for the Flyver reservation bot.
//! It initializes logging, loads configuration, starts the archive
//! service, and runs the Discord gateway client alongside the health
//! endpoint.

use anyhow::Result;
use serenity::all::{Client, GatewayIntents};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod services;
mod store;
mod utils;

use crate::bot::handlers::Handler;
use crate::config::Config;
use crate::services::archive::ArchiveService;
use crate::services::health::HealthService;
use crate::store::reservations::ReservationStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flyver_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Flyver Bot v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded - HTTP Port: {}", config.http_port);

    // Reservations live in memory only; a restart begins from an empty book
    let store = ReservationStore::new();

    // Initialize the Discord client
    info!("Initializing Discord client...");
    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler::new(store.clone()))
        .await?;
    info!("Discord client initialized successfully");

    // Initialize and start the archive service
    info!("Initializing archive service...");
    let mut archive_service =
        match ArchiveService::new(client.http.clone(), client.cache.clone(), store.clone()).await {
            Ok(service) => {
                info!("Archive service initialized successfully");
                service
            }
            Err(e) => {
                tracing::error!("Failed to create archive service: {}", e);
                return Err(anyhow::anyhow!("Failed to create archive service: {}", e));
            }
        };

    if let Err(e) = archive_service.start().await {
        tracing::error!("Failed to start archive service: {}", e);
    } else {
        info!("Archive service started successfully");
    }

    // Initialize health service
    let health_service = HealthService::new(store.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    // Run both the gateway client and health server concurrently
    let bot_task = tokio::spawn(async move {
        if let Err(e) = client.start().await {
            tracing::error!("Discord client error: {}", e);
        }
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result1 = bot_task => {
            if let Err(e) = result1 {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result2 = health_task => {
            if let Err(e) = result2 {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    // Stop archive service on shutdown
    if let Err(e) = archive_service.stop().await {
        tracing::warn!("Error stopping archive service: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
