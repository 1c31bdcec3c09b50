// In app/src/main.rs

use anyhow::Result;
use api_client::{BybitClient, FailureCache};
use clap::{Parser, Subcommand};
use core_types::{Symbol, Timeframe};
use engine::Engine;
use events::WsMessage;
use notifier::{Notify, TelegramNotifier};
use std::sync::Arc;
use store::Repository;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A Bybit market-watch signal bot.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the polling engine and the dashboard server.
    Run,

    /// Classifies a single symbol across all timeframes and prints the result.
    Scan {
        /// The trading symbol to scan (e.g., "BTCUSDT").
        #[arg(short, long)]
        symbol: String,
    },

    /// Sends a test message to the configured Telegram channel.
    TestNotify,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Argus application");

    match cli.command {
        Commands::Run => {
            run_app().await?;
        }
        Commands::Scan { symbol } => {
            handle_scan(symbol).await?;
        }
        Commands::TestNotify => {
            handle_test_notify().await?;
        }
    }

    tracing::info!("Argus application has finished successfully.");

    Ok(())
}

// --- "Run" Subcommand Logic ---

/// The primary logic for the `run` command.
/// This function initializes all core components and starts the engine and
/// the dashboard server. It runs until terminated.
async fn run_app() -> Result<()> {
    // --- 1. Initialization ---
    let settings = app_config::load_settings()?;
    tracing::info!("Application settings loaded successfully.");

    let repository = Repository::new(&settings.store.data_dir);
    repository.prepare()?;

    let failure_ttl = chrono::Duration::seconds(settings.bybit.failure_cache_ttl_secs as i64);
    let client = BybitClient::new(&settings.bybit, FailureCache::new(failure_ttl))?;

    let notifier: Arc<dyn Notify> = Arc::new(TelegramNotifier::new(&settings.telegram));

    // The dashboard event broadcaster is a central piece of state.
    let (ws_tx, _) = broadcast::channel::<WsMessage>(1024);

    // --- 2. Shutdown Wiring ---
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to listen for Ctrl-C, shutting down");
        } else {
            tracing::info!("Ctrl-C received, requesting shutdown.");
        }
        let _ = shutdown_tx.send(true);
    });

    // --- 3. Launch Concurrent Tasks ---
    tracing::info!("Launching concurrent Engine and Web Server tasks...");

    let engine = Engine::new(
        settings.clone(),
        client,
        repository.clone(),
        notifier,
        ws_tx.clone(),
        shutdown_rx,
    );
    let engine_handle = tokio::spawn(engine.run());

    let server_settings = settings.server.clone();
    let server_handle = tokio::spawn(web_server::run(server_settings, repository, ws_tx));

    // The engine ends on shutdown; the server only ends on error.
    tokio::select! {
        engine_result = engine_handle => {
            tracing::info!(?engine_result, "Engine task finished.");
        }
        server_result = server_handle => {
            tracing::error!(?server_result, "Web server task has terminated unexpectedly.");
        }
    }

    Ok(())
}

// --- "Scan" Subcommand Logic ---

/// Handles the logic for the `scan` subcommand: one-shot classification of a
/// single symbol across every timeframe, printed to stdout.
async fn handle_scan(symbol_str: String) -> Result<()> {
    let settings = app_config::load_settings()?;
    let failure_ttl = chrono::Duration::seconds(settings.bybit.failure_cache_ttl_secs as i64);
    let client = BybitClient::new(&settings.bybit, FailureCache::new(failure_ttl))?;
    let symbol = Symbol(symbol_str.to_uppercase());

    println!("\n--- {} ---", symbol);
    for timeframe in Timeframe::ALL {
        let line = match client.get_klines(&symbol, timeframe).await {
            Ok(bars) => match indicators::compute(&bars, &settings.indicators) {
                Ok(snapshot) => {
                    match signals::classify(&snapshot, timeframe, &settings.classifier) {
                        Ok(decision) => match (decision.entry, decision.tp, decision.sl) {
                            (Some(entry), Some(tp), Some(sl)) => format!(
                                "{}  entry=${:.4} tp=${:.4} sl=${:.4}",
                                decision.kind, entry, tp, sl
                            ),
                            _ => "no signal".to_string(),
                        },
                        Err(error) => format!("classification failed: {error}"),
                    }
                }
                Err(error) => format!("no snapshot: {error}"),
            },
            Err(error) => format!("no data: {error}"),
        };
        println!("{:>4}: {}", timeframe.as_str(), line);
    }

    Ok(())
}

// --- "TestNotify" Subcommand Logic ---

/// Handles the logic for the `test-notify` subcommand.
async fn handle_test_notify() -> Result<()> {
    let settings = app_config::load_settings()?;
    let notifier = TelegramNotifier::new(&settings.telegram);

    notifier.send("✅ Argus test message").await?;
    tracing::info!("Test message sent to Telegram.");

    Ok(())
}
