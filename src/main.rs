use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use pac_router::api::{start_api_server, ApiState};
use pac_router::config::Config;
use pac_router::engine::{PolicyManager, StandardManager};
use pac_router::init::{init_memory_sink, init_policy, setup_logging};
use pac_router::logger::DecisionLogger;
use pac_router::stats::StatsCollector;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config_exists = std::path::Path::new(&config_path).exists();
    let config = if config_exists {
        Config::load(&config_path).await?
    } else {
        Config::default()
    };

    // 2. Setup Logging
    setup_logging(&config.logging);
    info!("Starting pac-router...");

    if !config_exists {
        info!("Config file not found, using defaults.");
    }

    // 3. Init Stats
    let stats = StatsCollector::new();
    if config.stats.enable {
        stats.spawn_logger(config.stats.log_interval_seconds);
    }

    // 4. Init Decision Logger
    let (extra_sinks, logs_buffer) = init_memory_sink(&config);
    let logger = DecisionLogger::new(config.logging.clone(), extra_sinks);

    // 5. Build Initial Policy
    let manager = Arc::new(StandardManager::new(config.clone()));
    let policy = init_policy(manager.as_ref(), &stats).await;

    // 6. Spawn Periodic Updater
    let update_interval = config.updates.interval();
    let (refresh_tx, mut refresh_rx) = tokio::sync::mpsc::channel::<()>(1);
    let updater_policy = policy.clone();
    let updater_stats = stats.clone();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(update_interval);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    info!("Scheduled policy update...");
                }
                msg = refresh_rx.recv() => {
                    if msg.is_none() {
                        break;
                    }
                    info!("Forced policy update triggered via API...");
                    interval.reset();
                }
            }
            match manager.refresh().await {
                Ok(new_policy) => {
                    updater_stats.inc_refreshes();
                    updater_policy.publish(new_policy);
                }
                Err(e) => {
                    updater_stats.inc_refresh_failures();
                    error!(
                        "Keeping generation {}: {}",
                        updater_policy.load().generation,
                        e
                    );
                }
            }
        }
    });

    // 7. Start PAC/API Server
    let host = config
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("Invalid listen host: {}", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let state = Arc::new(ApiState {
        policy,
        stats,
        logger,
        config,
        refresh_sender: refresh_tx,
        logs_buffer,
    });

    // 8. Graceful Shutdown
    tokio::select! {
        result = start_api_server(listener, state) => {
            result.context("PAC server failed")?;
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received.");
        }
    }

    Ok(())
}
