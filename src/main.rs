mod config;
mod dispatch;
mod error;
mod format;
mod routes;
mod schedule;
mod severity;
mod telegram;
mod waqi;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use config::{Config, Secrets};
use dispatch::{AlertPolicy, Dispatcher};
use schedule::CronSpec;
use telegram::TelegramNotifier;
use waqi::WaqiClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aqi_sentinel=info".parse().unwrap()),
        )
        .init();

    let config = Config::load().context("Failed to load config")?;
    let secrets = Secrets::from_env()?;

    let hourly =
        CronSpec::parse(&config.schedule.hourly_cron).context("Bad [schedule] hourly_cron")?;
    let daily =
        CronSpec::parse(&config.schedule.daily_cron).context("Bad [schedule] daily_cron")?;

    let source = WaqiClient::new(
        config.station.base_url.clone(),
        config.station.location.clone(),
        secrets.waqi_token,
    )?;
    let sink = TelegramNotifier::new(secrets.bot_token, secrets.chat_id, secrets.thread_id)?;

    let dispatcher = Dispatcher::new(
        Arc::new(source),
        Arc::new(sink),
        AlertPolicy {
            threshold: config.alert.threshold,
            daily_cron: config.schedule.daily_cron.clone(),
        },
    );

    // Graceful shutdown
    let shutdown = Arc::new(AtomicBool::new(false));
    let s = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        s.store(true, Ordering::SeqCst);
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "Diagnostic server listening");

    let app = routes::router(dispatcher.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Diagnostic server stopped");
        }
    });

    info!(
        location = %config.station.location,
        threshold = config.alert.threshold,
        hourly_cron = %config.schedule.hourly_cron,
        daily_cron = %config.schedule.daily_cron,
        "Starting air quality watch"
    );

    // Hourly first so a minute matching both schedules alerts before it
    // summarizes.
    schedule::run_scheduler(dispatcher, vec![hourly, daily], shutdown).await;

    info!("Shut down cleanly");
    Ok(())
}
