use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;

use market_pulse::mock::{self, MockMarket};

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_TICK_SECS: u64 = 5;
const SEED_POINTS: usize = 60;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("MOCK_BACKEND_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let tick_secs = match std::env::var("MOCK_TICK_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("MOCK_TICK_SECS '{}' is not a number", raw))?
            .max(1),
        Err(_) => DEFAULT_TICK_SECS,
    };
    let tick = Duration::from_secs(tick_secs);

    let market = MockMarket::seeded(SEED_POINTS, Utc::now(), tick);
    let feeder = market.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(tick);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            feeder.advance(Utc::now());
            tracing::debug!("Mock market advanced");
        }
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(addr = %addr, tick_secs, "Mock backend listening");

    tokio::select! {
        res = mock::serve(listener, market) => res.context("mock backend server failed")?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Ctrl+C received"),
    }
    tracing::info!("Mock backend stopped");
    Ok(())
}
