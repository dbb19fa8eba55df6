//! In-memory stand-in for the market backend, used by the `mock-backend` binary
//! and by the HTTP integration tests. Prices follow a deterministic bounded
//! oscillation around fixed base prices; there is no analytics and no AI here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::model::analysis::{AnalysisRequest, AnalysisResponse};
use crate::model::tick::MarketTick;
use crate::ui::format::format_price;

pub const TRACKED_SYMBOLS: [(&str, f64); 6] = [
    ("AAPL", 185.50),
    ("GOOGL", 142.30),
    ("MSFT", 378.90),
    ("BTC-USD", 42500.00),
    ("ETH-USD", 2280.50),
    ("EURUSD=X", 1.0850),
];

const DEFAULT_HISTORY_LIMIT: usize = 100;
const MAX_POINTS_PER_SYMBOL: usize = 2_000;

#[derive(Debug, Default)]
struct MockState {
    /// Chronological per symbol.
    series: HashMap<String, Vec<MarketTick>>,
    /// Symbols in first-seen order, so `latest` is stable.
    order: Vec<String>,
    step: u64,
    failing: bool,
    analyses: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct MockMarket {
    inner: Arc<Mutex<MockState>>,
}

/// Base price moved by at most 1%, rounded to cents (or 1e-4 for sub-10 quotes).
pub fn synthetic_price(base: f64, step: u64) -> f64 {
    let price = base * (1.0 + 0.01 * (step as f64 * 0.7).sin());
    let scale = if base >= 10.0 { 100.0 } else { 10_000.0 };
    (price * scale).round() / scale
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl MockMarket {
    pub fn new() -> Self {
        Self::default()
    }

    /// `points` synthetic ticks per tracked symbol, `spacing` apart, the last one at `end`.
    pub fn seeded(points: usize, end: DateTime<Utc>, spacing: std::time::Duration) -> Self {
        let market = Self::new();
        let spacing = ChronoDuration::from_std(spacing).unwrap_or_else(|_| ChronoDuration::seconds(5));
        for i in (0..points).rev() {
            market.advance(end - spacing * i as i32);
        }
        market
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only means a handler panicked mid-update; the data is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, tick: MarketTick) {
        let mut state = self.state();
        if !state.series.contains_key(&tick.symbol) {
            state.order.push(tick.symbol.clone());
        }
        let series = state.series.entry(tick.symbol.clone()).or_default();
        series.push(tick);
        if series.len() > MAX_POINTS_PER_SYMBOL {
            let excess = series.len() - MAX_POINTS_PER_SYMBOL;
            series.drain(..excess);
        }
    }

    /// Append one synthetic tick per tracked symbol stamped `at`.
    pub fn advance(&self, at: DateTime<Utc>) {
        let step = {
            let mut state = self.state();
            state.step += 1;
            state.step
        };
        let time = format_time(at);
        for (symbol, base) in TRACKED_SYMBOLS {
            self.push(MarketTick::new(symbol, synthetic_price(base, step), &time));
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    pub fn set_analysis(&self, symbol: &str, text: &str) {
        self.state()
            .analyses
            .insert(symbol.to_string(), text.to_string());
    }

    pub fn latest(&self) -> Vec<MarketTick> {
        let state = self.state();
        state
            .order
            .iter()
            .filter_map(|symbol| state.series.get(symbol).and_then(|s| s.last().cloned()))
            .collect()
    }

    /// Most-recent-first, at most `limit` points.
    pub fn history(&self, symbol: &str, limit: usize) -> Option<Vec<MarketTick>> {
        let state = self.state();
        state
            .series
            .get(symbol)
            .map(|s| s.iter().rev().take(limit).cloned().collect())
    }

    pub fn analysis(&self, symbol: &str) -> Option<String> {
        let state = self.state();
        if let Some(text) = state.analyses.get(symbol) {
            return Some(text.clone());
        }
        let series = state.series.get(symbol)?;
        let last = series.last()?;
        Some(format!(
            "## {} Snapshot\n\n- **Last price**: {}\n- **Points on record**: {}\n\n---\n*Mock backend report for local development.*",
            symbol,
            format_price(last.price),
            series.len()
        ))
    }

    fn is_failing(&self) -> bool {
        self.state().failing
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn latest_handler(
    State(market): State<MockMarket>,
) -> Result<Json<Vec<MarketTick>>, StatusCode> {
    if market.is_failing() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(market.latest()))
}

async fn history_handler(
    State(market): State<MockMarket>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MarketTick>>, StatusCode> {
    if market.is_failing() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(market.history(&symbol, limit).unwrap_or_default()))
}

async fn analyze_handler(
    State(market): State<MockMarket>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, StatusCode> {
    if market.is_failing() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let analysis = market.analysis(&req.symbol).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(AnalysisResponse {
        symbol: req.symbol,
        analysis,
        generated_at: format_time(Utc::now()),
    }))
}

pub fn router(market: MockMarket) -> Router {
    Router::new()
        .route("/api/market/latest", get(latest_handler))
        .route("/api/market/history/{symbol}", get(history_handler))
        .route("/api/ai/analyze", post(analyze_handler))
        .with_state(market)
}

pub async fn serve(listener: TcpListener, market: MockMarket) -> std::io::Result<()> {
    axum::serve(listener, router(market)).await
}
