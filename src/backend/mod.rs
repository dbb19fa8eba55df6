pub mod rest;

use async_trait::async_trait;

use crate::error::AppError;
use crate::model::analysis::AnalysisResponse;
use crate::model::tick::MarketTick;

/// The HTTP collaborator the dashboard polls. Implemented by the REST client and by test fakes.
#[async_trait]
pub trait MarketSource: Send + Sync + 'static {
    /// `GET /api/market/latest`: most recent tick per tracked symbol.
    async fn latest(&self) -> Result<Vec<MarketTick>, AppError>;

    /// `GET /api/market/history/{symbol}?limit=N`: most-recent-first.
    async fn history(&self, symbol: &str, limit: usize) -> Result<Vec<MarketTick>, AppError>;

    /// `POST /api/ai/analyze`.
    async fn analyze(&self, symbol: &str) -> Result<AnalysisResponse, AppError>;
}
