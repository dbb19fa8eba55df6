use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::error::AppError;
use crate::model::analysis::{AnalysisRequest, AnalysisResponse};
use crate::model::tick::MarketTick;

use super::MarketSource;

/// Generous by default: the analyze endpoint waits on a full report generation.
pub const DEFAULT_ANALYZE_TIMEOUT: Duration = Duration::from_secs(120);

pub struct MarketRestClient {
    http: reqwest::Client,
    base_url: Url,
    analyze_timeout: Duration,
}

impl MarketRestClient {
    /// `timeout` bounds the polling endpoints; analyze requests use
    /// `DEFAULT_ANALYZE_TIMEOUT` unless overridden with `with_analyze_timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "backend URL '{}' cannot carry a path",
                base_url
            )));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            analyze_timeout: DEFAULT_ANALYZE_TIMEOUT,
        })
    }

    pub fn with_analyze_timeout(mut self, timeout: Duration) -> Self {
        self.analyze_timeout = timeout;
        self
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("backend URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn history_url(&self, symbol: &str, limit: usize) -> Result<Url, AppError> {
        let mut url = self.endpoint(&["api", "market", "history", symbol])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, AppError> {
        let status = resp.status();
        let url = resp.url().to_string();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), %url, body = %body, "Backend error body");
            return Err(AppError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MarketSource for MarketRestClient {
    async fn latest(&self) -> Result<Vec<MarketTick>, AppError> {
        let url = self.endpoint(&["api", "market", "latest"])?;
        let resp = self.http.get(url).send().await?;
        Self::decode(resp).await
    }

    async fn history(&self, symbol: &str, limit: usize) -> Result<Vec<MarketTick>, AppError> {
        let url = self.history_url(symbol, limit)?;
        let resp = self.http.get(url).send().await?;
        Self::decode(resp).await
    }

    async fn analyze(&self, symbol: &str) -> Result<AnalysisResponse, AppError> {
        let url = self.endpoint(&["api", "ai", "analyze"])?;
        tracing::info!(symbol, "Requesting analysis");
        let resp = self
            .http
            .post(url)
            .timeout(self.analyze_timeout)
            .json(&AnalysisRequest {
                symbol: symbol.to_string(),
            })
            .send()
            .await?;
        Self::decode(resp).await
    }
}
