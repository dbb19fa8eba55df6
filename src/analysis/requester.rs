use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::MarketSource;
use crate::event::AppEvent;

/// Issues one analysis request at a time; a new request aborts the one in flight.
pub struct AnalysisRequester {
    source: Arc<dyn MarketSource>,
    app_tx: mpsc::Sender<AppEvent>,
    next_request_id: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl AnalysisRequester {
    pub fn new(source: Arc<dyn MarketSource>, app_tx: mpsc::Sender<AppEvent>) -> Self {
        Self {
            source,
            app_tx,
            next_request_id: 0,
            in_flight: None,
        }
    }

    pub fn request(&mut self, symbol: &str) -> u64 {
        self.cancel();
        self.next_request_id += 1;
        let request_id = self.next_request_id;

        let source = self.source.clone();
        let tx = self.app_tx.clone();
        let symbol = symbol.to_string();
        self.in_flight = Some(tokio::spawn(async move {
            match source.analyze(&symbol).await {
                Ok(response) => {
                    tracing::info!(
                        symbol = %symbol,
                        request_id,
                        chars = response.analysis.chars().count(),
                        "Analysis received"
                    );
                    let _ = tx
                        .send(AppEvent::AnalysisReady {
                            request_id,
                            response,
                        })
                        .await;
                }
                Err(e) => {
                    tracing::warn!(symbol = %symbol, request_id, error = %e, "Analysis request failed");
                    let _ = tx
                        .send(AppEvent::AnalysisFailed {
                            request_id,
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        }));
        request_id
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }

    pub fn last_request_id(&self) -> u64 {
        self.next_request_id
    }
}

impl Drop for AnalysisRequester {
    fn drop(&mut self) {
        self.cancel();
    }
}
