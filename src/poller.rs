use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::backend::MarketSource;
use crate::error::AppError;
use crate::event::AppEvent;

/// Periodic fetcher bound to one symbol at a time.
///
/// Each `start` aborts the running task (and whatever request it is awaiting)
/// before spawning the next one, so at most one interval timer is ever live.
/// Every event the task emits is tagged with its generation.
pub struct Poller {
    source: Arc<dyn MarketSource>,
    app_tx: mpsc::Sender<AppEvent>,
    interval: Duration,
    history_limit: usize,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn MarketSource>,
        app_tx: mpsc::Sender<AppEvent>,
        interval: Duration,
        history_limit: usize,
    ) -> Self {
        Self {
            source,
            app_tx,
            interval,
            history_limit,
            generation: 0,
            task: None,
        }
    }

    /// Cancel the current task and poll `symbol` immediately, then every interval.
    /// Returns the generation of the new task.
    pub fn start(&mut self, symbol: &str) -> u64 {
        self.stop();
        self.generation += 1;
        let generation = self.generation;

        tracing::info!(symbol, generation, "Starting poll task");
        let source = self.source.clone();
        let tx = self.app_tx.clone();
        let symbol = symbol.to_string();
        let interval = self.interval;
        let limit = self.history_limit;
        self.task = Some(tokio::spawn(async move {
            let _ = tx
                .send(AppEvent::LogMessage(format!(
                    "Polling {} every {}s",
                    symbol,
                    interval.as_secs_f64()
                )))
                .await;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let _ = fetch_cycle(source.as_ref(), &tx, &symbol, limit, generation).await;
                if tx.is_closed() {
                    tracing::info!(generation, "Event channel closed, poll task exiting");
                    break;
                }
            }
        }));
        generation
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(generation = self.generation, "Poll task aborted");
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One poll cycle: latest snapshot, then the symbol's history in chronological order.
///
/// A failing step ends the cycle; steps already delivered stay applied.
pub async fn fetch_cycle(
    source: &dyn MarketSource,
    app_tx: &mpsc::Sender<AppEvent>,
    symbol: &str,
    history_limit: usize,
    generation: u64,
) -> Result<(), AppError> {
    let result: Result<(), AppError> = async {
        let ticks = source.latest().await?;
        let _ = app_tx
            .send(AppEvent::LatestSnapshot { generation, ticks })
            .await;

        let mut ticks = source.history(symbol, history_limit).await?;
        ticks.reverse();
        let _ = app_tx
            .send(AppEvent::HistorySeries {
                generation,
                symbol: symbol.to_string(),
                ticks,
            })
            .await;
        Ok(())
    }
    .await;

    match &result {
        Ok(()) => {
            let _ = app_tx
                .send(AppEvent::PollCycleComplete { generation })
                .await;
        }
        Err(e) => {
            tracing::warn!(symbol, generation, error = %e, "Poll cycle failed");
            let _ = app_tx
                .send(AppEvent::PollFailed {
                    generation,
                    error: e.to_string(),
                })
                .await;
        }
    }
    result
}
