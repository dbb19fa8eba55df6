use crate::model::analysis::AnalysisResponse;
use crate::model::tick::MarketTick;

/// Messages from background tasks to the terminal loop.
///
/// Poll events carry the generation of the poll task that produced them and
/// analysis events carry their request id, so the state holder can drop
/// anything that was superseded while in flight.
#[derive(Debug, Clone)]
pub enum AppEvent {
    LatestSnapshot {
        generation: u64,
        ticks: Vec<MarketTick>,
    },
    HistorySeries {
        generation: u64,
        symbol: String,
        ticks: Vec<MarketTick>,
    },
    PollCycleComplete {
        generation: u64,
    },
    PollFailed {
        generation: u64,
        error: String,
    },
    AnalysisReady {
        request_id: u64,
        response: AnalysisResponse,
    },
    AnalysisFailed {
        request_id: u64,
        error: String,
    },
    /// Free-form line for the in-app system log.
    LogMessage(String),
}
