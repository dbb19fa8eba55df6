pub mod export;
pub mod markdown;
pub mod panel;
pub mod requester;
pub mod reveal;

pub use panel::{AnalysisPanel, ANALYSIS_FAILED_MESSAGE};
pub use requester::AnalysisRequester;
pub use reveal::{Reveal, RevealClock};
