use std::time::{Duration, Instant};

use super::markdown;
use super::reveal::{Reveal, RevealClock};
use crate::model::analysis::AnalysisResponse;

pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis request failed. Please try again later.";

/// View state of the analysis panel: flags, the active request, and the reveal sequence.
#[derive(Debug, Clone)]
pub struct AnalysisPanel {
    pub visible: bool,
    pub loading: bool,
    pub symbol: Option<String>,
    pub generated_at: Option<String>,
    pub error: Option<String>,
    active_request: Option<u64>,
    reveal: Reveal,
    clock: RevealClock,
}

impl AnalysisPanel {
    pub fn new(tick: Duration) -> Self {
        Self {
            visible: false,
            loading: false,
            symbol: None,
            generated_at: None,
            error: None,
            active_request: None,
            reveal: Reveal::Idle,
            clock: RevealClock::new(tick),
        }
    }

    /// A new request supersedes whatever was loading or revealing before.
    pub fn begin(&mut self, request_id: u64, symbol: &str) {
        self.visible = true;
        self.loading = true;
        self.symbol = Some(symbol.to_string());
        self.generated_at = None;
        self.error = None;
        self.active_request = Some(request_id);
        self.reveal.cancel();
        self.clock.stop();
    }

    /// Returns false when the response belongs to a superseded request.
    pub fn on_ready(&mut self, request_id: u64, response: AnalysisResponse, now: Instant) -> bool {
        if self.active_request != Some(request_id) {
            return false;
        }
        self.active_request = None;
        self.generated_at = Some(response.generated_at);
        self.reveal = Reveal::start(response.analysis);
        self.clock.reset(now);
        if self.reveal.is_done() {
            self.loading = false;
        }
        true
    }

    pub fn on_failed(&mut self, request_id: u64) -> bool {
        if self.active_request != Some(request_id) {
            return false;
        }
        self.active_request = None;
        self.reveal.cancel();
        self.clock.stop();
        self.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
        self.loading = false;
        true
    }

    pub fn advance(&mut self, now: Instant) {
        if !self.reveal.is_active() {
            return;
        }
        let steps = self.clock.due_steps(now);
        if steps > 0 {
            self.reveal.step(steps);
        }
        if self.reveal.is_done() {
            self.clock.stop();
            self.loading = false;
        }
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.loading = false;
        self.active_request = None;
        self.reveal.cancel();
        self.clock.stop();
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_active()
    }

    pub fn reveal(&self) -> &Reveal {
        &self.reveal
    }

    pub fn active_request(&self) -> Option<u64> {
        self.active_request
    }

    /// What the panel currently shows, in source (markdown) form.
    pub fn display_text(&self) -> &str {
        match &self.error {
            Some(msg) => msg.as_str(),
            None => self.reveal.visible(),
        }
    }

    pub fn html(&self) -> String {
        markdown::render_html(self.display_text())
    }

    /// HTML of a completed, successful report; `None` while loading, after a
    /// failure, or when nothing was returned.
    pub fn exportable_html(&self) -> Option<String> {
        if self.loading || self.error.is_some() || !self.reveal.is_done() {
            return None;
        }
        if self.reveal.visible().is_empty() {
            return None;
        }
        Some(self.html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(text: &str) -> AnalysisResponse {
        AnalysisResponse {
            symbol: "BTC-USD".to_string(),
            analysis: text.to_string(),
            generated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn reveal_completes_and_clears_loading() {
        let t0 = Instant::now();
        let mut panel = AnalysisPanel::new(Duration::from_millis(10));
        panel.begin(1, "BTC-USD");
        assert!(panel.visible && panel.loading);

        assert!(panel.on_ready(1, response("## Summary\n- up"), t0));
        assert_eq!(panel.display_text(), "");
        panel.advance(t0 + Duration::from_millis(30));
        assert_eq!(panel.display_text(), "## ");
        assert!(panel.loading);

        panel.advance(t0 + Duration::from_secs(1));
        assert_eq!(panel.display_text(), "## Summary\n- up");
        assert!(!panel.loading);
        let html = panel.html();
        assert!(html.contains("<h2>Summary</h2>"));
        assert!(html.contains("<li>up</li>"));
    }

    #[test]
    fn failure_shows_fixed_message_immediately() {
        let mut panel = AnalysisPanel::new(Duration::from_millis(10));
        panel.begin(3, "BTC-USD");
        assert!(panel.on_failed(3));
        assert!(!panel.loading);
        assert_eq!(panel.display_text(), ANALYSIS_FAILED_MESSAGE);
    }

    #[test]
    fn superseded_responses_are_dropped() {
        let t0 = Instant::now();
        let mut panel = AnalysisPanel::new(Duration::from_millis(10));
        panel.begin(1, "BTC-USD");
        panel.begin(2, "ETH-USD");
        assert!(!panel.on_ready(1, response("old"), t0));
        assert!(!panel.on_failed(1));
        assert!(panel.loading);
        assert!(panel.on_ready(2, response("new"), t0));
    }

    #[test]
    fn new_request_cancels_active_reveal() {
        let t0 = Instant::now();
        let mut panel = AnalysisPanel::new(Duration::from_millis(10));
        panel.begin(1, "BTC-USD");
        panel.on_ready(1, response("long text here"), t0);
        panel.advance(t0 + Duration::from_millis(50));
        assert!(panel.is_revealing());

        panel.begin(2, "BTC-USD");
        assert!(!panel.is_revealing());
        assert_eq!(panel.display_text(), "");
        panel.advance(t0 + Duration::from_secs(5));
        assert_eq!(panel.display_text(), "");
    }

    #[test]
    fn only_completed_reports_are_exportable() {
        let t0 = Instant::now();
        let mut panel = AnalysisPanel::new(Duration::from_millis(10));
        assert_eq!(panel.exportable_html(), None);

        panel.begin(1, "BTC-USD");
        panel.on_ready(1, response("**up**"), t0);
        panel.advance(t0 + Duration::from_millis(20));
        assert_eq!(panel.exportable_html(), None);

        panel.advance(t0 + Duration::from_secs(1));
        assert_eq!(panel.exportable_html().as_deref(), Some("<strong>up</strong>"));

        panel.begin(2, "BTC-USD");
        assert!(panel.on_failed(2));
        assert_eq!(panel.display_text(), ANALYSIS_FAILED_MESSAGE);
        assert_eq!(panel.exportable_html(), None);
    }

    #[test]
    fn empty_analysis_finishes_without_reveal() {
        let mut panel = AnalysisPanel::new(Duration::from_millis(10));
        panel.begin(1, "BTC-USD");
        panel.on_ready(1, response(""), Instant::now());
        assert!(!panel.loading);
    }
}
