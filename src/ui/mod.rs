pub mod cards;
pub mod chart;
pub mod dashboard;
pub mod format;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use ratatui::layout::{Constraint, Direction as LayoutDirection, Layout};
use ratatui::Frame;

use crate::analysis::AnalysisPanel;
use crate::event::AppEvent;
use crate::model::tick::{Direction, MarketTick};

use cards::{card_rows, MarketCards, CARD_HEIGHT};
use chart::PriceChart;
use dashboard::{AnalysisView, FeedStatus, KeybindBar, LogPanel, StatusBar};

const MAX_LOG_MESSAGES: usize = 200;

pub struct AppState {
    pub selected_symbol: String,
    pub latest: Vec<MarketTick>,
    pub history: Vec<MarketTick>,
    pub directions: HashMap<String, Direction>,
    pub loading: bool,
    pub poll_generation: u64,
    pub stale: bool,
    pub last_poll_error: Option<String>,
    pub last_update: Option<String>,
    pub cycles_ok: u64,
    pub cycles_failed: u64,
    pub analysis: AnalysisPanel,
    pub log_messages: Vec<String>,
    pending_symbol_change: Option<String>,
}

impl AppState {
    pub fn new(default_symbol: &str, reveal_tick: Duration) -> Self {
        Self {
            selected_symbol: default_symbol.to_string(),
            latest: Vec::new(),
            history: Vec::new(),
            directions: HashMap::new(),
            loading: true,
            poll_generation: 0,
            stale: false,
            last_poll_error: None,
            last_update: None,
            cycles_ok: 0,
            cycles_failed: 0,
            analysis: AnalysisPanel::new(reveal_tick),
            log_messages: Vec::new(),
            pending_symbol_change: None,
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    /// Record the generation of the poll task now feeding this state; older events are dropped.
    pub fn set_poll_generation(&mut self, generation: u64) {
        self.poll_generation = generation;
    }

    pub fn feed_status(&self) -> FeedStatus {
        if self.stale {
            FeedStatus::Stale
        } else if self.loading {
            FeedStatus::Loading
        } else {
            FeedStatus::Live
        }
    }

    /// Change the selection. Returns true when it changed; the caller restarts polling
    /// via `take_symbol_change`.
    pub fn select_symbol(&mut self, symbol: &str) -> bool {
        if self.selected_symbol == symbol {
            return false;
        }
        self.selected_symbol = symbol.to_string();
        self.history.clear();
        self.pending_symbol_change = Some(symbol.to_string());
        true
    }

    pub fn select_index(&mut self, index: usize) -> bool {
        match self.latest.get(index).map(|t| t.symbol.clone()) {
            Some(symbol) => self.select_symbol(&symbol),
            None => false,
        }
    }

    /// Move the selection by `offset` cards, wrapping around.
    pub fn cycle_selection(&mut self, offset: isize) -> bool {
        if self.latest.is_empty() {
            return false;
        }
        let len = self.latest.len() as isize;
        let current = self
            .latest
            .iter()
            .position(|t| t.symbol == self.selected_symbol)
            .map(|i| i as isize)
            .unwrap_or(-1);
        let next = if current < 0 && offset < 0 {
            len - 1
        } else {
            (current + offset).rem_euclid(len)
        };
        self.select_index(next as usize)
    }

    pub fn take_symbol_change(&mut self) -> Option<String> {
        self.pending_symbol_change.take()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.latest
            .iter()
            .position(|t| t.symbol == self.selected_symbol)
    }

    pub fn tick(&mut self, now: Instant) {
        self.analysis.advance(now);
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.poll_generation {
            tracing::debug!(
                generation,
                current = self.poll_generation,
                "Dropping event from superseded poll task"
            );
            return false;
        }
        true
    }

    fn apply_latest(&mut self, ticks: Vec<MarketTick>) {
        let previous: HashMap<&str, f64> = self
            .latest
            .iter()
            .map(|t| (t.symbol.as_str(), t.price))
            .collect();
        let mut directions = HashMap::with_capacity(ticks.len());
        for tick in &ticks {
            let direction = match previous.get(tick.symbol.as_str()) {
                Some(&prev) if prev != tick.price => Direction::between(prev, tick.price),
                _ => self.directions.get(&tick.symbol).copied().unwrap_or_default(),
            };
            directions.insert(tick.symbol.clone(), direction);
        }
        self.directions = directions;
        self.latest = ticks;
        self.last_update = Some(chrono::Local::now().format("%H:%M:%S").to_string());

        if let Some(first) = self.latest.first().map(|t| t.symbol.clone()) {
            if self.selected_index().is_none() {
                self.push_log(format!(
                    "[WARN] {} not in snapshot, switching to {}",
                    self.selected_symbol, first
                ));
                self.select_symbol(&first);
            }
        }
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::LatestSnapshot { generation, ticks } => {
                if self.is_current(generation) {
                    self.apply_latest(ticks);
                }
            }
            AppEvent::HistorySeries {
                generation,
                symbol,
                ticks,
            } => {
                if self.is_current(generation) && symbol == self.selected_symbol {
                    self.history = ticks;
                }
            }
            AppEvent::PollCycleComplete { generation } => {
                if self.is_current(generation) {
                    if self.stale {
                        self.push_log("Market feed recovered".to_string());
                    }
                    self.loading = false;
                    self.stale = false;
                    self.last_poll_error = None;
                    self.cycles_ok += 1;
                }
            }
            AppEvent::PollFailed { generation, error } => {
                if self.is_current(generation) {
                    self.stale = true;
                    self.cycles_failed += 1;
                    self.push_log(format!("[WARN] Poll failed: {}", error));
                    self.last_poll_error = Some(error);
                }
            }
            AppEvent::AnalysisReady {
                request_id,
                response,
            } => {
                let symbol = response.symbol.clone();
                if self.analysis.on_ready(request_id, response, Instant::now()) {
                    self.push_log(format!("Analysis ready for {}", symbol));
                }
            }
            AppEvent::AnalysisFailed { request_id, error } => {
                if self.analysis.on_failed(request_id) {
                    self.push_log(format!("[ERR] Analysis failed: {}", error));
                }
            }
            AppEvent::LogMessage(msg) => {
                self.push_log(msg);
            }
        }
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let cards_height = card_rows(state.latest.len(), area.width) * CARD_HEIGHT;
    let outer = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(1),            // status bar
            Constraint::Length(cards_height), // market cards
            Constraint::Min(8),               // chart (+ analysis panel)
            Constraint::Length(5),            // system log
            Constraint::Length(1),            // keybinds
        ])
        .split(area);

    frame.render_widget(
        StatusBar {
            symbol: &state.selected_symbol,
            status: state.feed_status(),
            cycles_ok: state.cycles_ok,
            cycles_failed: state.cycles_failed,
            last_update: state.last_update.as_deref(),
        },
        outer[0],
    );

    frame.render_widget(
        MarketCards::new(&state.latest, &state.directions, &state.selected_symbol),
        outer[1],
    );

    let chart = PriceChart::new(&state.history, &state.selected_symbol).loading(state.loading);
    if state.analysis.visible {
        let main_area = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer[2]);
        frame.render_widget(chart, main_area[0]);
        frame.render_widget(AnalysisView::new(&state.analysis), main_area[1]);
    } else {
        frame.render_widget(chart, outer[2]);
    }

    frame.render_widget(LogPanel::new(&state.log_messages), outer[3]);
    frame.render_widget(KeybindBar, outer[4]);
}
