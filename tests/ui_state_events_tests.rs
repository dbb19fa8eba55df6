use std::time::Duration;

use market_pulse::event::AppEvent;
use market_pulse::model::tick::{Direction, MarketTick};
use market_pulse::ui::dashboard::FeedStatus;
use market_pulse::ui::AppState;

fn state(symbol: &str) -> AppState {
    let mut state = AppState::new(symbol, Duration::from_millis(15));
    state.set_poll_generation(1);
    state
}

fn snapshot(generation: u64, prices: &[(&str, f64)]) -> AppEvent {
    AppEvent::LatestSnapshot {
        generation,
        ticks: prices
            .iter()
            .map(|(s, p)| MarketTick::new(s, *p, "2024-01-01T00:00:00Z"))
            .collect(),
    }
}

#[test]
/// Verifies a snapshot replaces the card list wholesale rather than merging.
fn latest_snapshot_replaces_cards() {
    let mut state = state("BTC-USD");
    state.apply(snapshot(1, &[("BTC-USD", 65000.0), ("ETH-USD", 3000.0)]));
    state.apply(snapshot(1, &[("BTC-USD", 65100.0)]));

    assert_eq!(state.latest.len(), 1);
    assert_eq!(state.latest[0].price, 65100.0);
    assert!(!state.directions.contains_key("ETH-USD"));
}

#[test]
fn first_successful_cycle_clears_loading() {
    let mut state = state("BTC-USD");
    assert_eq!(state.feed_status(), FeedStatus::Loading);

    state.apply(snapshot(1, &[("BTC-USD", 65000.0)]));
    state.apply(AppEvent::PollCycleComplete { generation: 1 });

    assert!(!state.loading);
    assert_eq!(state.feed_status(), FeedStatus::Live);
    assert_eq!(state.cycles_ok, 1);
    assert!(state.last_update.is_some());
}

#[test]
/// Verifies a failed poll keeps the previous data on screen and marks the feed stale
/// until the next successful cycle.
fn failed_poll_keeps_data_and_marks_stale() {
    let mut state = state("BTC-USD");
    state.apply(snapshot(1, &[("BTC-USD", 65000.0)]));
    state.apply(AppEvent::PollCycleComplete { generation: 1 });

    state.apply(AppEvent::PollFailed {
        generation: 1,
        error: "backend returned 500".to_string(),
    });
    assert_eq!(state.latest.len(), 1);
    assert_eq!(state.feed_status(), FeedStatus::Stale);
    assert_eq!(state.cycles_failed, 1);
    assert_eq!(state.last_poll_error.as_deref(), Some("backend returned 500"));

    state.apply(AppEvent::PollCycleComplete { generation: 1 });
    assert_eq!(state.feed_status(), FeedStatus::Live);
    assert!(state.last_poll_error.is_none());
    assert!(state
        .log_messages
        .iter()
        .any(|m| m.contains("Market feed recovered")));
}

#[test]
/// Verifies events from a superseded poll task never reach the view.
fn superseded_generation_is_dropped() {
    let mut state = state("BTC-USD");
    state.set_poll_generation(2);

    state.apply(snapshot(1, &[("BTC-USD", 1.0)]));
    state.apply(AppEvent::HistorySeries {
        generation: 1,
        symbol: "BTC-USD".to_string(),
        ticks: vec![MarketTick::new("BTC-USD", 1.0, "2024-01-01T00:00:00Z")],
    });
    state.apply(AppEvent::PollFailed {
        generation: 1,
        error: "late".to_string(),
    });

    assert!(state.latest.is_empty());
    assert!(state.history.is_empty());
    assert!(!state.stale);
}

#[test]
fn history_for_another_symbol_is_ignored() {
    let mut state = state("BTC-USD");
    state.apply(AppEvent::HistorySeries {
        generation: 1,
        symbol: "ETH-USD".to_string(),
        ticks: vec![MarketTick::new("ETH-USD", 3000.0, "2024-01-01T00:00:00Z")],
    });
    assert!(state.history.is_empty());
}

#[test]
/// Verifies a selection missing from a non-empty snapshot falls back to the first symbol.
fn missing_selection_switches_to_first_symbol() {
    let mut state = state("DOGE-USD");
    state.apply(snapshot(1, &[("AAPL", 185.5), ("BTC-USD", 65000.0)]));

    assert_eq!(state.selected_symbol, "AAPL");
    assert_eq!(state.take_symbol_change().as_deref(), Some("AAPL"));
    assert_eq!(state.take_symbol_change(), None);
    assert!(state.log_messages.iter().any(|m| m.contains("DOGE-USD")));
}

#[test]
fn empty_snapshot_keeps_selection() {
    let mut state = state("BTC-USD");
    state.apply(snapshot(1, &[]));
    assert_eq!(state.selected_symbol, "BTC-USD");
    assert_eq!(state.take_symbol_change(), None);
}

#[test]
/// Verifies arrows come from consecutive snapshots and survive an unchanged price.
fn directions_follow_consecutive_snapshots() {
    let mut state = state("BTC-USD");
    state.apply(snapshot(1, &[("BTC-USD", 100.0), ("ETH-USD", 50.0)]));
    assert_eq!(state.directions["BTC-USD"], Direction::Flat);

    state.apply(snapshot(1, &[("BTC-USD", 101.0), ("ETH-USD", 49.0)]));
    assert_eq!(state.directions["BTC-USD"], Direction::Up);
    assert_eq!(state.directions["ETH-USD"], Direction::Down);

    state.apply(snapshot(1, &[("BTC-USD", 101.0), ("ETH-USD", 49.0)]));
    assert_eq!(state.directions["BTC-USD"], Direction::Up);
    assert_eq!(state.directions["ETH-USD"], Direction::Down);
}

#[test]
fn selecting_a_card_clears_history_and_requests_restart() {
    let mut state = state("BTC-USD");
    state.apply(snapshot(1, &[("BTC-USD", 65000.0), ("ETH-USD", 3000.0)]));
    state.apply(AppEvent::HistorySeries {
        generation: 1,
        symbol: "BTC-USD".to_string(),
        ticks: vec![MarketTick::new("BTC-USD", 65000.0, "2024-01-01T00:00:00Z")],
    });
    assert_eq!(state.history.len(), 1);

    assert!(!state.select_symbol("BTC-USD"));
    assert!(state.select_index(1));
    assert_eq!(state.selected_symbol, "ETH-USD");
    assert!(state.history.is_empty());
    assert_eq!(state.take_symbol_change().as_deref(), Some("ETH-USD"));
    assert!(!state.select_index(9));
}

#[test]
fn cycle_selection_wraps_both_ways() {
    let mut state = state("AAPL");
    state.apply(snapshot(1, &[("AAPL", 1.0), ("MSFT", 2.0), ("GOOGL", 3.0)]));

    assert!(state.cycle_selection(-1));
    assert_eq!(state.selected_symbol, "GOOGL");
    assert!(state.cycle_selection(1));
    assert_eq!(state.selected_symbol, "AAPL");
    assert!(state.cycle_selection(1));
    assert_eq!(state.selected_symbol, "MSFT");
}

#[test]
fn log_is_bounded() {
    let mut state = state("BTC-USD");
    for i in 0..250 {
        state.apply(AppEvent::LogMessage(format!("line {}", i)));
    }
    assert_eq!(state.log_messages.len(), 200);
    assert_eq!(state.log_messages[0], "line 50");
}
