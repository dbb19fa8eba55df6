use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped price observation for a symbol, as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTick {
    pub time: String,
    pub symbol: String,
    pub price: f64,
}

impl MarketTick {
    pub fn new(symbol: &str, price: f64, time: &str) -> Self {
        Self {
            time: time.to_string(),
            symbol: symbol.to_string(),
            price,
        }
    }

    /// Parse `time` as RFC 3339, falling back to a naive ISO timestamp read as UTC.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.time.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}

/// Direction of the last price move between two consecutive snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Up,
    Down,
    #[default]
    Flat,
}

impl Direction {
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            Self::Up
        } else if current < previous {
            Self::Down
        } else {
            Self::Flat
        }
    }
}
