use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use super::format::{format_clock, format_price};
use crate::model::tick::MarketTick;

/// Price line over the chronological history series.
pub struct PriceChart<'a> {
    ticks: &'a [MarketTick],
    symbol: &'a str,
    loading: bool,
}

impl<'a> PriceChart<'a> {
    pub fn new(ticks: &'a [MarketTick], symbol: &'a str) -> Self {
        Self {
            ticks,
            symbol,
            loading: false,
        }
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }
}

/// Min/max of the series, widened when flat so the line stays inside the plot.
pub fn price_bounds(ticks: &[MarketTick]) -> Option<[f64; 2]> {
    let min = ticks.iter().map(|t| t.price).fold(f64::INFINITY, f64::min);
    let max = ticks.iter().map(|t| t.price).fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    let pad = ((max - min) * 0.05).max(max.abs() * 0.0005).max(0.0001);
    Some([min - pad, max + pad])
}

fn axis_time_label(tick: Option<&MarketTick>) -> String {
    tick.and_then(MarketTick::timestamp)
        .map(format_clock)
        .unwrap_or_default()
}

impl Widget for PriceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Line::from(vec![
                Span::styled(format!(" {} ", self.symbol), Style::default().fg(Color::LightBlue)),
                Span::styled("live trend ", Style::default().fg(Color::Gray)),
            ]))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        if self.loading || self.ticks.is_empty() {
            let msg = if self.loading {
                "Loading data..."
            } else {
                "No history yet"
            };
            let inner = block.inner(area);
            block.render(area, buf);
            let mid = Rect {
                y: inner.y + inner.height / 2,
                height: inner.height.min(1),
                ..inner
            };
            Paragraph::new(Line::styled(msg, Style::default().fg(Color::DarkGray)))
                .alignment(Alignment::Center)
                .render(mid, buf);
            return;
        }

        let points: Vec<(f64, f64)> = self
            .ticks
            .iter()
            .enumerate()
            .map(|(i, t)| (i as f64, t.price))
            .collect();
        let Some([y_min, y_max]) = price_bounds(self.ticks) else {
            block.render(area, buf);
            return;
        };
        let x_max = (points.len().saturating_sub(1)).max(1) as f64;

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Blue))
            .data(&points);

        let label_style = Style::default().fg(Color::DarkGray);
        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .style(label_style)
                    .bounds([0.0, x_max])
                    .labels(vec![
                        Span::raw(axis_time_label(self.ticks.first())),
                        Span::raw(axis_time_label(self.ticks.last())),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .style(label_style)
                    .bounds([y_min, y_max])
                    .labels(vec![
                        Span::raw(format_price(y_min)),
                        Span::raw(format_price(y_max)),
                    ]),
            );
        chart.render(area, buf);
    }
}
