use std::collections::HashMap;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::format::format_price;
use crate::model::tick::{Direction, MarketTick};

pub const CARD_WIDTH: u16 = 24;
pub const CARD_HEIGHT: u16 = 4;

/// Number of card rows needed to lay out `count` cards across `width` columns.
pub fn card_rows(count: usize, width: u16) -> u16 {
    let per_row = (width / CARD_WIDTH).max(1) as usize;
    count.max(1).div_ceil(per_row) as u16
}

pub struct MarketCards<'a> {
    ticks: &'a [MarketTick],
    directions: &'a HashMap<String, Direction>,
    selected: &'a str,
}

impl<'a> MarketCards<'a> {
    pub fn new(
        ticks: &'a [MarketTick],
        directions: &'a HashMap<String, Direction>,
        selected: &'a str,
    ) -> Self {
        Self {
            ticks,
            directions,
            selected,
        }
    }
}

fn direction_span(direction: Direction) -> Span<'static> {
    match direction {
        Direction::Up => Span::styled(" ▲", Style::default().fg(Color::Green)),
        Direction::Down => Span::styled(" ▼", Style::default().fg(Color::Red)),
        Direction::Flat => Span::styled(" •", Style::default().fg(Color::DarkGray)),
    }
}

impl Widget for MarketCards<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.ticks.is_empty() {
            Paragraph::new(Line::styled(
                " Waiting for market data...",
                Style::default().fg(Color::DarkGray),
            ))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .render(area, buf);
            return;
        }

        let per_row = (area.width / CARD_WIDTH).max(1) as usize;
        let rows = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); card_rows(self.ticks.len(), area.width) as usize])
            .split(area);

        for (row_idx, chunk) in self.ticks.chunks(per_row).enumerate() {
            let Some(row_area) = rows.get(row_idx) else {
                break;
            };
            let cols = Layout::default()
                .direction(LayoutDirection::Horizontal)
                .constraints(vec![Constraint::Length(CARD_WIDTH); per_row])
                .split(*row_area);

            for (col_idx, tick) in chunk.iter().enumerate() {
                let index = row_idx * per_row + col_idx;
                let selected = tick.symbol == self.selected;
                let border = if selected {
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let title = if index < 9 {
                    format!(" {} {} ", index + 1, tick.symbol)
                } else {
                    format!(" {} ", tick.symbol)
                };
                let direction = self
                    .directions
                    .get(&tick.symbol)
                    .copied()
                    .unwrap_or_default();
                let line = Line::from(vec![
                    Span::styled(
                        format_price(tick.price),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                    direction_span(direction),
                ]);
                let block = Block::default()
                    .title(Span::styled(title, Style::default().fg(Color::Gray)))
                    .borders(Borders::ALL)
                    .border_style(border);
                Paragraph::new(line).block(block).render(cols[col_idx], buf);
            }
        }
    }
}
