use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::analysis::markdown;
use crate::analysis::AnalysisPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Loading,
    Live,
    Stale,
}

pub struct StatusBar<'a> {
    pub symbol: &'a str,
    pub status: FeedStatus,
    pub cycles_ok: u64,
    pub cycles_failed: u64,
    pub last_update: Option<&'a str>,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let feed = match self.status {
            FeedStatus::Loading => Span::styled("LOADING", Style::default().fg(Color::Yellow)),
            FeedStatus::Live => Span::styled("LIVE", Style::default().fg(Color::Green)),
            FeedStatus::Stale => Span::styled(
                "STALE",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        };

        let line = Line::from(vec![
            Span::styled(
                " market-pulse ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.symbol, Style::default().fg(Color::Cyan)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            feed,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("polls ok:{} fail:{}", self.cycles_ok, self.cycles_failed),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("updated {}", self.last_update.unwrap_or("--:--:--")),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct AnalysisView<'a> {
    panel: &'a AnalysisPanel,
}

impl<'a> AnalysisView<'a> {
    pub fn new(panel: &'a AnalysisPanel) -> Self {
        Self { panel }
    }
}

impl Widget for AnalysisView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let symbol = self.panel.symbol.as_deref().unwrap_or("-");
        let mut title = vec![
            Span::styled(" AI Analysis ", Style::default().fg(Color::Magenta)),
            Span::styled(format!("{} ", symbol), Style::default().fg(Color::Cyan)),
        ];
        if self.panel.loading {
            title.push(Span::styled("(generating...) ", Style::default().fg(Color::Yellow)));
        }

        let lines = if let Some(err) = &self.panel.error {
            vec![Line::styled(err.clone(), Style::default().fg(Color::Red))]
        } else if self.panel.display_text().is_empty() && self.panel.loading {
            vec![Line::styled(
                "Waiting for the analysis service...",
                Style::default().fg(Color::DarkGray),
            )]
        } else {
            let mut lines = markdown::to_lines(&markdown::parse(self.panel.display_text()));
            if let Some(at) = self.panel.generated_at.as_deref().filter(|_| !self.panel.loading) {
                lines.push(Line::default());
                lines.push(Line::styled(
                    format!("generated at {}", at),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            lines
        };

        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block)
            .render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(visible);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::Gray
                };
                Line::styled(msg.as_str(), Style::default().fg(color))
            })
            .collect();

        let block = Block::default()
            .title(" System Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = Style::default().fg(Color::Yellow);
        let text = Style::default().fg(Color::DarkGray);
        let line = Line::from(vec![
            Span::styled(" [Q]", key),
            Span::styled("uit  ", text),
            Span::styled("[A]", key),
            Span::styled("nalyze  ", text),
            Span::styled("[C]", key),
            Span::styled("lose  ", text),
            Span::styled("[X]", key),
            Span::styled(" export  ", text),
            Span::styled("[R]", key),
            Span::styled("efresh  ", text),
            Span::styled("[←/→ 1-9]", key),
            Span::styled(" symbol", text),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
