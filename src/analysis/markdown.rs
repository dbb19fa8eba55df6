//! A small markdown subset: ATX headings, `-`/`*`/`+` list items,
//! `**strong**`, `*emphasis*` and `---` rules. Text is parsed once into nodes and
//! rendered either as an HTML fragment or as styled terminal lines.
//! Unclosed markers stay literal; nesting is not supported.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, inlines: Vec<Inline> },
    ListItem(Vec<Inline>),
    Line(Vec<Inline>),
    Rule,
    Blank,
}

/// One block per source line.
pub fn parse(src: &str) -> Vec<Block> {
    src.split('\n')
        .map(|raw| parse_line(raw.strip_suffix('\r').unwrap_or(raw)))
        .collect()
}

fn parse_line(line: &str) -> Block {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Block::Blank;
    }
    if matches!(trimmed, "---" | "***" | "___") {
        return Block::Rule;
    }
    if let Some((level, rest)) = heading(trimmed) {
        return Block::Heading {
            level,
            inlines: parse_inline(rest.trim()),
        };
    }
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return Block::ListItem(parse_inline(rest.trim_start()));
        }
    }
    Block::Line(parse_inline(line))
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    if rest.is_empty() {
        return Some((hashes as u8, rest));
    }
    rest.strip_prefix(' ').map(|r| (hashes as u8, r))
}

fn parse_inline(src: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut rest = src;

    while let Some(pos) = rest.find('*') {
        text.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(body) = tail.strip_prefix("**") {
            match closing(body, "**") {
                Some(end) => {
                    flush_text(&mut text, &mut out);
                    out.push(Inline::Strong(body[..end].to_string()));
                    rest = &body[end + 2..];
                }
                _ => {
                    text.push_str("**");
                    rest = body;
                }
            }
            continue;
        }

        let body = &tail[1..];
        match closing(body, "*") {
            Some(end) => {
                flush_text(&mut text, &mut out);
                out.push(Inline::Emphasis(body[..end].to_string()));
                rest = &body[end + 1..];
            }
            _ => {
                text.push('*');
                rest = body;
            }
        }
    }

    text.push_str(rest);
    flush_text(&mut text, &mut out);
    out
}

/// Offset of the `marker` that closes a span whose body starts at `body`.
/// A span may not open before whitespace nor close after it, so `2 * 3 * 4` stays literal.
fn closing(body: &str, marker: &str) -> Option<usize> {
    if body.chars().next().map_or(true, char::is_whitespace) {
        return None;
    }
    body.match_indices(marker)
        .map(|(i, _)| i)
        .find(|&i| i > 0 && !body[..i].ends_with(char::is_whitespace))
}

fn flush_text(text: &mut String, out: &mut Vec<Inline>) {
    if !text.is_empty() {
        out.push(Inline::Text(std::mem::take(text)));
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn inlines_html(inlines: &[Inline]) -> String {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(t) => escape_html(t),
            Inline::Strong(t) => format!("<strong>{}</strong>", escape_html(t)),
            Inline::Emphasis(t) => format!("<em>{}</em>", escape_html(t)),
        })
        .collect()
}

/// Source line breaks become `<br/>` between the rendered lines.
pub fn to_html(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|block| match block {
            Block::Heading { level, inlines } => {
                format!("<h{level}>{}</h{level}>", inlines_html(inlines))
            }
            Block::ListItem(inlines) => format!("<li>{}</li>", inlines_html(inlines)),
            Block::Line(inlines) => inlines_html(inlines),
            Block::Rule => "<hr/>".to_string(),
            Block::Blank => String::new(),
        })
        .collect::<Vec<_>>()
        .join("<br/>")
}

pub fn render_html(src: &str) -> String {
    to_html(&parse(src))
}

fn inline_spans(inlines: &[Inline], base: Style) -> Vec<Span<'static>> {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(t) => Span::styled(t.clone(), base),
            Inline::Strong(t) => Span::styled(t.clone(), base.add_modifier(Modifier::BOLD)),
            Inline::Emphasis(t) => Span::styled(t.clone(), base.add_modifier(Modifier::ITALIC)),
        })
        .collect()
}

pub fn to_lines(blocks: &[Block]) -> Vec<Line<'static>> {
    blocks
        .iter()
        .map(|block| match block {
            Block::Heading { level, inlines } => {
                let color = if *level <= 2 { Color::Cyan } else { Color::LightBlue };
                let style = Style::default().fg(color).add_modifier(Modifier::BOLD);
                Line::from(inline_spans(inlines, style))
            }
            Block::ListItem(inlines) => {
                let mut spans = vec![Span::styled("  • ", Style::default().fg(Color::DarkGray))];
                spans.extend(inline_spans(inlines, Style::default().fg(Color::White)));
                Line::from(spans)
            }
            Block::Line(inlines) => Line::from(inline_spans(inlines, Style::default().fg(Color::White))),
            Block::Rule => Line::styled("─".repeat(32), Style::default().fg(Color::DarkGray)),
            Block::Blank => Line::default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_becomes_strong() {
        assert!(render_html("**bold**").contains("<strong>bold</strong>"));
        assert_eq!(
            render_html("price is **up** today"),
            "price is <strong>up</strong> today"
        );
    }

    #[test]
    fn headings_by_level() {
        assert!(render_html("### Title").contains("<h3>Title</h3>"));
        assert_eq!(render_html("# A"), "<h1>A</h1>");
        assert_eq!(render_html("####### seven"), "####### seven");
        assert_eq!(render_html("#hashtag"), "#hashtag");
    }

    #[test]
    fn newlines_become_breaks_in_place() {
        assert_eq!(render_html("a\nb"), "a<br/>b");
        assert_eq!(render_html("a\r\n\r\nb"), "a<br/><br/>b");
    }

    #[test]
    fn summary_with_list() {
        let html = render_html("## Summary\n- up");
        assert!(html.contains("<h2>Summary</h2>"));
        assert!(html.contains("<li>up</li>"));
    }

    #[test]
    fn list_markers_and_emphasis() {
        let blocks = parse("* **Last**: $5\n+ plain\n*note*");
        assert_eq!(
            blocks,
            vec![
                Block::ListItem(vec![
                    Inline::Strong("Last".to_string()),
                    Inline::Text(": $5".to_string()),
                ]),
                Block::ListItem(vec![Inline::Text("plain".to_string())]),
                Block::Line(vec![Inline::Emphasis("note".to_string())]),
            ]
        );
    }

    #[test]
    fn unclosed_markers_stay_literal() {
        assert_eq!(render_html("**open"), "**open");
        assert_eq!(render_html("2 * 3"), "2 * 3");
        assert_eq!(render_html("****"), "****");
    }

    #[test]
    fn spaced_asterisks_are_not_emphasis() {
        assert_eq!(
            render_html("Volume rose 2 * 3 * 4 times"),
            "Volume rose 2 * 3 * 4 times"
        );
        assert_eq!(render_html("a ** b ** c"), "a ** b ** c");
        assert_eq!(render_html("*soft *still* open"), "<em>soft *still</em> open");
        assert_eq!(render_html("x *y* z"), "x <em>y</em> z");
    }

    #[test]
    fn heading_markup_is_not_reparsed_as_text() {
        // Order-independent: a heading containing bold still yields one heading node.
        let html = render_html("## **Risk** notes\nnext");
        assert_eq!(html, "<h2><strong>Risk</strong> notes</h2><br/>next");
    }

    #[test]
    fn rule_and_escaping() {
        assert_eq!(render_html("---"), "<hr/>");
        assert_eq!(render_html("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn terminal_lines_drop_markup() {
        let lines = to_lines(&parse("## Summary\n- **up**"));
        assert_eq!(lines.len(), 2);
        let heading: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(heading, "Summary");
        let item: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(item, "  • up");
        assert!(lines[1].spans[1].style.add_modifier.contains(Modifier::BOLD));
    }
}
