use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::state::AppState;
use crate::theme::ThemeColors;
use crate::view::Body;

pub const EMPTY_STATE: &str = "Your diagram will appear here.";

/// Statement keywords that open a line of markup.
const KEYWORDS: &[&str] = &[
    "graph",
    "flowchart",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "gantt",
    "pie",
    "journey",
    "mindmap",
    "timeline",
    "subgraph",
    "end",
    "participant",
    "actor",
    "class",
    "state",
    "section",
    "title",
];

const ARROWS: &[&str] = &["-->", "---", "==>", "-.->", "->>", "-->>", "->", "--"];

/// Render the main area: diagram, loading placeholder or empty state.
pub fn render(f: &mut Frame, area: Rect, body: Body<'_>, state: &AppState, theme: &ThemeColors) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.text_dim));

    let lines = match body {
        Body::Diagram(markup) => {
            let block = block.title(Span::styled(
                " diagram ",
                Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
            ));
            let lines: Vec<Line> = markup.lines().map(|l| highlight(l, theme)).collect();
            let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
            f.render_widget(paragraph, area);
            return;
        }
        Body::Loading => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}...", state.loading_phrase()),
                Style::default().fg(theme.text_muted).add_modifier(Modifier::ITALIC),
            )),
        ],
        Body::Empty => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}", EMPTY_STATE),
                Style::default().fg(theme.text_dim),
            )),
            Line::from(Span::styled(
                "  describe it above and press enter",
                Style::default().fg(theme.text_dim).add_modifier(Modifier::ITALIC),
            )),
        ],
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Single-line error banner.
pub fn render_banner(f: &mut Frame, area: Rect, message: &str, theme: &ThemeColors) {
    let line = Line::from(vec![
        Span::styled(" ✗ ", Style::default().fg(theme.error).add_modifier(Modifier::BOLD)),
        Span::styled(message.to_string(), Style::default().fg(theme.error)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// Color the leading keyword and arrows of one markup line.
fn highlight<'a>(line: &'a str, theme: &ThemeColors) -> Line<'a> {
    let mut spans = Vec::new();
    let mut rest = line;

    let indent_len = rest.len() - rest.trim_start().len();
    if indent_len > 0 {
        spans.push(Span::raw(&rest[..indent_len]));
        rest = &rest[indent_len..];
    }

    let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    if KEYWORDS.contains(&rest[..word_end].trim_end_matches(';')) {
        spans.push(Span::styled(
            &rest[..word_end],
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ));
        rest = &rest[word_end..];
    }

    while !rest.is_empty() {
        match find_arrow(rest) {
            Some((start, len)) => {
                if start > 0 {
                    spans.push(Span::styled(&rest[..start], Style::default().fg(theme.text)));
                }
                spans.push(Span::styled(
                    &rest[start..start + len],
                    Style::default().fg(theme.accent),
                ));
                rest = &rest[start + len..];
            }
            None => {
                spans.push(Span::styled(rest, Style::default().fg(theme.text)));
                break;
            }
        }
    }

    Line::from(spans)
}

/// Earliest arrow in `s`, preferring the longest at that position.
fn find_arrow(s: &str) -> Option<(usize, usize)> {
    ARROWS
        .iter()
        .filter_map(|a| s.find(a).map(|i| (i, a.len())))
        .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
}
