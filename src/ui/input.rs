use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

use crate::state::AppState;
use crate::theme::ThemeColors;
use crate::view::SubmitControl;

/// Braille spinner frames for the loading indicator.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the description box with horizontal scrolling for long input.
pub fn render(f: &mut Frame, area: Rect, state: &AppState, theme: &ThemeColors) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.text_dim))
        .title(Span::styled(" description ", Style::default().fg(theme.text_muted)));

    // 2 borders + 1 space prefix
    let inner_width = area.width.saturating_sub(3) as usize;

    if state.input.is_empty() {
        let display_text = Line::from(Span::styled(
            " Describe your diagram...",
            Style::default().fg(theme.text_dim).add_modifier(Modifier::ITALIC),
        ));
        f.render_widget(Paragraph::new(display_text).block(block), area);
        return;
    }

    let chars: Vec<char> = state.input.chars().collect();
    let cursor = state.cursor_pos.min(chars.len());
    let scroll_offset = scroll_offset(&chars, cursor, inner_width);

    // Visible chars up to the available cell width
    let mut used = 0;
    let mut visible_end = scroll_offset;
    while visible_end < chars.len() {
        let w = chars[visible_end].width().unwrap_or(0);
        if used + w > inner_width {
            break;
        }
        used += w;
        visible_end += 1;
    }

    let before: String = chars[scroll_offset..cursor].iter().collect();
    let cursor_char = chars.get(cursor).copied().unwrap_or(' ');
    let after: String = chars
        .get(cursor + 1..visible_end.max(cursor + 1))
        .map(|s| s.iter().collect())
        .unwrap_or_default();

    let left_indicator = if scroll_offset > 0 { "…" } else { " " };

    let display_text = Line::from(vec![
        Span::styled(left_indicator, Style::default().fg(theme.text_dim)),
        Span::styled(before, Style::default().fg(theme.text)),
        Span::styled(
            cursor_char.to_string(),
            Style::default().fg(theme.surface).bg(theme.text),
        ),
        Span::styled(after, Style::default().fg(theme.text)),
    ]);

    f.render_widget(Paragraph::new(display_text).block(block), area);
}

/// First visible char so the cursor cell fits within `width` cells.
fn scroll_offset(chars: &[char], cursor: usize, width: usize) -> usize {
    let cursor_width = chars.get(cursor).and_then(|c| c.width()).unwrap_or(1);
    let mut used = cursor_width;
    let mut start = cursor;
    while start > 0 {
        let w = chars[start - 1].width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start -= 1;
    }
    start
}

/// Render the submit call-to-action, or the loading indicator in its place.
pub fn render_submit(
    f: &mut Frame,
    area: Rect,
    state: &AppState,
    control: SubmitControl,
    theme: &ThemeColors,
) {
    let line = match control {
        SubmitControl::Ready => Line::from(vec![
            Span::styled(" [enter] ", Style::default().fg(theme.text_muted)),
            Span::styled(
                "Generate Diagram",
                Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
            ),
        ]),
        SubmitControl::Disabled => Line::from(vec![
            Span::styled(" [enter] ", Style::default().fg(theme.text_dim)),
            Span::styled("Generate Diagram", Style::default().fg(theme.text_dim)),
        ]),
        SubmitControl::Loading => {
            let frame = SPINNER_FRAMES[state.spinner_tick % SPINNER_FRAMES.len()];
            Line::from(vec![
                Span::styled(format!(" {} ", frame), Style::default().fg(theme.primary)),
                Span::styled("Generating... ", Style::default().fg(theme.text)),
                Span::styled(
                    state.loading_phrase().to_string(),
                    Style::default().fg(theme.text_muted).add_modifier(Modifier::ITALIC),
                ),
            ])
        }
    };
    f.render_widget(Paragraph::new(line), area);
}
