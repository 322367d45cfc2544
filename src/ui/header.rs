use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::theme::ThemeColors;

const BUTTON_LABEL: &str = " theme ▾ ";

/// Render the title row. Returns the area of the theme button.
pub fn render(f: &mut Frame, area: Rect, menu_open: bool, theme: &ThemeColors) -> Rect {
    let title = Line::from(vec![
        Span::styled(
            " text → mermaid",
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" visualizer", Style::default().fg(theme.text_muted)),
    ]);
    f.render_widget(Paragraph::new(title), area);

    let width = BUTTON_LABEL.chars().count() as u16;
    let button = Rect {
        x: area.right().saturating_sub(width + 1),
        y: area.y,
        width: width.min(area.width),
        height: area.height.min(1),
    };

    let style = if menu_open {
        Style::default().fg(theme.surface).bg(theme.primary)
    } else {
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)
    };
    f.render_widget(Paragraph::new(Span::styled(BUTTON_LABEL, style)), button);
    button
}
