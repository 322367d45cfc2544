use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::settings::SettingsMenu;
use crate::theme::{PreferenceStore, ThemePreference};

const POPOVER_WIDTH: u16 = 22;
const POPOVER_HEIGHT: u16 = ThemePreference::ALL.len() as u16 + 2;

/// Popover position: top right, just under the header.
pub fn popover_area(screen: Rect) -> Rect {
    let area = Rect {
        x: screen.right().saturating_sub(POPOVER_WIDTH + 1),
        y: screen.y.saturating_add(1),
        width: POPOVER_WIDTH,
        height: POPOVER_HEIGHT,
    };
    area.intersection(screen)
}

/// Render the theme picker over whatever is below it.
pub fn render(f: &mut Frame, area: Rect, menu: &SettingsMenu, store: &PreferenceStore) {
    let theme = store.colors();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.primary))
        .style(Style::default().bg(theme.surface))
        .title(Span::styled(" theme ", Style::default().fg(theme.primary)));

    let lines: Vec<Line> = ThemePreference::ALL
        .iter()
        .enumerate()
        .map(|(i, pref)| {
            let marker = if *pref == store.preference() { "●" } else { " " };
            let style = if *pref == menu.highlighted() {
                Style::default().fg(theme.surface).bg(theme.primary)
            } else {
                Style::default().fg(theme.text)
            };
            Line::from(vec![
                Span::styled(format!(" {} ", marker), style.fg(theme.accent)),
                Span::styled(format!("{} {}", i + 1, pref.label()), style),
            ])
            .style(style)
        })
        .collect();

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}
