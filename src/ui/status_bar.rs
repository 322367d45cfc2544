use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::request::RequestState;
use crate::state::AppState;
use crate::theme::{PreferenceStore, ThemePreference};

/// Render the status bar (bottom row).
pub fn render(
    f: &mut Frame,
    area: Rect,
    state: &AppState,
    store: &PreferenceStore,
    backend_url: &str,
) {
    let theme = store.colors();

    let (dot, dot_color) = match state.request.state() {
        RequestState::Idle => ("○", theme.text_muted),
        RequestState::Pending => ("◌", theme.warning),
        RequestState::Succeeded(_) => ("●", theme.accent),
        RequestState::Failed(_) => ("●", theme.error),
    };

    let theme_label = match store.preference() {
        ThemePreference::Auto => format!("auto → {}", store.resolved().as_str()),
        other => other.as_str().to_string(),
    };

    let generated = match &state.last_generated_at {
        Some(at) => format!(" │ last diagram {}", at),
        None => String::new(),
    };

    let status_line = Line::from(vec![
        Span::styled(" ", Style::default().fg(theme.text_dim)),
        Span::styled(dot, Style::default().fg(dot_color)),
        Span::styled(format!(" {} ", backend_url), Style::default().fg(theme.text_muted)),
        Span::styled("│ theme ", Style::default().fg(theme.text_dim)),
        Span::styled(theme_label, Style::default().fg(theme.primary)),
        Span::styled(generated, Style::default().fg(theme.text_muted)),
        Span::styled(" │ ctrl+t theme · ctrl+c quit", Style::default().fg(theme.text_dim)),
    ]);

    f.render_widget(Paragraph::new(status_line), area);
}
