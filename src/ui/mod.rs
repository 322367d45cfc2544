pub mod diagram;
pub mod header;
pub mod input;
pub mod settings;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

use crate::settings::SettingsMenu;
use crate::state::AppState;
use crate::theme::PreferenceStore;
use crate::view;

/// Clickable regions from the last draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hitboxes {
    pub settings_button: Rect,
    pub menu: Option<Rect>,
}

/// Render the full UI layout.
pub fn render(
    f: &mut Frame,
    state: &AppState,
    store: &PreferenceStore,
    menu: &SettingsMenu,
    backend_url: &str,
) -> Hitboxes {
    let size = f.area();
    let theme = store.colors();
    let view = view::compose(state.request.state(), &state.input);

    f.render_widget(
        Block::default().style(Style::default().bg(theme.surface).fg(theme.text)),
        size,
    );

    // Layout: header, input box, submit line, banner, diagram fills space, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(3), // input
            Constraint::Length(1), // submit / loading
            Constraint::Length(if view.banner.is_some() { 1 } else { 0 }),
            Constraint::Min(3),    // diagram
            Constraint::Length(1), // status bar
        ])
        .split(size);

    let settings_button = header::render(f, chunks[0], menu.is_open(), theme);
    input::render(f, chunks[1], state, theme);
    input::render_submit(f, chunks[2], state, view.submit, theme);
    if let Some(message) = view.banner {
        diagram::render_banner(f, chunks[3], message, theme);
    }
    diagram::render(f, chunks[4], view.body, state, theme);
    status_bar::render(f, chunks[5], state, store, backend_url);

    let menu_area = if menu.is_open() {
        let area = settings::popover_area(size);
        settings::render(f, area, menu, store);
        Some(area)
    } else {
        None
    };

    Hitboxes {
        settings_button,
        menu: menu_area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RequestError;
    use crate::theme::store::tests::memory_store;
    use crate::theme::ThemePreference;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(state: &AppState, menu: &SettingsMenu) -> (String, Hitboxes) {
        let (store, _) = memory_store(false);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut hitboxes = Hitboxes::default();
        terminal
            .draw(|f| {
                hitboxes = render(f, state, &store, menu, "http://127.0.0.1:8000");
            })
            .unwrap();
        let text = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        (text, hitboxes)
    }

    #[test]
    fn test_idle_screen_shows_empty_state() {
        let state = AppState::new();
        let menu = SettingsMenu::new(ThemePreference::Light);
        let (text, hitboxes) = draw(&state, &menu);
        assert!(text.contains(diagram::EMPTY_STATE));
        assert!(hitboxes.menu.is_none());
        assert!(hitboxes.settings_button.width > 0);
    }

    #[test]
    fn test_success_screen_shows_markup() {
        let mut state = AppState::new();
        let sub = state.request.submit("flowchart for login").unwrap();
        state.request.settle(sub.id, Ok("graph TD; A-->B".into()));
        let menu = SettingsMenu::new(ThemePreference::Light);

        let (text, _) = draw(&state, &menu);
        assert!(text.contains("graph TD; A-->B"));
        assert!(!text.contains(diagram::EMPTY_STATE));
    }

    #[test]
    fn test_failure_screen_shows_banner() {
        let mut state = AppState::new();
        let sub = state.request.submit("x").unwrap();
        state.request.settle(
            sub.id,
            Err(RequestError::Server {
                status: 500,
                message: "Internal Server Error".into(),
            }),
        );
        let menu = SettingsMenu::new(ThemePreference::Light);

        let (text, _) = draw(&state, &menu);
        assert!(text.contains("diagram service error 500"));
    }

    #[test]
    fn test_pending_screen_hides_empty_state() {
        let mut state = AppState::new();
        state.request.submit("x").unwrap();
        let menu = SettingsMenu::new(ThemePreference::Light);

        let (text, _) = draw(&state, &menu);
        assert!(!text.contains(diagram::EMPTY_STATE));
        assert!(text.contains("Generating"));
    }

    #[test]
    fn test_open_menu_reports_region() {
        let state = AppState::new();
        let mut menu = SettingsMenu::new(ThemePreference::Light);
        menu.toggle();

        let (text, hitboxes) = draw(&state, &menu);
        let region = hitboxes.menu.unwrap();
        assert_eq!(region, settings::popover_area(Rect::new(0, 0, 80, 24)));
        assert!(text.contains("Auto (system)"));
    }
}
