use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::state::AppState;
use crate::theme::ThemePreference;

/// Actions that can result from key input.
#[derive(Debug, PartialEq)]
pub enum InputAction {
    None,
    Submit(String),
    Quit,
    ToggleSettings,
    CloseSettings,
    MenuNext,
    MenuPrev,
    MenuSelect,
    SelectTheme(ThemePreference),
}

/// Process a key event and return the resulting action.
pub fn handle_key(key: KeyEvent, state: &mut AppState, menu_open: bool) -> InputAction {
    if key.kind != KeyEventKind::Press {
        return InputAction::None;
    }

    match (key.modifiers, key.code) {
        // Ctrl+C → quit
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => return InputAction::Quit,
        // Ctrl+T → theme menu
        (KeyModifiers::CONTROL, KeyCode::Char('t')) => return InputAction::ToggleSettings,
        _ => {}
    }

    if menu_open {
        match key.code {
            KeyCode::Esc => return InputAction::CloseSettings,
            KeyCode::Up => return InputAction::MenuPrev,
            KeyCode::Down | KeyCode::Tab => return InputAction::MenuNext,
            KeyCode::Enter => return InputAction::MenuSelect,
            KeyCode::Char(c @ '1'..='3') => {
                let idx = c as usize - '1' as usize;
                return InputAction::SelectTheme(ThemePreference::ALL[idx]);
            }
            _ => {}
        }
    }

    match (key.modifiers, key.code) {
        // Ctrl+L → clear input
        (KeyModifiers::CONTROL, KeyCode::Char('l')) => {
            state.clear_input();
            InputAction::None
        }

        // Enter → submit; blank input is refused by the request lifecycle
        (_, KeyCode::Enter) => {
            let text = state.input.clone();
            state.push_history(text.clone());
            InputAction::Submit(text)
        }

        // Backspace
        (_, KeyCode::Backspace) => {
            if state.cursor_pos > 0 {
                let idx = byte_index(&state.input, state.cursor_pos - 1);
                let end_idx = byte_index(&state.input, state.cursor_pos);
                state.input.replace_range(idx..end_idx, "");
                state.cursor_pos -= 1;
            }
            InputAction::None
        }

        // Delete
        (_, KeyCode::Delete) => {
            let char_count = state.input.chars().count();
            if state.cursor_pos < char_count {
                let idx = byte_index(&state.input, state.cursor_pos);
                let end_idx = byte_index(&state.input, state.cursor_pos + 1);
                state.input.replace_range(idx..end_idx, "");
            }
            InputAction::None
        }

        (_, KeyCode::Left) => {
            state.cursor_pos = state.cursor_pos.saturating_sub(1);
            InputAction::None
        }

        (_, KeyCode::Right) => {
            let char_count = state.input.chars().count();
            if state.cursor_pos < char_count {
                state.cursor_pos += 1;
            }
            InputAction::None
        }

        // Home / Ctrl+A
        (_, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
            state.cursor_pos = 0;
            InputAction::None
        }

        // End / Ctrl+E
        (_, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
            state.cursor_pos = state.input.chars().count();
            InputAction::None
        }

        (_, KeyCode::Up) => {
            state.history_up();
            InputAction::None
        }

        (_, KeyCode::Down) => {
            state.history_down();
            InputAction::None
        }

        // Ctrl+U → clear input line
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
            state.clear_input();
            InputAction::None
        }

        // Ctrl+W → delete word backwards
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => {
            if state.cursor_pos > 0 {
                let before: String = state.input.chars().take(state.cursor_pos).collect();
                let trimmed = before.trim_end();
                let new_end = trimmed.rfind(' ').map(|i| i + 1).unwrap_or(0);
                let new_end = trimmed[..new_end].chars().count();
                let after: String = state.input.chars().skip(state.cursor_pos).collect();
                let new_before: String = state.input.chars().take(new_end).collect();
                state.input = format!("{}{}", new_before, after);
                state.cursor_pos = new_end;
            }
            InputAction::None
        }

        // Regular character
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            let byte_idx = byte_index(&state.input, state.cursor_pos);
            state.input.insert(byte_idx, c);
            state.cursor_pos += 1;
            InputAction::None
        }

        _ => InputAction::None,
    }
}

/// Byte offset of the `char_pos`-th char, or the end of the string.
fn byte_index(s: &str, char_pos: usize) -> usize {
    s.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(press(KeyCode::Char(c)), state, false);
        }
    }

    #[test]
    fn test_typing_and_submit_keeps_text() {
        let mut state = AppState::new();
        type_str(&mut state, "flowchart for login");
        let action = handle_key(press(KeyCode::Enter), &mut state, false);
        assert_eq!(action, InputAction::Submit("flowchart for login".into()));
        assert_eq!(state.input, "flowchart for login");
    }

    #[test]
    fn test_blank_enter_still_reaches_lifecycle_guard() {
        let mut state = AppState::new();
        type_str(&mut state, "   ");
        let action = handle_key(press(KeyCode::Enter), &mut state, false);
        assert_eq!(action, InputAction::Submit("   ".into()));
        assert!(state.request.submit("   ").is_none());
    }

    #[test]
    fn test_editing_multibyte() {
        let mut state = AppState::new();
        type_str(&mut state, "héllo");
        handle_key(press(KeyCode::Left), &mut state, false);
        handle_key(press(KeyCode::Backspace), &mut state, false);
        assert_eq!(state.input, "hélo");
        handle_key(press(KeyCode::Home), &mut state, false);
        handle_key(press(KeyCode::Delete), &mut state, false);
        assert_eq!(state.input, "élo");
    }

    #[test]
    fn test_ctrl_w_deletes_word() {
        let mut state = AppState::new();
        type_str(&mut state, "draw a graph");
        handle_key(ctrl('w'), &mut state, false);
        assert_eq!(state.input, "draw a ");
        assert_eq!(state.cursor_pos, 7);
    }

    #[test]
    fn test_menu_keys_only_while_open() {
        let mut state = AppState::new();
        assert_eq!(handle_key(ctrl('t'), &mut state, false), InputAction::ToggleSettings);
        assert_eq!(
            handle_key(press(KeyCode::Char('2')), &mut state, true),
            InputAction::SelectTheme(ThemePreference::Dark)
        );
        assert_eq!(handle_key(press(KeyCode::Esc), &mut state, true), InputAction::CloseSettings);
        assert_eq!(handle_key(press(KeyCode::Enter), &mut state, true), InputAction::MenuSelect);

        // Closed: digits are text
        handle_key(press(KeyCode::Char('2')), &mut state, false);
        assert_eq!(state.input, "2");
    }

    #[test]
    fn test_quit() {
        let mut state = AppState::new();
        assert_eq!(handle_key(ctrl('c'), &mut state, true), InputAction::Quit);
    }
}
