//! Key bindings: arrows/space and vim-style.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Flap while playing; also starts a run from the start screen.
    Flap,
    /// Start from the start screen or restart after game over.
    Confirm,
    Restart,
    Pause,
    Quit,
    None,
}

/// Map key event to game action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = key;
    if kind == KeyEventKind::Release {
        return Action::None;
    }
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char(' ' | 'k' | 'w') | KeyCode::Up => Action::Flap,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Char('r') => Action::Restart,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_flap_keys() {
        for code in [KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('k'), KeyCode::Char('w')] {
            assert_eq!(key_to_action(press(code)), Action::Flap);
        }
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(key_to_action(press(KeyCode::Enter)), Action::Confirm);
        assert_eq!(key_to_action(press(KeyCode::Char('r'))), Action::Restart);
        assert_eq!(key_to_action(press(KeyCode::Char('p'))), Action::Pause);
        assert_eq!(key_to_action(press(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_modified_and_release_ignored() {
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::ALT)),
            Action::None
        );
        let mut release = press(KeyCode::Char(' '));
        release.kind = KeyEventKind::Release;
        assert_eq!(key_to_action(release), Action::None);
        assert_eq!(key_to_action(press(KeyCode::Char('x'))), Action::None);
    }
}
