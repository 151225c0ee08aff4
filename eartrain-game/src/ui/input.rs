//! Keystroke mapping using crossterm
//!
//! Maps key events to the four game triggers plus line editing.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the front end to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Start,
    Submit,
    Quit,
    Exit,
    Char(char),
    Backspace,
}

/// Map a key event to a command; None for keys with no binding.
///
/// - `Ctrl+S` / `F5`: start
/// - `Enter`: submit (same as the submit control)
/// - `Esc`: quit the round
/// - `Ctrl+C` / `Ctrl+Q`: exit the program
pub fn command_for(key: &KeyEvent) -> Option<UiCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => Some(UiCommand::Exit),
        KeyCode::Char('s') if ctrl => Some(UiCommand::Start),
        KeyCode::F(5) => Some(UiCommand::Start),
        KeyCode::Enter => Some(UiCommand::Submit),
        KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::Backspace => Some(UiCommand::Backspace),
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            Some(UiCommand::Char(c))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_game_triggers() {
        assert_eq!(
            command_for(&key(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Some(UiCommand::Start)
        );
        assert_eq!(
            command_for(&key(KeyCode::F(5), KeyModifiers::NONE)),
            Some(UiCommand::Start)
        );
        assert_eq!(
            command_for(&key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(UiCommand::Submit)
        );
        assert_eq!(
            command_for(&key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(UiCommand::Quit)
        );
        assert_eq!(
            command_for(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(UiCommand::Exit)
        );
    }

    #[test]
    fn test_typing() {
        assert_eq!(
            command_for(&key(KeyCode::Char('s'), KeyModifiers::NONE)),
            Some(UiCommand::Char('s'))
        );
        assert_eq!(
            command_for(&key(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Some(UiCommand::Char('G'))
        );
        assert_eq!(
            command_for(&key(KeyCode::Backspace, KeyModifiers::NONE)),
            Some(UiCommand::Backspace)
        );
        assert_eq!(command_for(&key(KeyCode::Char('x'), KeyModifiers::ALT)), None);
        assert_eq!(command_for(&key(KeyCode::Tab, KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_release_ignored() {
        let mut release = key(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(command_for(&release), None);
    }
}
