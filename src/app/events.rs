use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};

use super::App;
use super::actions::Action;

/// Map a terminal event to an action. `None` means quit.
pub fn handle_event(event: &Event, app: &App) -> Option<Action> {
    match event {
        Event::Key(key) => {
            if key.kind == KeyEventKind::Release {
                return Some(Action::None);
            }
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

            // Global Ctrl shortcuts
            if ctrl {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('c') => return None,
                    KeyCode::Char('l') => return Some(Action::ClearConversation),
                    KeyCode::Char('f') => return Some(Action::OpenFileMenu),
                    _ => {}
                }
            }

            let has_modifier = ctrl || key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);

            // Suggestion menu takes navigation keys while open
            if app.autocomplete.open {
                match key.code {
                    KeyCode::Down => return Some(Action::MenuNext),
                    KeyCode::Up => return Some(Action::MenuPrev),
                    KeyCode::Enter if !has_modifier => return Some(Action::MenuCommit),
                    KeyCode::Tab => return Some(Action::MenuCommit),
                    KeyCode::Esc => return Some(Action::MenuClose),
                    _ => {}
                }
            }

            let action = match key.code {
                KeyCode::Esc if app.is_busy() => Action::StopGeneration,
                // Shift/Alt/Ctrl+Enter = newline
                KeyCode::Enter if has_modifier => Action::InsertNewline,
                KeyCode::Enter => Action::Submit,
                KeyCode::Char(c) if !ctrl => Action::InputChar(c),
                KeyCode::Backspace => Action::Backspace,
                KeyCode::Delete => Action::Delete,
                KeyCode::Left => Action::CursorLeft,
                KeyCode::Right => Action::CursorRight,
                KeyCode::Home => Action::CursorHome,
                KeyCode::End => Action::CursorEnd,
                _ => Action::None,
            };
            Some(action)
        }
        // Normalize line endings: terminals may send \r\n or \r instead of \n
        Event::Paste(text) => {
            let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
            Some(Action::PasteText(normalized))
        }
        Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) && app.autocomplete.open => {
            Some(Action::PointerOutside)
        }
        Event::FocusLost if app.autocomplete.open => Some(Action::PointerOutside),
        _ => Some(Action::None),
    }
}
