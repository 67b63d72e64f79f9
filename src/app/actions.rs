use super::App;

/// Everything the user can do to the front-end, after key mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    InputChar(char),
    InsertNewline,
    PasteText(String),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    /// Send button (stop while busy)
    Submit,
    StopGeneration,
    MenuNext,
    MenuPrev,
    MenuCommit,
    MenuClose,
    /// Pointer or focus moved away from the suggestion menu
    PointerOutside,
    OpenFileMenu,
    RemoveFile(String),
    RemoveAttachment(usize),
    ClearAction,
    ClearConversation,
}

impl App {
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::InputChar(c) => {
                self.composer.insert_char(c);
                self.on_text_changed();
            }
            Action::InsertNewline => {
                self.composer.insert_char('\n');
                self.on_text_changed();
            }
            Action::PasteText(text) => {
                self.composer.insert_str(&text);
                self.on_text_changed();
            }
            Action::Backspace => {
                if self.composer.backspace() {
                    self.on_text_changed();
                }
            }
            Action::Delete => {
                if self.composer.delete() {
                    self.on_text_changed();
                }
            }
            Action::CursorLeft => {
                self.composer.cursor_left();
                self.on_text_changed();
            }
            Action::CursorRight => {
                self.composer.cursor_right();
                self.on_text_changed();
            }
            Action::CursorHome => {
                self.composer.cursor_home();
                self.on_text_changed();
            }
            Action::CursorEnd => {
                self.composer.cursor_end();
                self.on_text_changed();
            }
            Action::Submit => self.submit(),
            Action::StopGeneration => {
                self.stop();
            }
            Action::MenuNext => self.autocomplete.select_next(),
            Action::MenuPrev => self.autocomplete.select_prev(),
            Action::MenuCommit => {
                self.commit_selected();
            }
            Action::MenuClose | Action::PointerOutside => self.close_menu(),
            Action::OpenFileMenu => self.open_file_menu(),
            Action::RemoveFile(id) => {
                self.composer.remove_selected_file(&id);
            }
            Action::RemoveAttachment(index) => {
                self.composer.remove_attachment(index);
            }
            Action::ClearAction => self.composer.clear_action(),
            Action::ClearConversation => {
                self.stop();
                self.conversation.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hh_base::config::Config;
    use hh_base::state::Suggestion;

    use crate::api::memory::MemorySuggestions;
    use crate::api::{ApiError, ChatRequest, ChatTransport, ChunkSink};

    struct Idle;

    impl ChatTransport for Idle {
        fn stream(&self, _request: &ChatRequest, _sink: &ChunkSink) -> Result<(), ApiError> {
            Ok(())
        }

        fn stop(&self, _stream_id: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn app() -> App {
        App::new(Config::default(), Arc::new(MemorySuggestions::new(Vec::new(), Vec::new())), Arc::new(Idle))
    }

    #[test]
    fn typing_and_editing() {
        let mut app = app();
        for c in "héllo".chars() {
            app.apply(Action::InputChar(c));
        }
        app.apply(Action::CursorLeft);
        app.apply(Action::Backspace);
        app.apply(Action::CursorEnd);
        app.apply(Action::InsertNewline);
        app.apply(Action::PasteText("x".into()));
        assert_eq!(app.composer.text, "hélo\nx");
        assert_eq!(app.composer.visual_lines, 2);
    }

    #[test]
    fn chips_and_action_can_be_removed() {
        let mut app = app();
        app.composer.add_selected_file(Suggestion::new("4", "src/app/page.tsx"));
        app.composer.set_action("chat");
        app.add_local_file("notes.txt", "text/plain", None);

        app.apply(Action::RemoveFile("4".into()));
        app.apply(Action::ClearAction);
        app.apply(Action::RemoveAttachment(0));
        app.apply(Action::RemoveAttachment(5));

        assert!(app.composer.selected_files.is_empty());
        assert!(app.composer.pending_action.is_none());
        assert!(app.composer.attachments.is_empty());
    }

    #[test]
    fn clear_conversation_stops_and_empties() {
        let mut app = app();
        app.composer.set_text("hi", 2);
        app.apply(Action::Submit);
        assert!(app.is_busy());

        app.apply(Action::ClearConversation);
        assert!(!app.is_busy());
        assert!(app.conversation.is_empty());
    }
}
