use super::message::Attachment;
use super::suggestion::Suggestion;
use super::trigger::floor_boundary;

use crate::config::constants::DEFAULT_MAX_INPUT_LINES;

/// What the composer hands to the stream manager on send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub message: String,
    /// Selected files first (as `file` attachments named by label), then raw attachments.
    pub attachments: Vec<Attachment>,
    pub action: Option<String>,
}

/// The text input plus everything staged for the next message.
#[derive(Debug, Clone)]
pub struct Composer {
    pub text: String,
    /// Caret position in `text` (byte index, always on a char boundary)
    pub caret: usize,
    /// Files picked through `@`, unique by suggestion id, in pick order
    pub selected_files: Vec<Suggestion>,
    /// Locally picked files and images
    pub attachments: Vec<Attachment>,
    /// Action picked through `/`; a new pick replaces the old one
    pub pending_action: Option<String>,
    /// Number of visual lines the input occupies, clamped to `max_lines`
    pub visual_lines: u16,
    pub max_lines: u16,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INPUT_LINES)
    }
}

impl Composer {
    pub fn new(max_lines: u16) -> Self {
        Self {
            text: String::new(),
            caret: 0,
            selected_files: Vec::new(),
            attachments: Vec::new(),
            pending_action: None,
            visual_lines: 1,
            max_lines: max_lines.max(1),
        }
    }

    /// Replace the text and caret wholesale (e.g. from an external editor widget).
    pub fn set_text(&mut self, text: impl Into<String>, caret: usize) {
        self.text = text.into();
        self.caret = floor_boundary(&self.text, caret);
        self.adapt_height();
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.caret, c);
        self.caret += c.len_utf8();
        self.adapt_height();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.caret, s);
        self.caret += s.len();
        self.adapt_height();
    }

    /// Delete the char before the caret. Returns false at the start of input.
    pub fn backspace(&mut self) -> bool {
        let Some((idx, _)) = self.text[..self.caret].char_indices().next_back() else { return false };
        self.text.remove(idx);
        self.caret = idx;
        self.adapt_height();
        true
    }

    /// Delete the char under the caret. Returns false at the end of input.
    pub fn delete(&mut self) -> bool {
        if self.caret >= self.text.len() {
            return false;
        }
        self.text.remove(self.caret);
        self.adapt_height();
        true
    }

    pub fn cursor_left(&mut self) {
        if let Some((idx, _)) = self.text[..self.caret].char_indices().next_back() {
            self.caret = idx;
        }
    }

    pub fn cursor_right(&mut self) {
        if let Some(c) = self.text[self.caret..].chars().next() {
            self.caret += c.len_utf8();
        }
    }

    pub fn cursor_home(&mut self) {
        self.caret = 0;
    }

    pub fn cursor_end(&mut self) {
        self.caret = self.text.len();
    }

    /// Remove exactly `[start, end)` and put the caret at `start`.
    /// Text outside the span is left untouched.
    pub fn remove_span(&mut self, start: usize, end: usize) {
        let end = floor_boundary(&self.text, end);
        let start = floor_boundary(&self.text, start.min(end));
        self.text.replace_range(start..end, "");
        self.caret = start;
        self.adapt_height();
    }

    /// Add a file chip. Returns false if a chip with the same id already exists.
    pub fn add_selected_file(&mut self, suggestion: Suggestion) -> bool {
        if self.selected_files.iter().any(|f| f.id == suggestion.id) {
            return false;
        }
        self.selected_files.push(suggestion);
        true
    }

    pub fn remove_selected_file(&mut self, id: &str) -> bool {
        let before = self.selected_files.len();
        self.selected_files.retain(|f| f.id != id);
        self.selected_files.len() != before
    }

    pub fn set_action(&mut self, label: impl Into<String>) {
        self.pending_action = Some(label.into());
    }

    pub fn clear_action(&mut self) {
        self.pending_action = None;
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn remove_attachment(&mut self, index: usize) -> Option<Attachment> {
        (index < self.attachments.len()).then(|| self.attachments.remove(index))
    }

    /// Anything worth sending: non-blank text, a file chip, or an attachment.
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || !self.selected_files.is_empty() || !self.attachments.is_empty()
    }

    /// Build the outbound payload and reset the composer.
    /// Returns None (and changes nothing) when there is nothing to send.
    pub fn take_payload(&mut self) -> Option<OutboundMessage> {
        if !self.has_content() {
            return None;
        }
        let mut attachments: Vec<Attachment> =
            self.selected_files.drain(..).map(|f| Attachment::file(f.label)).collect();
        attachments.append(&mut self.attachments);

        let payload = OutboundMessage {
            message: self.text.trim().to_string(),
            attachments,
            action: self.pending_action.take(),
        };
        self.text.clear();
        self.caret = 0;
        self.adapt_height();
        Some(payload)
    }

    /// Recompute `visual_lines` from the current text.
    pub fn adapt_height(&mut self) {
        let lines = self.text.split('\n').count().max(1);
        self.visual_lines = (lines.min(self.max_lines as usize)) as u16;
    }
}
