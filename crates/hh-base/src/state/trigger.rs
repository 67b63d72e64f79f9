//! Inline trigger detection for the composer.
//!
//! A trigger is `@` (files) or `/` (actions) typed with no whitespace between
//! it and the caret. Offsets are byte positions into the composer text.

use super::suggestion::TriggerKind;

/// The trigger span the caret currently sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
    pub kind: TriggerKind,
    /// Byte offset of the trigger character.
    pub start_offset: usize,
    /// Lowercased text between the trigger character and the caret.
    pub query: String,
}

/// Find the active trigger for `text` with the caret at byte offset `caret`.
///
/// The later of the last `@` and the last `/` before the caret wins; it is
/// active only if no whitespace separates it from the caret. Stateless: call
/// it again on every text or caret change.
pub fn locate(text: &str, caret: usize) -> Option<TriggerContext> {
    let caret = floor_boundary(text, caret);
    let before = &text[..caret];

    // The nearest trigger char is the later of the two
    let (start_offset, kind) =
        before.char_indices().rev().find_map(|(i, c)| TriggerKind::from_char(c).map(|kind| (i, kind)))?;

    let raw = &before[start_offset + 1..];
    if raw.chars().any(char::is_whitespace) {
        return None;
    }
    Some(TriggerContext { kind, start_offset, query: raw.to_lowercase() })
}

/// Clamp `pos` into `text` and move it back onto a char boundary.
pub fn floor_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}
