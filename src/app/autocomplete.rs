//! Autocomplete controller: keeps the suggestion menu in step with the
//! trigger under the caret and applies committed suggestions to the composer.

use hh_base::state::{Suggestion, TriggerContext, TriggerKind, locate};

use crate::api::start_suggestion_fetch;

use super::App;

impl App {
    /// The trigger the caret currently sits in, typed or opened manually.
    pub fn current_trigger(&self) -> Option<TriggerContext> {
        if let Some(ctx) = locate(&self.composer.text, self.composer.caret) {
            return Some(ctx);
        }
        self.manual_trigger.clone().filter(|m| m.start_offset == self.composer.caret)
    }

    /// Re-derive the trigger after any text or caret change. Refetches when
    /// a trigger is present, otherwise closes the menu.
    pub fn on_text_changed(&mut self) {
        self.manual_trigger = None;
        match locate(&self.composer.text, self.composer.caret) {
            Some(ctx) => self.request_suggestions(ctx),
            None => self.autocomplete.close(),
        }
    }

    /// Open the `@` menu at the caret without typing a trigger.
    pub fn open_file_menu(&mut self) {
        let ctx = TriggerContext { kind: TriggerKind::File, start_offset: self.composer.caret, query: String::new() };
        self.manual_trigger = Some(ctx.clone());
        self.request_suggestions(ctx);
    }

    fn request_suggestions(&mut self, ctx: TriggerContext) {
        let generation = self.autocomplete.begin_request(ctx.clone());
        log::debug!("suggestions #{} for {}{:?}", generation, ctx.kind.as_char(), ctx.query);
        start_suggestion_fetch(self.suggestion_source.clone(), generation, ctx, self.suggestion_tx.clone());
    }

    /// Apply finished fetches. Results for anything but the latest request
    /// against the current trigger are discarded; failures become empty lists.
    pub(super) fn process_suggestion_results(&mut self) {
        while let Ok(result) = self.suggestion_rx.try_recv() {
            let current = self.current_trigger();
            let suggestions = result.result.unwrap_or_else(|e| {
                log::debug!("suggestion fetch for {:?} failed: {}", result.context.query, e);
                Vec::new()
            });
            if !self.autocomplete.resolve(result.generation, current.as_ref(), suggestions) {
                log::debug!("discarding stale suggestions #{}", result.generation);
            }
        }
    }

    pub(super) fn close_menu(&mut self) {
        self.autocomplete.close();
        self.manual_trigger = None;
    }

    /// Commit the highlighted suggestion. Returns false when the menu had none.
    pub fn commit_selected(&mut self) -> bool {
        let Some(suggestion) = self.autocomplete.selected_suggestion().cloned() else {
            self.close_menu();
            return false;
        };
        self.commit_suggestion(suggestion);
        true
    }

    /// Commit the suggestion at `index` (e.g. clicked in the menu).
    pub fn commit_at(&mut self, index: usize) -> bool {
        if !self.autocomplete.open || index >= self.autocomplete.suggestions.len() {
            return false;
        }
        self.autocomplete.selected = index;
        self.commit_selected()
    }

    /// `@` adds a file chip (ignored if already present), `/` replaces the
    /// pending action. Then the trigger span up to the caret is removed.
    pub fn commit_suggestion(&mut self, suggestion: Suggestion) {
        let Some(menu_ctx) = self.autocomplete.context.clone() else { return };

        // The user may have kept typing since the menu opened
        let start = match self.current_trigger() {
            Some(cur) if cur.kind == menu_ctx.kind => cur.start_offset,
            _ => menu_ctx.start_offset,
        };

        match menu_ctx.kind {
            TriggerKind::File => {
                if !self.composer.add_selected_file(suggestion) {
                    log::debug!("file already selected");
                }
            }
            TriggerKind::Action => self.composer.set_action(suggestion.label),
        }

        let end = self.composer.caret;
        self.composer.remove_span(start, end);
        self.close_menu();
    }
}
