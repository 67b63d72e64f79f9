//! Suggestion menu state for `@` / `/` triggers in the composer.
//!
//! Fetches run off-thread, so every request is tagged with a generation
//! number. A result is applied only if it carries the latest generation and
//! its trigger context still matches the composer's current one.

use super::suggestion::Suggestion;
use super::trigger::TriggerContext;

#[derive(Debug, Clone, Default)]
pub struct AutocompleteState {
    /// Whether the suggestion menu is currently visible.
    pub open: bool,
    /// Trigger the visible suggestions belong to.
    pub context: Option<TriggerContext>,
    pub suggestions: Vec<Suggestion>,
    /// Index of the highlighted suggestion (0-based).
    pub selected: usize,
    /// Last generation handed out by `begin_request`.
    generation: u64,
    /// Latest outstanding request.
    pending: Option<(u64, TriggerContext)>,
}

impl AutocompleteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new fetch for `context` and return its generation tag.
    /// Any older outstanding request becomes stale.
    pub fn begin_request(&mut self, context: TriggerContext) -> u64 {
        self.generation += 1;
        self.pending = Some((self.generation, context));
        self.generation
    }

    /// Whether a result tagged `generation` would still be accepted.
    pub fn is_current(&self, generation: u64, current: Option<&TriggerContext>) -> bool {
        match (&self.pending, current) {
            (Some((g, ctx)), Some(cur)) => *g == generation && ctx == cur,
            _ => false,
        }
    }

    /// Apply a fetch result. Returns false when it was discarded as stale.
    /// An empty list closes the menu.
    pub fn resolve(&mut self, generation: u64, current: Option<&TriggerContext>, suggestions: Vec<Suggestion>) -> bool {
        if !self.is_current(generation, current) {
            return false;
        }
        let Some((_, context)) = self.pending.take() else { return false };

        if suggestions.is_empty() {
            self.close();
        } else {
            self.open = true;
            self.context = Some(context);
            self.suggestions = suggestions;
            self.selected = 0;
        }
        true
    }

    /// Close the menu and forget any outstanding request.
    pub fn close(&mut self) {
        self.open = false;
        self.context = None;
        self.suggestions.clear();
        self.selected = 0;
        self.pending = None;
    }

    pub fn select_next(&mut self) {
        let n = self.suggestions.len();
        if n > 0 {
            self.selected = (self.selected + 1) % n;
        }
    }

    pub fn select_prev(&mut self) {
        let n = self.suggestions.len();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    pub fn selected_suggestion(&self) -> Option<&Suggestion> {
        if !self.open {
            return None;
        }
        self.suggestions.get(self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::suggestion::TriggerKind;

    fn ctx(query: &str) -> TriggerContext {
        TriggerContext { kind: TriggerKind::File, start_offset: 0, query: query.to_string() }
    }

    fn items(n: usize) -> Vec<Suggestion> {
        (0..n).map(|i| Suggestion::new(i.to_string(), format!("file{}", i))).collect()
    }

    #[test]
    fn result_opens_menu() {
        let mut ac = AutocompleteState::new();
        let g = ac.begin_request(ctx("re"));
        assert!(ac.resolve(g, Some(&ctx("re")), items(2)));
        assert!(ac.open);
        assert_eq!(ac.selected, 0);
        assert_eq!(ac.context, Some(ctx("re")));
    }

    #[test]
    fn empty_result_closes_menu() {
        let mut ac = AutocompleteState::new();
        let g = ac.begin_request(ctx("re"));
        ac.resolve(g, Some(&ctx("re")), items(2));
        let g = ac.begin_request(ctx("rex"));
        assert!(ac.resolve(g, Some(&ctx("rex")), Vec::new()));
        assert!(!ac.open);
        assert!(ac.suggestions.is_empty());
    }

    #[test]
    fn out_of_order_result_is_discarded() {
        let mut ac = AutocompleteState::new();
        let old = ac.begin_request(ctx("r"));
        let new = ac.begin_request(ctx("re"));

        // The older response arrives last
        assert!(ac.resolve(new, Some(&ctx("re")), items(1)));
        assert!(!ac.resolve(old, Some(&ctx("re")), items(5)));
        assert_eq!(ac.suggestions.len(), 1);
    }

    #[test]
    fn result_for_changed_context_is_discarded() {
        let mut ac = AutocompleteState::new();
        let g = ac.begin_request(ctx("re"));
        assert!(!ac.resolve(g, Some(&ctx("rea")), items(1)));
        assert!(!ac.resolve(g, None, items(1)));
        assert!(!ac.open);
    }

    #[test]
    fn close_invalidates_outstanding_request() {
        let mut ac = AutocompleteState::new();
        let g = ac.begin_request(ctx("re"));
        ac.close();
        assert!(!ac.resolve(g, Some(&ctx("re")), items(1)));
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut ac = AutocompleteState::new();
        let g = ac.begin_request(ctx(""));
        ac.resolve(g, Some(&ctx("")), items(3));

        ac.select_prev();
        assert_eq!(ac.selected, 2);
        ac.select_next();
        assert_eq!(ac.selected, 0);
        ac.select_next();
        ac.select_next();
        ac.select_next();
        assert_eq!(ac.selected, 0);
    }

    #[test]
    fn selection_on_empty_list_is_noop() {
        let mut ac = AutocompleteState::new();
        ac.select_next();
        ac.select_prev();
        assert_eq!(ac.selected, 0);
        assert!(ac.selected_suggestion().is_none());
    }
}
