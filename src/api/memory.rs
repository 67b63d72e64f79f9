//! In-memory suggestion catalogue for offline use and tests.

use hh_base::state::{Suggestion, TriggerKind};

use super::{ApiError, SuggestionSource};

#[derive(Debug, Clone, Default)]
pub struct MemorySuggestions {
    pub files: Vec<Suggestion>,
    pub actions: Vec<Suggestion>,
}

impl MemorySuggestions {
    pub fn new(files: Vec<Suggestion>, actions: Vec<Suggestion>) -> Self {
        Self { files, actions }
    }

    /// A small demo catalogue of project files and workflow actions.
    pub fn demo() -> Self {
        let file = |id: &str, label: &str, description: &str| Suggestion::new(id, label).with_description(description);
        Self {
            files: vec![
                file("1", "README.md", "Project documentation"),
                file("2", "package.json", "Package configuration"),
                file("3", "src/components/ChatInterface.tsx", "Chat component"),
                file("4", "src/app/page.tsx", "Main page component"),
                file("5", "tailwind.config.js", "Tailwind configuration"),
                file("6", "next.config.js", "Next.js configuration"),
                file("7", "tsconfig.json", "TypeScript configuration"),
            ],
            actions: vec![
                file("chat", "chat", "Start a conversation with the AI"),
                file("generate-workflow", "generate-workflow", "Create a new workflow based on your requirements"),
                file("execute-workflow", "execute-workflow", "Run an existing workflow from your collection"),
            ],
        }
    }
}

impl SuggestionSource for MemorySuggestions {
    /// Case-insensitive substring match on label or description.
    fn fetch(&self, kind: TriggerKind, query: &str) -> Result<Vec<Suggestion>, ApiError> {
        let catalogue = match kind {
            TriggerKind::File => &self.files,
            TriggerKind::Action => &self.actions,
        };
        let query = query.to_lowercase();
        Ok(catalogue
            .iter()
            .filter(|s| {
                s.label.to_lowercase().contains(&query)
                    || s.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&query))
            })
            .cloned()
            .collect())
    }
}
