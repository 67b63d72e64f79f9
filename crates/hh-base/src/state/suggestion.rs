use serde::{Deserialize, Serialize};

/// Which inline trigger opened the suggestion menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// `@`: reference a file
    File,
    /// `/`: pick an action
    Action,
}

impl TriggerKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '@' => Some(TriggerKind::File),
            '/' => Some(TriggerKind::Action),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            TriggerKind::File => '@',
            TriggerKind::Action => '/',
        }
    }
}

/// One autocomplete candidate. Fetched fresh per query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), description: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
