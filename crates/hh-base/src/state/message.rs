use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Prefix used for display IDs (U1, A1, S1).
    pub fn id_prefix(self) -> char {
        match self {
            Role::User => 'U',
            Role::Assistant => 'A',
            Role::System => 'S',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    File,
    Image,
}

impl AttachmentKind {
    /// Kind for a locally picked file: `image/*` is an image, anything else a file.
    pub fn from_mime(mime: &str) -> Self {
        if mime.trim().to_ascii_lowercase().starts_with("image/") {
            AttachmentKind::Image
        } else {
            AttachmentKind::File
        }
    }
}

/// A file or image attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub name: String,
    /// URL or local handle, absent for files referenced by name only
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
}

impl Attachment {
    pub fn file(name: impl Into<String>) -> Self {
        Self { kind: AttachmentKind::File, name: name.into(), source_ref: None }
    }

    /// Attachment for a locally picked file, kind derived from its MIME type.
    pub fn from_pick(name: impl Into<String>, mime: &str, source_ref: Option<String>) -> Self {
        Self { kind: AttachmentKind::from_mime(mime), name: name.into(), source_ref }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Display ID (e.g., U1, A1, S1)
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Message {
    pub fn new_user(id: String, content: String, attachments: Vec<Attachment>) -> Self {
        Self { id, role: Role::User, content, created_at: Utc::now(), attachments }
    }

    /// Create an empty assistant message ready for streaming.
    pub fn new_assistant(id: String) -> Self {
        Self { id, role: Role::Assistant, content: String::new(), created_at: Utc::now(), attachments: Vec::new() }
    }

    pub fn new_system(id: String, content: String) -> Self {
        Self { id, role: Role::System, content, created_at: Utc::now(), attachments: Vec::new() }
    }
}
