//! Ordered message log for one chat.
//!
//! Assistant messages are the only ones that change after creation, and only
//! by appending. The stream manager is the sole caller of `append_content`.

use super::message::{Attachment, Message, Role};

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    /// Next display ID per role (U1, A1, S1, ...)
    next_user_id: usize,
    next_assistant_id: usize,
    next_system_id: usize,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self, role: Role) -> String {
        let counter = match role {
            Role::User => &mut self.next_user_id,
            Role::Assistant => &mut self.next_assistant_id,
            Role::System => &mut self.next_system_id,
        };
        *counter += 1;
        format!("{}{}", role.id_prefix(), counter)
    }

    pub fn push_user(&mut self, content: String, attachments: Vec<Attachment>) -> String {
        let id = self.next_id(Role::User);
        self.messages.push(Message::new_user(id.clone(), content, attachments));
        id
    }

    /// Append an empty assistant message for a stream to fill.
    pub fn push_assistant(&mut self) -> String {
        let id = self.next_id(Role::Assistant);
        self.messages.push(Message::new_assistant(id.clone()));
        id
    }

    /// Append a complete assistant message (used for locally generated replies).
    pub fn push_assistant_text(&mut self, content: String) -> String {
        let id = self.push_assistant();
        self.append_content(&id, &content);
        id
    }

    pub fn push_system(&mut self, content: impl Into<String>) -> String {
        let id = self.next_id(Role::System);
        self.messages.push(Message::new_system(id.clone(), content.into()));
        id
    }

    /// Append a text delta to an assistant message. Returns false if `id`
    /// does not name an assistant message.
    pub fn append_content(&mut self, id: &str, delta: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(msg) if msg.role == Role::Assistant => {
                msg.content.push_str(delta);
                true
            }
            _ => false,
        }
    }

    /// Drop an assistant message that never received content.
    /// Messages with partial output are kept.
    pub fn remove_if_empty(&mut self, id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| !(m.id == id && m.role == Role::Assistant && m.content.is_empty()));
        self.messages.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
