pub mod autocomplete;
pub mod composer;
pub mod conversation;
pub mod message;
pub mod suggestion;
pub mod trigger;

// Re-exports for convenience
pub use autocomplete::AutocompleteState;
pub use composer::{Composer, OutboundMessage};
pub use conversation::Conversation;
pub use message::{Attachment, AttachmentKind, Message, Role};
pub use suggestion::{Suggestion, TriggerKind};
pub use trigger::{TriggerContext, locate};
