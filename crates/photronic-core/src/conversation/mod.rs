//! Conversation manager.
//!
//! Owns the ordered chat history. Turns are immutable once appended; the
//! only way to remove them is [`Conversation::clear`] on a session reset.

mod request;

pub use request::{build_request, DEFAULT_SYSTEM_PROMPT};

use photronic_types::{ChatMessage, Role, SessionError, TypedError};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    next_seq: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn. Blank input is rejected and nothing is recorded.
    pub fn append_user_message(&mut self, text: &str) -> Result<ChatMessage, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        Ok(self.push(ChatMessage::new(Role::User, text, self.next_seq)))
    }

    /// Append a model turn. Always succeeds.
    pub fn append_model_message(&mut self, text: impl Into<String>) -> ChatMessage {
        self.push(ChatMessage::new(Role::Model, text, self.next_seq))
    }

    /// Surface an error as a model turn (`Error: ...`), excluded from provider replay.
    pub fn append_error(&mut self, error: &TypedError) -> ChatMessage {
        let mut message = ChatMessage::new(Role::Model, error.user_message(), self.next_seq);
        message.is_error = true;
        self.push(message)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Drop all turns. Sequence numbers keep increasing afterwards.
    pub fn clear(&mut self) {
        debug!("Clearing conversation ({} turns)", self.messages.len());
        self.messages.clear();
    }

    fn push(&mut self, message: ChatMessage) -> ChatMessage {
        self.next_seq = self.next_seq.saturating_add(1);
        self.messages.push(message.clone());
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photronic_types::ProviderError;

    #[test]
    fn test_blank_input_is_rejected() {
        let mut conversation = Conversation::new();
        assert_eq!(conversation.append_user_message("   \n\t"), Err(SessionError::EmptyInput));
        assert!(conversation.is_empty());
    }

    #[test]
    fn test_history_is_ordered() {
        let mut conversation = Conversation::new();
        let first = conversation.append_user_message("  draw a box ").unwrap();
        let reply = conversation.append_model_message("Done.");
        let second = conversation.append_user_message("make it red").unwrap();

        assert_eq!(first.content, "draw a box");
        assert!(first.seq < reply.seq && reply.seq < second.seq);
        let contents: Vec<_> = conversation.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["draw a box", "Done.", "make it red"]);
    }

    #[test]
    fn test_error_turns_are_flagged() {
        let mut conversation = Conversation::new();
        let err = TypedError::from(ProviderError::Timeout {
            provider: "Gemini".into(),
            duration_secs: 30,
        });
        let turn = conversation.append_error(&err);

        assert_eq!(turn.role, Role::Model);
        assert!(turn.is_error);
        assert!(turn.content.starts_with("Error: "));
        assert!(!turn.is_replayable());
    }

    #[test]
    fn test_seq_survives_clear() {
        let mut conversation = Conversation::new();
        let before = conversation.append_model_message("hello");
        conversation.clear();
        let after = conversation.append_model_message("hello again");
        assert!(after.seq > before.seq);
        assert_eq!(conversation.len(), 1);
    }
}
