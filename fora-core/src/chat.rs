//! Append-only chat log with a single in-flight request guard.

use crate::error::ApiError;
use crate::types::ChatMessage;

/// What the chat endpoint receives: the new message and everything before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Default, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    loading: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Appends the user's message and returns the request to send.
    ///
    /// Returns `None` for blank input or while a reply is still pending.
    pub fn submit(&mut self, input: &str) -> Option<ChatRequest> {
        let message = input.trim();
        if message.is_empty() || self.loading {
            return None;
        }
        let history = self.messages.clone();
        self.messages.push(ChatMessage::user(message));
        self.loading = true;
        Some(ChatRequest { message: message.to_owned(), history })
    }

    /// Appends the assistant reply, or an error line, and releases the guard.
    pub fn complete(&mut self, outcome: Result<String, ApiError>) {
        let content = match outcome {
            Ok(reply) => reply,
            Err(ApiError::Rejected(message)) => {
                format!("Error: {}", message.unwrap_or_else(|| "Something went wrong".to_owned()))
            }
            Err(err) => format!("Error: {err}"),
        };
        self.messages.push(ChatMessage::assistant(content));
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn history_excludes_the_message_being_sent() {
        let mut chat = ChatSession::new();
        let first = chat.submit("  what do people dislike?  ").unwrap();
        assert_eq!(first.message, "what do people dislike?");
        assert!(first.history.is_empty());
        chat.complete(Ok("Mostly commute times.".into()));

        let second = chat.submit("and like?").unwrap();
        assert_eq!(second.history.len(), 2);
        assert_eq!(second.history[1].role, Role::Assistant);
        assert_eq!(chat.messages().len(), 3);
    }

    #[test]
    fn blank_or_concurrent_input_is_ignored() {
        let mut chat = ChatSession::new();
        assert!(chat.submit("   ").is_none());
        assert!(chat.submit("one").is_some());
        assert!(chat.submit("two").is_none());
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn failures_become_error_lines_and_release_the_guard() {
        let mut chat = ChatSession::new();
        chat.submit("hello");
        chat.complete(Err(ApiError::Rejected(None)));
        assert_eq!(chat.messages()[1].content, "Error: Something went wrong");
        assert!(!chat.is_loading());

        chat.submit("again");
        chat.complete(Err(ApiError::Rejected(Some("model offline".into()))));
        assert_eq!(chat.messages()[3].content, "Error: model offline");
    }
}
