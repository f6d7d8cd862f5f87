//! Conversation state for the trip assistant.
//!
//! The completion backend sits behind [`CompletionService`]; this module
//! only keeps the transcript consistent across failures.

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Error type for completion requests
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("completion service error: {0}")]
    Service(String),
    #[error("completion service returned no text")]
    EmptyReply,
    #[error("message is empty")]
    EmptyMessage,
}

/// A text-completion backend.
pub trait CompletionService {
    /// Produce one reply to `message`, given the prior turns in `history`.
    fn complete(
        &mut self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, CompletionError>;
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    system_prompt: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        ChatSession {
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Replace the system prompt, e.g. when the active trip changes
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Send a user message and record the reply.
    ///
    /// The user message is appended before the request goes out and removed
    /// again if it fails, so the transcript never holds an unanswered turn.
    pub fn send(
        &mut self,
        service: &mut dyn CompletionService,
        message: &str,
    ) -> Result<&str, CompletionError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(CompletionError::EmptyMessage);
        }

        let history_len = self.messages.len();
        self.messages.push(ChatMessage::user(message));

        let reply = service
            .complete(&self.system_prompt, &self.messages[..history_len], message)
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(CompletionError::EmptyReply)
                } else {
                    Ok(text)
                }
            });

        match reply {
            Ok(text) => {
                self.messages.push(ChatMessage::model(text));
                Ok(self.messages[history_len + 1].text.as_str())
            }
            Err(e) => {
                warn!(error = %e, "assistant request failed");
                self.messages.truncate(history_len);
                Err(e)
            }
        }
    }
}
