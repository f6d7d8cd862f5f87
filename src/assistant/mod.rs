pub mod chat;

pub use chat::{ChatMessage, ChatSession, CompletionError, CompletionService, Role};
