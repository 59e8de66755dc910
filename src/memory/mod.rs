//! 记忆层：LLM 消息与有界对话记录

pub mod conversation;

pub use conversation::{Message, Role, Transcript, TranscriptEntry};
