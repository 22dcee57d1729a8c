//! Project chat.

pub mod service;

pub use service::{ChatService, MAX_MESSAGE_CHARS};
