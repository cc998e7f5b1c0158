//! `campushub-messaging` — student support tickets.

pub mod message;

pub use message::{Message, MessageDraft, MessageFilter, MessageStatus, MessageWithSender};
