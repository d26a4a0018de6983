//! Conversation domain module
//!
//! The normalized conversation handed over by the protocol translation
//! layer: an ordered, append-only sequence of [`Message`]s. Pipeline
//! components read bounded trailing slices of it and never mutate it.

pub mod entities;

pub use entities::{Message, Role, ToolResultRef, latest_user_text, trailing};
