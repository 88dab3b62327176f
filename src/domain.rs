//! Domain types
//!
//! This module contains the message model shared by the tracker and its collaborators:
//! - Message identities and ordering references
//! - Messages as returned by page fetches

mod message;

pub use message::{ChatMessage, MessageId, MessageRef};
