//! The contiguous range of messages currently loaded for a session

use sorted_vec::{FindOrInsert, SortedSet};

use crate::domain::{ChatMessage, MessageRef};

use super::pagination::{FetchKind, Pagination};

/// Loaded message references, oldest first and deduplicated
#[derive(Debug, Clone)]
pub struct Window {
    messages: SortedSet<MessageRef>,
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

impl Window {
    pub fn new() -> Self {
        Self {
            messages: SortedSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn oldest(&self) -> Option<&MessageRef> {
        self.messages.first()
    }

    pub fn newest(&self) -> Option<&MessageRef> {
        self.messages.last()
    }

    pub fn contains(&self, message: &MessageRef) -> bool {
        self.messages.binary_search(message).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageRef> {
        self.messages.iter()
    }

    /// Merge a successfully fetched page into the window
    ///
    /// Initial and around pages start a new window; older and newer pages extend the
    /// current one. Returns the number of messages that were not loaded before.
    pub fn apply(&mut self, pagination: &Pagination, messages: &[ChatMessage]) -> usize {
        match pagination.kind() {
            FetchKind::Initial | FetchKind::Around => {
                self.messages = SortedSet::new();
            }
            FetchKind::Older | FetchKind::Newer => {}
        }

        messages
            .iter()
            .map(|message| self.messages.find_or_insert(MessageRef::from(message)))
            .filter(|result| matches!(result, FindOrInsert::Inserted(_)))
            .count()
    }
}
