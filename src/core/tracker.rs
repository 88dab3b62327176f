//! Pagination state tracking for a bidirectional message timeline
//!
//! This module follows the Elm Architecture pattern:
//! - State changes only through the `update` function
//! - All state transitions are explicitly defined as `Message` variants
//! - The tracker performs no I/O; the caller owns the fetch itself

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{ChatMessage, MessageId, MessageRef};

use super::pagination::{Pagination, PaginationDirection, PageResult};

/// Messages that can be sent to update the tracker
///
/// Following Elm conventions, messages are named in past tense.
pub enum Message {
    /// A page fetch is about to be dispatched
    PageRequested(Pagination),
    /// A page fetch settled, successfully or not
    PageReceived {
        pagination: Pagination,
        result: PageResult,
    },
}

/// Snapshot of the pagination state of one timeline session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    is_loading_older: bool,
    is_loading_newer: bool,
    is_loading_around: bool,
    has_loaded_all_older: bool,
    oldest_loaded_message: Option<MessageRef>,
    newest_loaded_message: Option<MessageRef>,
    is_jumping_to_anchor: bool,
}

impl PaginationState {
    /// The state every session starts in
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn is_loading_older(&self) -> bool {
        self.is_loading_older
    }

    pub fn is_loading_newer(&self) -> bool {
        self.is_loading_newer
    }

    pub fn is_loading_around(&self) -> bool {
        self.is_loading_around
    }

    /// Check if any fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.is_loading_older || self.is_loading_newer || self.is_loading_around
    }

    pub fn has_loaded_all_older(&self) -> bool {
        self.has_loaded_all_older
    }

    pub fn oldest_loaded_message(&self) -> Option<&MessageRef> {
        self.oldest_loaded_message.as_ref()
    }

    pub fn newest_loaded_message(&self) -> Option<&MessageRef> {
        self.newest_loaded_message.as_ref()
    }

    pub fn is_jumping_to_anchor(&self) -> bool {
        self.is_jumping_to_anchor
    }

    fn clear_in_flight(&mut self) {
        self.is_loading_older = false;
        self.is_loading_newer = false;
        self.is_loading_around = false;
    }
}

/// Tracks the pagination state across `begin`/`complete` pairs
///
/// Not internally synchronised: callers serialise access, typically by keeping
/// one tracker per session behind a single mutex.
#[derive(Debug, Clone, Default)]
pub struct PaginationTracker {
    state: PaginationState,
}

impl PaginationTracker {
    pub fn new() -> Self {
        Self {
            state: PaginationState::initial(),
        }
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Call right before dispatching the fetch for `pagination`
    pub fn begin(&mut self, pagination: Pagination) {
        self.update(Message::PageRequested(pagination));
    }

    /// Call exactly once after the fetch for `pagination` settled
    pub fn complete(&mut self, pagination: Pagination, result: PageResult) {
        self.update(Message::PageReceived { pagination, result });
    }

    /// Update the tracker based on a message
    ///
    /// This is the only way to modify the pagination state.
    pub fn update(&mut self, message: Message) {
        match message {
            Message::PageRequested(pagination) => {
                let state = &mut self.state;
                let Some(direction) = pagination.direction else {
                    debug!("initial page requested, resetting pagination state");
                    *state = PaginationState::initial();
                    return;
                };

                // Only cleared once `complete` knows where the anchor landed
                if direction.seeks_anchor() {
                    state.is_jumping_to_anchor = true;
                }

                match direction {
                    PaginationDirection::OlderThan(_) | PaginationDirection::OlderThanOrEqual(_) => {
                        state.is_loading_older = true;
                    }
                    PaginationDirection::NewerThan(_) | PaginationDirection::NewerThanOrEqual(_) => {
                        state.is_loading_newer = true;
                    }
                    PaginationDirection::Around { .. } => {
                        state.is_loading_around = true;
                    }
                }
                debug!(?direction, page_size = pagination.page_size, "page requested");
            }
            Message::PageReceived { pagination, result } => {
                self.state.clear_in_flight();

                let messages = match result {
                    Ok(messages) => messages,
                    Err(error) => {
                        warn!(kind = %pagination.kind(), %error, "page fetch failed");
                        return;
                    }
                };

                self.apply_page(&pagination, &messages);
                debug!(
                    kind = %pagination.kind(),
                    received = messages.len(),
                    page_size = pagination.page_size,
                    state = ?self.state,
                    "page received"
                );
            }
        }
    }

    fn apply_page(&mut self, pagination: &Pagination, messages: &[ChatMessage]) {
        let state = &mut self.state;
        let oldest = messages.first().map(MessageRef::from);
        let newest = messages.last().map(MessageRef::from);
        let is_short_page = pagination.is_short_page(messages.len());

        match &pagination.direction {
            Some(PaginationDirection::OlderThan(_) | PaginationDirection::OlderThanOrEqual(_)) => {
                state.oldest_loaded_message = oldest;
                if is_short_page {
                    state.has_loaded_all_older = true;
                }
            }
            Some(PaginationDirection::NewerThan(_) | PaginationDirection::NewerThanOrEqual(_)) => {
                state.newest_loaded_message = newest;
                // Caught up with the present, so there is no next page to ask for
                if is_short_page {
                    state.newest_loaded_message = None;
                    state.is_jumping_to_anchor = false;
                }
            }
            Some(PaginationDirection::Around { .. }) => {
                state.oldest_loaded_message = oldest;
                state.newest_loaded_message = newest;
                if is_short_page {
                    state.is_jumping_to_anchor = false;
                    state.has_loaded_all_older = true;
                }
            }
            None => {
                state.oldest_loaded_message = oldest;
                state.newest_loaded_message = None;
                if is_short_page {
                    state.is_jumping_to_anchor = false;
                    state.has_loaded_all_older = true;
                }
            }
        }

        if let Some(anchor) = pagination
            .direction
            .as_ref()
            .and_then(PaginationDirection::around_anchor)
        {
            self.refine_by_anchor_location(anchor, messages);
        }
    }

    /// Infer which edges of the stream were reached from where the anchor sits in the page.
    ///
    /// - At the midpoint: there is more to load on both sides.
    /// - In the second half: all newer messages are loaded, so the jump is over.
    /// - Otherwise (first half, or missing because the anchor was a reply whose parent
    ///   is the timeline entry): all older messages are loaded.
    fn refine_by_anchor_location(&mut self, anchor: &MessageId, messages: &[ChatMessage]) {
        let mid = messages.len() / 2;
        let Some(mid_message) = messages.get(mid) else {
            return;
        };

        if &mid_message.id == anchor {
            self.state.is_jumping_to_anchor = true;
        } else if messages[mid + 1..].iter().any(|m| &m.id == anchor) {
            self.state.is_jumping_to_anchor = false;
        } else {
            self.state.has_loaded_all_older = true;
        }
    }
}
