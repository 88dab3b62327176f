//! Page requests and results exchanged between the orchestrator and the tracker

use serde::Serialize;
use strum::Display;
use thiserror::Error;

use crate::domain::{ChatMessage, MessageId};

/// Where a page should be fetched relative to an anchor message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationDirection {
    /// Messages strictly older than the anchor
    OlderThan(MessageId),
    /// Messages older than the anchor, including the anchor itself
    OlderThanOrEqual(MessageId),
    /// Messages strictly newer than the anchor
    NewerThan(MessageId),
    /// Messages newer than the anchor, including the anchor itself
    NewerThanOrEqual(MessageId),
    /// A page centred on the anchor
    ///
    /// `seeks_anchor` distinguishes a "jump to message" navigation from a plain
    /// refresh of the window around a known message.
    Around { anchor: MessageId, seeks_anchor: bool },
}

/// The kind of fetch a direction starts, used for the in-flight flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FetchKind {
    Older,
    Newer,
    Around,
    Initial,
}

impl PaginationDirection {
    pub fn kind(&self) -> FetchKind {
        match self {
            Self::OlderThan(_) | Self::OlderThanOrEqual(_) => FetchKind::Older,
            Self::NewerThan(_) | Self::NewerThanOrEqual(_) => FetchKind::Newer,
            Self::Around { .. } => FetchKind::Around,
        }
    }

    pub fn anchor(&self) -> &MessageId {
        match self {
            Self::OlderThan(id)
            | Self::OlderThanOrEqual(id)
            | Self::NewerThan(id)
            | Self::NewerThanOrEqual(id)
            | Self::Around { anchor: id, .. } => id,
        }
    }

    /// The anchor of an `Around` request, if any
    pub fn around_anchor(&self) -> Option<&MessageId> {
        match self {
            Self::Around { anchor, .. } => Some(anchor),
            _ => None,
        }
    }

    /// True only for `Around` requests flagged as a jump to the anchor
    pub fn seeks_anchor(&self) -> bool {
        matches!(
            self,
            Self::Around {
                seeks_anchor: true,
                ..
            }
        )
    }
}

/// A single page request
///
/// A `None` direction asks for the initial (newest) page and resets the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub direction: Option<PaginationDirection>,
    pub page_size: usize,
}

impl Pagination {
    pub fn initial(page_size: usize) -> Self {
        Self {
            direction: None,
            page_size,
        }
    }

    pub fn older_than(id: impl Into<MessageId>, page_size: usize) -> Self {
        Self::with_direction(PaginationDirection::OlderThan(id.into()), page_size)
    }

    pub fn older_than_or_equal(id: impl Into<MessageId>, page_size: usize) -> Self {
        Self::with_direction(PaginationDirection::OlderThanOrEqual(id.into()), page_size)
    }

    pub fn newer_than(id: impl Into<MessageId>, page_size: usize) -> Self {
        Self::with_direction(PaginationDirection::NewerThan(id.into()), page_size)
    }

    pub fn newer_than_or_equal(id: impl Into<MessageId>, page_size: usize) -> Self {
        Self::with_direction(PaginationDirection::NewerThanOrEqual(id.into()), page_size)
    }

    /// Jump to a message: a page around it that starts an anchor navigation
    pub fn jump_to(id: impl Into<MessageId>, page_size: usize) -> Self {
        Self::with_direction(
            PaginationDirection::Around {
                anchor: id.into(),
                seeks_anchor: true,
            },
            page_size,
        )
    }

    /// Reload the page around a known message without starting a jump
    pub fn around(id: impl Into<MessageId>, page_size: usize) -> Self {
        Self::with_direction(
            PaginationDirection::Around {
                anchor: id.into(),
                seeks_anchor: false,
            },
            page_size,
        )
    }

    fn with_direction(direction: PaginationDirection, page_size: usize) -> Self {
        Self {
            direction: Some(direction),
            page_size,
        }
    }

    pub fn kind(&self) -> FetchKind {
        self.direction
            .as_ref()
            .map_or(FetchKind::Initial, PaginationDirection::kind)
    }

    /// True when the page came back shorter than requested
    pub fn is_short_page(&self, received: usize) -> bool {
        received < self.page_size
    }
}

/// Why a page fetch failed
///
/// The tracker treats every variant the same way; the distinction is for the
/// orchestrator and the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("anchor message {0} not found")]
    NotFound(MessageId),
    #[error("fetch was cancelled")]
    Cancelled,
}

/// The outcome of a page fetch, oldest message first
pub type PageResult = Result<Vec<ChatMessage>, FetchError>;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Pagination::older_than(1, 10), FetchKind::Older)]
    #[case(Pagination::older_than_or_equal(1, 10), FetchKind::Older)]
    #[case(Pagination::newer_than(1, 10), FetchKind::Newer)]
    #[case(Pagination::newer_than_or_equal(1, 10), FetchKind::Newer)]
    #[case(Pagination::around(1, 10), FetchKind::Around)]
    #[case(Pagination::jump_to(1, 10), FetchKind::Around)]
    #[case(Pagination::initial(10), FetchKind::Initial)]
    fn test_kind(#[case] pagination: Pagination, #[case] expected: FetchKind) {
        assert_eq!(pagination.kind(), expected);
    }

    #[test]
    fn test_seeks_anchor_only_for_jumps() {
        let jump = Pagination::jump_to(5, 10);
        let refresh = Pagination::around(5, 10);

        assert!(jump.direction.as_ref().is_some_and(|d| d.seeks_anchor()));
        assert!(!refresh.direction.as_ref().is_some_and(|d| d.seeks_anchor()));
    }

    #[test]
    fn test_around_anchor() {
        let around = PaginationDirection::Around {
            anchor: MessageId::from(5),
            seeks_anchor: false,
        };

        assert_eq!(around.around_anchor(), Some(&MessageId::from(5)));
        assert_eq!(PaginationDirection::NewerThan(MessageId::from(5)).around_anchor(), None);
        assert_eq!(around.anchor(), &MessageId::from(5));
    }

    #[test]
    fn test_is_short_page() {
        let pagination = Pagination::older_than(1, 25);

        assert!(pagination.is_short_page(10));
        assert!(!pagination.is_short_page(25));
    }

    #[test]
    fn test_fetch_kind_display() {
        assert_eq!(FetchKind::Older.to_string(), "older");
        assert_eq!(FetchKind::Initial.to_string(), "initial");
    }
}
