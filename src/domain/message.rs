use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identity of a message in the remote stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// Numeric ids are stored in their decimal form
macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for MessageId {
                fn from(id: $ty) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64, usize);

/// A message as returned by a page fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub text: String,
    /// Thread parent, set when this message is a reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<MessageId>,
}

impl ChatMessage {
    pub fn new(id: impl Into<MessageId>, created_at: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at,
            text: text.into(),
            parent_id: None,
        }
    }

    /// Mark this message as a reply to `parent`
    pub fn reply_to(mut self, parent: impl Into<MessageId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// A lightweight reference to a message, holding its identity and ordering key
///
/// The pagination state keeps these for the extremes of the loaded window, so the
/// next request's anchor can be built without holding on to the full message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: MessageId,
    pub created_at: DateTime<Utc>,
}

impl MessageRef {
    pub fn new(id: impl Into<MessageId>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
        }
    }
}

impl From<&ChatMessage> for MessageRef {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.clone(),
            created_at: message.created_at,
        }
    }
}

impl PartialOrd for MessageRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MessageRef {
    fn cmp(&self, other: &Self) -> Ordering {
        // Timestamp first, identity breaks ties
        match self.created_at.cmp(&other.created_at) {
            Ordering::Equal => self.id.cmp(&other.id),
            other => other,
        }
    }
}
