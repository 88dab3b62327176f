use std::collections::{HashMap, VecDeque};
use std::ops::Range;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    core::{FetchError, PageResult, Pagination, PaginationDirection},
    domain::{ChatMessage, MessageId},
};

use super::MessageSource;

const EPOCH_SECS: i64 = 1_700_000_000;
const MESSAGE_INTERVAL_SECS: i64 = 60;

/// An in-memory message stream with server-like paging
///
/// Timeline messages are kept oldest first. Thread replies are kept aside: they
/// never appear in a page, and anchoring on one pages around its parent instead.
#[derive(Debug, Default)]
pub struct InMemorySource {
    timeline: Vec<ChatMessage>,
    replies: HashMap<MessageId, ChatMessage>,
    latency: Duration,
    failures: Mutex<VecDeque<FetchError>>,
}

impl InMemorySource {
    /// Build a source from arbitrary messages; replies are split out by `parent_id`
    pub fn new(messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        let (mut timeline, replies): (Vec<_>, Vec<_>) =
            messages.into_iter().partition(|m| !m.is_reply());
        timeline.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        Self {
            timeline,
            replies: replies.into_iter().map(|m| (m.id.clone(), m)).collect(),
            latency: Duration::ZERO,
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Generate `count` timeline messages with ids `1..=count`, one minute apart
    ///
    /// When `reply_every` is non-zero, every n-th message also gets a reply with
    /// id `r<n>`.
    pub fn generate(count: usize, reply_every: usize) -> Self {
        let mut messages = Vec::with_capacity(count);
        for n in 1..=count as u64 {
            let created_at = timestamp(n as i64);
            messages.push(ChatMessage::new(n, created_at, format!("message #{n}")));
            if reply_every > 0 && n % reply_every as u64 == 0 {
                messages.push(
                    ChatMessage::new(format!("r{n}"), created_at, format!("reply to #{n}"))
                        .reply_to(n),
                );
            }
        }
        info!(count, reply_every, "generated in-memory message stream");
        Self::new(messages)
    }

    /// Delay every fetch by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next fetch fail with `error`; queued failures are used in order
    pub async fn fail_next(&self, error: FetchError) {
        self.failures.lock().await.push_back(error);
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Timeline index of `id`, or of its parent when `id` is a reply
    fn locate(&self, id: &MessageId) -> Result<usize, FetchError> {
        let target = self
            .replies
            .get(id)
            .and_then(|reply| reply.parent_id.as_ref())
            .unwrap_or(id);
        self.timeline
            .iter()
            .position(|m| &m.id == target)
            .ok_or_else(|| FetchError::NotFound(id.clone()))
    }

    fn page_range(&self, pagination: &Pagination) -> Result<Range<usize>, FetchError> {
        let len = self.timeline.len();
        let size = pagination.page_size;
        let Some(direction) = &pagination.direction else {
            return Ok(len.saturating_sub(size)..len);
        };

        let index = self.locate(direction.anchor())?;
        let range = match direction {
            PaginationDirection::OlderThan(_) => index.saturating_sub(size)..index,
            PaginationDirection::OlderThanOrEqual(_) => {
                (index + 1).saturating_sub(size)..index + 1
            }
            PaginationDirection::NewerThan(_) => {
                index + 1..index.saturating_add(1).saturating_add(size).min(len)
            }
            PaginationDirection::NewerThanOrEqual(_) => index..index.saturating_add(size).min(len),
            PaginationDirection::Around { .. } => {
                // Keep the page full near the newest edge
                let start = index
                    .saturating_sub(size / 2)
                    .min(len.saturating_sub(size));
                start..start.saturating_add(size).min(len)
            }
        };
        Ok(range)
    }

    fn page(&self, pagination: &Pagination) -> PageResult {
        let range = self.page_range(pagination)?;
        debug!(kind = %pagination.kind(), ?range, "serving page");
        Ok(self.timeline[range].to_vec())
    }
}

impl MessageSource for InMemorySource {
    async fn fetch(&self, pagination: &Pagination) -> PageResult {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(error) = self.failures.lock().await.pop_front() {
            return Err(error);
        }
        self.page(pagination)
    }
}

fn timestamp(minutes: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(EPOCH_SECS + minutes * MESSAGE_INTERVAL_SECS, 0)
        .single()
        .unwrap_or_default()
}
