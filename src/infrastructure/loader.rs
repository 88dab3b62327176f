//! Fetch orchestration for one timeline session
//!
//! The loader decides *when* to fetch and which anchor to use; the tracker decides what
//! the window boundaries mean afterwards. Every fetch is bracketed by `begin` and
//! `complete`, and only one fetch may be in flight at a time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    core::{
        FetchError, FetchKind, PageResult, Pagination, PaginationState, PaginationTracker,
        Window,
    },
    domain::{ChatMessage, MessageId, MessageRef},
};

use super::source::MessageSource;

/// Why a load was not performed or did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("a {0} fetch is already in flight")]
    Busy(FetchKind),
    #[error("nothing is loaded yet")]
    NothingLoaded,
    #[error("all older messages are already loaded")]
    ReachedOldest,
    #[error("the window already reaches the newest message")]
    ReachedNewest,
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// A page that was fetched and applied to the session
#[derive(Debug, Clone, Serialize)]
pub struct LoadedPage {
    pub pagination: Pagination,
    pub messages: Vec<ChatMessage>,
    /// Messages that were not in the window before this page
    pub inserted: usize,
}

#[derive(Debug, Default)]
struct Session {
    tracker: PaginationTracker,
    window: Window,
    /// The initial load clears every tracker flag, so the kind in flight is kept here
    in_flight: Option<FetchKind>,
}

/// Drives a [`PaginationTracker`] around fetches from a [`MessageSource`]
pub struct TimelineLoader<S> {
    session: Arc<Mutex<Session>>,
    source: Arc<S>,
    page_size: usize,
}

impl<S> Clone for TimelineLoader<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            source: Arc::clone(&self.source),
            page_size: self.page_size,
        }
    }
}

impl<S: MessageSource> TimelineLoader<S> {
    pub fn new(source: S, page_size: usize) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::default())),
            source: Arc::new(source),
            page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current pagination state snapshot
    pub fn state(&self) -> PaginationState {
        lock(&self.session).tracker.state().clone()
    }

    /// References to every loaded message, oldest first
    pub fn window(&self) -> Vec<MessageRef> {
        lock(&self.session).window.iter().cloned().collect()
    }

    pub fn window_len(&self) -> usize {
        lock(&self.session).window.len()
    }

    /// Load the newest page, resetting the session
    pub async fn load_initial(&self) -> Result<LoadedPage, LoadError> {
        let page_size = self.page_size;
        self.load(|_| Ok(Pagination::initial(page_size))).await
    }

    /// Load the page before the oldest loaded message
    pub async fn load_older(&self) -> Result<LoadedPage, LoadError> {
        let page_size = self.page_size;
        self.load(|state| {
            if state.has_loaded_all_older() {
                return Err(LoadError::ReachedOldest);
            }
            let oldest = state.oldest_loaded_message().ok_or(LoadError::NothingLoaded)?;
            Ok(Pagination::older_than(oldest.id.clone(), page_size))
        })
        .await
    }

    /// Load the page after the newest loaded message
    ///
    /// Only possible while the window lags behind the present, i.e. after a jump.
    pub async fn load_newer(&self) -> Result<LoadedPage, LoadError> {
        let page_size = self.page_size;
        self.load(|state| {
            let newest = state.newest_loaded_message().ok_or(LoadError::ReachedNewest)?;
            Ok(Pagination::newer_than(newest.id.clone(), page_size))
        })
        .await
    }

    /// Jump to `anchor`, loading the page around it
    pub async fn jump_to(&self, anchor: impl Into<MessageId>) -> Result<LoadedPage, LoadError> {
        let pagination = Pagination::jump_to(anchor, self.page_size);
        self.load(|_| Ok(pagination)).await
    }

    /// Reload the page around `anchor` without starting a jump
    pub async fn refresh_around(
        &self,
        anchor: impl Into<MessageId>,
    ) -> Result<LoadedPage, LoadError> {
        let pagination = Pagination::around(anchor, self.page_size);
        self.load(|_| Ok(pagination)).await
    }

    async fn load(
        &self,
        build: impl FnOnce(&PaginationState) -> Result<Pagination, LoadError>,
    ) -> Result<LoadedPage, LoadError> {
        let in_flight = InFlight::begin(&self.session, build)?;
        let result = self.source.fetch(in_flight.pagination()).await;
        in_flight.complete(result)
    }
}

/// Owns the in-flight period of one fetch
///
/// Dropping it before `complete` (e.g. when the load future is cancelled) completes the
/// fetch with [`FetchError::Cancelled`], so the state never stays loading.
struct InFlight<'a> {
    session: &'a Mutex<Session>,
    pagination: Pagination,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn begin(
        session: &'a Mutex<Session>,
        build: impl FnOnce(&PaginationState) -> Result<Pagination, LoadError>,
    ) -> Result<Self, LoadError> {
        let mut guard = lock(session);
        if let Some(kind) = guard.in_flight {
            warn!(%kind, "rejecting load while another fetch is in flight");
            return Err(LoadError::Busy(kind));
        }

        let pagination = build(guard.tracker.state())?;
        debug!(kind = %pagination.kind(), "starting fetch");
        guard.in_flight = Some(pagination.kind());
        guard.tracker.begin(pagination.clone());
        Ok(Self {
            session,
            pagination,
            settled: false,
        })
    }

    fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    fn complete(mut self, result: PageResult) -> Result<LoadedPage, LoadError> {
        self.settled = true;

        let mut guard = lock(self.session);
        let session = &mut *guard;
        session.in_flight = None;
        session
            .tracker
            .complete(self.pagination.clone(), result.clone());
        let messages = result?;
        let inserted = session.window.apply(&self.pagination, &messages);

        Ok(LoadedPage {
            pagination: self.pagination.clone(),
            messages,
            inserted,
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(kind = %self.pagination.kind(), "fetch dropped before completion");
        let mut guard = lock(self.session);
        guard.in_flight = None;
        guard
            .tracker
            .complete(self.pagination.clone(), Err(FetchError::Cancelled));
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    // The session holds plain data, so a panic elsewhere cannot leave it half-updated
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::infrastructure::source::InMemorySource;

    fn loader(count: usize, page_size: usize) -> TimelineLoader<InMemorySource> {
        TimelineLoader::new(InMemorySource::generate(count, 0), page_size)
    }

    #[tokio::test]
    async fn test_load_initial() -> Result<(), LoadError> {
        let loader = loader(100, 25);
        let page = loader.load_initial().await?;

        assert_eq!(page.messages.len(), 25);
        assert_eq!(page.inserted, 25);
        assert_eq!(loader.window_len(), 25);
        let state = loader.state();
        assert_eq!(state.oldest_loaded_message().map(|m| m.id.to_string()), Some("76".into()));
        assert!(!state.has_loaded_all_older());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_older_until_oldest() -> Result<(), LoadError> {
        let loader = loader(60, 25);
        loader.load_initial().await?;
        loader.load_older().await?;
        let last = loader.load_older().await?;

        assert_eq!(last.messages.len(), 10);
        assert!(loader.state().has_loaded_all_older());
        assert_eq!(loader.window_len(), 60);
        assert_eq!(loader.load_older().await.err(), Some(LoadError::ReachedOldest));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_older_before_initial() {
        let loader = loader(10, 5);

        assert_eq!(loader.load_older().await.err(), Some(LoadError::NothingLoaded));
        assert!(!loader.state().is_loading());
    }

    #[tokio::test]
    async fn test_load_newer_without_jump() -> Result<(), LoadError> {
        let loader = loader(10, 5);
        loader.load_initial().await?;

        assert_eq!(loader.load_newer().await.err(), Some(LoadError::ReachedNewest));
        Ok(())
    }

    #[tokio::test]
    async fn test_jump_then_catch_up() -> Result<(), LoadError> {
        let loader = loader(100, 30);
        loader.jump_to(50).await?;
        assert!(loader.state().is_jumping_to_anchor());

        // 65..=94, then 95..=100
        loader.load_newer().await?;
        assert!(loader.state().is_jumping_to_anchor());
        let last = loader.load_newer().await?;

        assert_eq!(last.messages.len(), 6);
        let state = loader.state();
        assert!(!state.is_jumping_to_anchor());
        assert_eq!(state.newest_loaded_message(), None);
        assert_eq!(loader.window_len(), 66);
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_around_near_newest_edge() -> Result<(), LoadError> {
        let loader = loader(100, 30);
        loader.refresh_around(95).await?;

        assert!(!loader.state().is_jumping_to_anchor());
        assert!(!loader.state().has_loaded_all_older());
        Ok(())
    }

    #[tokio::test]
    async fn test_oversized_page_size_after_refresh() -> Result<(), LoadError> {
        let loader = loader(100, usize::MAX);
        let around = loader.refresh_around(50).await?;
        assert_eq!(around.messages.len(), 100);
        assert!(loader.state().has_loaded_all_older());

        let newer = loader.load_newer().await?;

        assert!(newer.messages.is_empty());
        assert_eq!(loader.state().newest_loaded_message(), None);
        assert_eq!(loader.window_len(), 100);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_state() -> Result<(), LoadError> {
        let loader = loader(100, 25);
        loader.load_initial().await?;
        let before = loader.state();

        loader
            .source()
            .fail_next(FetchError::Transport("offline".into()))
            .await;
        let result = loader.load_older().await;

        assert_eq!(
            result.err(),
            Some(LoadError::Fetch(FetchError::Transport("offline".into())))
        );
        assert_eq!(loader.state(), before);

        // Retrying with the unchanged state resumes where it left off
        let page = loader.load_older().await?;
        assert_eq!(page.messages.first().map(|m| m.id.to_string()), Some("51".into()));
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_load_is_rejected() {
        let source = InMemorySource::generate(100, 0).with_latency(Duration::from_millis(20));
        let loader = TimelineLoader::new(source, 25);

        let (first, second) = tokio::join!(loader.load_initial(), loader.jump_to(10));

        assert!(first.is_ok());
        assert_eq!(second.err(), Some(LoadError::Busy(FetchKind::Initial)));
        assert!(!loader.state().is_jumping_to_anchor());
    }

    #[tokio::test]
    async fn test_cancelled_fetch_releases_in_flight_flag() {
        let source = InMemorySource::generate(100, 0).with_latency(Duration::from_millis(200));
        let loader = TimelineLoader::new(source, 25);

        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), loader.jump_to(50)).await;

        assert!(timed_out.is_err());
        let state = loader.state();
        assert!(!state.is_loading());
        assert!(state.is_jumping_to_anchor());
        assert!(loader.load_initial().await.is_ok());
    }
}
