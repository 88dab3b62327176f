//! # timeline-pager - pagination state for message timelines
//!
//! Tracks where a scrollable, ordered message timeline stands while it is fetched in
//! pages from a remote source: which fetch is in flight, which messages bound the loaded
//! window, whether the oldest message was reached, and whether a jump to an arbitrary
//! message is still being resolved.
//!
//! ## Architecture Overview
//!
//! - **Core** (`core`): the pagination tracker, a pure state machine driven by
//!   `begin`/`complete` around each fetch
//! - **Domain** (`domain`): message identities and ordering references
//! - **Infrastructure** (`infrastructure`): the fetch orchestrator, message sources,
//!   configuration and CLI
//!
//! ## Example Usage
//!
//! ```rust
//! use timeline_pager::core::{Pagination, PaginationTracker};
//! use timeline_pager::domain::ChatMessage;
//! use chrono::Utc;
//!
//! let mut tracker = PaginationTracker::new();
//!
//! let pagination = Pagination::older_than(100, 25);
//! tracker.begin(pagination.clone());
//! assert!(tracker.state().is_loading_older());
//!
//! let page: Vec<ChatMessage> = (90..100)
//!     .map(|id| ChatMessage::new(id, Utc::now(), "hello"))
//!     .collect();
//! tracker.complete(pagination, Ok(page));
//!
//! // A short page means the oldest message was reached
//! assert!(tracker.state().has_loaded_all_older());
//! assert!(!tracker.state().is_loading());
//! ```
//!
//! ## Modules
//!
//! - [`core`] - Pagination requests, tracker and loaded window
//! - [`domain`] - Message model
//! - [`infrastructure`] - Orchestration, sources, config and CLI
//! - [`app`] - Command runner used by the binary
//! - [`utils`] - Logging, panic handling and paths

pub mod app;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod utils;

pub use crate::core::{Pagination, PaginationDirection, PaginationState, PaginationTracker};
pub use crate::domain::{ChatMessage, MessageId, MessageRef};
pub use infrastructure::loader::TimelineLoader;

/// Result type used throughout the library
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
