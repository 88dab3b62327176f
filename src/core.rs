//! Pagination core
//!
//! This module contains the pagination state machine and the values it consumes:
//! - Page requests, directions and results
//! - The pagination state tracker
//! - The loaded message window

pub mod pagination;
pub mod tracker;
pub mod window;

pub use pagination::{FetchError, FetchKind, PageResult, Pagination, PaginationDirection};
pub use tracker::{PaginationState, PaginationTracker};
pub use window::Window;
