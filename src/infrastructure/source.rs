//! Transport collaborators that answer page requests

use std::future::Future;

use crate::core::{PageResult, Pagination};

pub mod memory;

pub use memory::InMemorySource;

/// Anything that can fetch a page of messages for a pagination request
///
/// Implementations return messages oldest first and are assumed to keep message
/// identities stable between calls.
pub trait MessageSource: Send + Sync {
    fn fetch(&self, pagination: &Pagination) -> impl Future<Output = PageResult> + Send;
}
