//! Infrastructure layer
//!
//! This module handles everything around the pagination core:
//! - CLI argument processing
//! - Configuration loading
//! - Message sources (the transport collaborator)
//! - Fetch orchestration

pub mod cli;
pub mod config;
pub mod loader;
pub mod source;
