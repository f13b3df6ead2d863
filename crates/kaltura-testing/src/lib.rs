//! Test utilities for the Kaltura LTI persistence layer.
//!
//! Provides an in-memory `Repository` fake and record fixtures.
//! Use from tests only, never in production code.

pub mod fixture;
pub mod memory;

pub use memory::InMemoryRepository;
