//! Shared utilities for the Strata dependency resolver.
//!
//! This crate provides cross-cutting concerns used by all other Strata crates:
//! the unified error type and terminal status/progress indicators.

pub mod errors;
pub mod progress;
