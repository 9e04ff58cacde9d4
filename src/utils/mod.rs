//! Utility functions and helpers for the bouquetly relay.
//!
//! This module provides cross-cutting concerns like structured logging,
//! API-key sanitization, and the bounded fixed-delay retry client.
//!
//! # Submodules
//!
//! - `logging`: Tracing and logging initialization with security filters.
//! - `retry`: Bounded retry for provider-bound HTTP requests.

pub mod logging;
pub mod retry;
