//! Common utilities for the quarry selection engine.
//!
//! This crate provides shared infrastructure used by the other crates:
//! - **Warning System** - deduplicated diagnostics for degraded behavior
//!   (selectors that can never match a static document, and similar)

pub mod warning;
