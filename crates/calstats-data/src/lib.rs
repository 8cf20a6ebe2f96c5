//! Data layer for calendar-stats.
//!
//! Responsible for loading calendar exports from disk, normalising each
//! event, aggregating the normalised facts and running the top-level
//! statistics pipeline.

pub mod aggregator;
pub mod analysis;
pub mod normalizer;
pub mod reader;

pub use calstats_core as core;
