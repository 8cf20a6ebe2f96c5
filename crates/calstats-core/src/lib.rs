//! Core types and policies for calendar-stats.
//!
//! Holds the calendar/statistics data model, stakeholder configuration,
//! the vendor-meeting classification policy, time helpers and the shared
//! error type. Nothing in here touches the network.

pub mod classifier;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod stakeholders;
pub mod time_utils;

pub use error::{Result, StatsError};
