// src/models/mod.rs

//! Domain models for the scout application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod activity;
mod channel;
mod config;
mod criteria;
mod row;
mod stats;

// Re-export all public types
pub use activity::{ActivityRecord, ResolvedVia};
pub use channel::{ChannelDetail, ChannelId};
pub use config::{
    ApiConfig, Config, ExportFormat, FilterConfig, OutputConfig, PipelineConfig, SearchConfig,
    SubscriberBounds,
};
pub use criteria::{FilterCriteria, NameExcluder, PatternExcluder, SubscriberRange};
pub use row::ResultRow;
pub use stats::RunStats;
