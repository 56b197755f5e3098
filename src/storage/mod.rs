//! Result exporters.
//!
//! An exporter receives the final, ordered rows of a run and owns file
//! naming, encoding and column presentation.
//!
//! ```text
//! {output.dir}/
//! ├── {prefix}_YYYYMMDD_HHMM.csv    # one row per channel, export order
//! └── {prefix}_YYYYMMDD_HHMM.json   # rows plus run statistics
//! ```

pub mod csv;
pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{ResultRow, RunStats};

pub use local::LocalExporter;

/// What an export wrote.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub rows: usize,
}

/// Body of the JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument<'a> {
    pub generated_at: DateTime<Utc>,
    pub count: usize,
    pub stats: &'a RunStats,
    pub rows: &'a [ResultRow],
}

impl<'a> ExportDocument<'a> {
    pub fn new(rows: &'a [ResultRow], stats: &'a RunStats) -> Self {
        Self {
            generated_at: Utc::now(),
            count: rows.len(),
            stats,
            rows,
        }
    }
}

/// Trait for result export backends.
#[async_trait]
pub trait ResultExporter: Send + Sync {
    /// Write rows in the order given.
    async fn export(&self, rows: &[ResultRow], stats: &RunStats) -> Result<ExportSummary>;
}
