//! Run statistics.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ResolvedVia;

/// Counters collected over one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub keywords_searched: usize,
    pub search_page_failures: usize,
    pub candidates: usize,
    pub detail_batches: usize,
    pub detail_batch_failures: usize,
    pub details_fetched: usize,
    pub prefilter_rejected: usize,
    pub resolutions: HashMap<ResolvedVia, usize>,
    pub accepted: usize,
    pub exported: usize,
}

impl RunStats {
    pub fn started_at(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time: None,
            keywords_searched: 0,
            search_page_failures: 0,
            candidates: 0,
            detail_batches: 0,
            detail_batch_failures: 0,
            details_fetched: 0,
            prefilter_rejected: 0,
            resolutions: HashMap::new(),
            accepted: 0,
            exported: 0,
        }
    }

    pub fn record_resolution(&mut self, via: ResolvedVia) {
        *self.resolutions.entry(via).or_default() += 1;
    }

    pub fn resolved_via(&self, via: ResolvedVia) -> usize {
        self.resolutions.get(&via).copied().unwrap_or(0)
    }

    /// Wall-clock duration, once the run has finished.
    pub fn elapsed_secs(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_seconds())
    }
}
