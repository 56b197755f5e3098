//! Result aggregation.
//!
//! The single point where concurrently produced rows meet. Keyed by channel
//! id with last-write-wins, then sorted into export order.

use std::collections::HashMap;

use crate::models::{ChannelId, ResultRow};

/// Accumulates accepted rows for one run.
#[derive(Debug, Default)]
pub struct Aggregator {
    rows: HashMap<ChannelId, ResultRow>,
    pushed: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row, replacing any earlier row for the same channel.
    pub fn push(&mut self, row: ResultRow) {
        self.pushed += 1;
        self.rows.insert(row.channel_id.clone(), row);
    }

    /// Rows pushed so far, duplicates included.
    pub fn pushed(&self) -> usize {
        self.pushed
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in export order, truncated to `max_results` when set.
    pub fn finish(self, max_results: Option<usize>) -> Vec<ResultRow> {
        let mut rows: Vec<ResultRow> = self.rows.into_values().collect();
        rows.sort_by(ResultRow::export_cmp);
        if let Some(limit) = max_results {
            rows.truncate(limit);
        }
        rows
    }
}

impl Extend<ResultRow> for Aggregator {
    fn extend<T: IntoIterator<Item = ResultRow>>(&mut self, iter: T) {
        for row in iter {
            self.push(row);
        }
    }
}

/// Deduplicate and order a batch of rows.
pub fn aggregate(rows: impl IntoIterator<Item = ResultRow>) -> Vec<ResultRow> {
    let mut aggregator = Aggregator::new();
    aggregator.extend(rows);
    aggregator.finish(None)
}
