//! Channel detail service.
//!
//! Enriches channel ids with statistics, snippet and content details through
//! batched lookups. Best effort: a failed batch is logged and skipped.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::api::{MAX_PAGE_SIZE, YouTubeClient};
use crate::error::{AppError, Result};
use crate::models::{ChannelDetail, ChannelId};

/// Details fetched for a set of ids.
#[derive(Debug, Clone, Default)]
pub struct DetailOutcome {
    /// Batch order, then API response order; at most one record per id
    pub details: Vec<ChannelDetail>,
    pub batches: usize,
    pub failed_batches: usize,
}

/// Service for fetching channel details in batches.
pub struct DetailFetcher {
    client: Arc<YouTubeClient>,
    concurrency: usize,
    batch_size: usize,
}

impl DetailFetcher {
    pub fn new(client: Arc<YouTubeClient>, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
            batch_size: MAX_PAGE_SIZE,
        }
    }

    /// Override the batch size (capped at the API limit).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Fetch details for every id. Fails only when the run has been aborted.
    pub async fn fetch_details(&self, ids: &[ChannelId]) -> Result<DetailOutcome> {
        let batches: Vec<&[ChannelId]> = ids.chunks(self.batch_size).collect();
        let mut outcome = DetailOutcome {
            batches: batches.len(),
            ..DetailOutcome::default()
        };

        let mut seen: HashSet<ChannelId> = HashSet::new();
        let mut lookups = stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| async move { (index, self.client.list_channels(batch).await) })
            .buffered(self.concurrency);

        while let Some((index, result)) = lookups.next().await {
            if let Some(reason) = self.client.abort_signal().reason() {
                return Err(AppError::Fatal(reason.clone()));
            }

            match result {
                Ok(details) => {
                    log::debug!("Batch {} returned {} channels", index + 1, details.len());
                    for detail in details {
                        if seen.insert(detail.id.clone()) {
                            outcome.details.push(detail);
                        }
                    }
                }
                Err(error) => {
                    outcome.failed_batches += 1;
                    log::warn!("channels.list batch {} failed: {}", index + 1, error);
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{FakeTransport, http_error};
    use serde_json::json;

    fn ids(n: usize) -> Vec<ChannelId> {
        (0..n).map(|i| ChannelId::new(format!("UC{i}"))).collect()
    }

    #[tokio::test]
    async fn test_batches_respect_limit() {
        let fake = Arc::new(FakeTransport::new());
        fake.on("channels", &[], Ok(json!({"items": []})));
        let fetcher = DetailFetcher::new(Arc::new(YouTubeClient::new(fake.clone())), 2);

        let outcome = fetcher.fetch_details(&ids(120)).await.unwrap();
        assert_eq!(outcome.batches, 3);

        let sizes: Vec<usize> = fake
            .calls()
            .iter()
            .map(|c| c.param("id").unwrap().split(',').count())
            .collect();
        assert_eq!(sizes.iter().sum::<usize>(), 120);
        assert!(sizes.iter().all(|&n| n <= MAX_PAGE_SIZE));
    }

    #[tokio::test]
    async fn test_failed_batch_is_skipped() {
        let fake = Arc::new(FakeTransport::new());
        fake.on("channels", &[("id", "UC0,UC1")], Ok(json!({"items": [{"id": "UC0"}, {"id": "UC1"}]})));
        fake.on("channels", &[("id", "UC2,UC3")], Err(http_error(500)));
        fake.on("channels", &[("id", "UC4")], Ok(json!({"items": [{"id": "UC4"}]})));
        let fetcher = DetailFetcher::new(Arc::new(YouTubeClient::new(fake)), 3).with_batch_size(2);

        let outcome = fetcher.fetch_details(&ids(5)).await.unwrap();
        let got: Vec<&str> = outcome.details.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(got, ["UC0", "UC1", "UC4"]);
        assert_eq!(outcome.failed_batches, 1);
    }

    #[tokio::test]
    async fn test_duplicate_ids_in_response_collapse() {
        let fake = Arc::new(FakeTransport::new());
        fake.on("channels", &[], Ok(json!({"items": [{"id": "UC0"}, {"id": "UC0"}]})));
        let fetcher = DetailFetcher::new(Arc::new(YouTubeClient::new(fake)), 1);

        let outcome = fetcher.fetch_details(&ids(1)).await.unwrap();
        assert_eq!(outcome.details.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_calls() {
        let fake = Arc::new(FakeTransport::new());
        let fetcher = DetailFetcher::new(Arc::new(YouTubeClient::new(fake.clone())), 1);

        let outcome = fetcher.fetch_details(&[]).await.unwrap();
        assert_eq!(outcome.batches, 0);
        assert!(fake.calls().is_empty());
    }
}
