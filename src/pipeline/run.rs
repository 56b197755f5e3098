//! Run orchestration.
//!
//! Wires the stages together for one run:
//!
//! ```text
//! keywords ─▶ discovery ─▶ details ─▶ prefilter ─▶ activity ─▶ filter ─▶ aggregate
//! ```
//!
//! Discovery and detail lookups fan out over the worker pool; activity
//! resolution runs unordered and feeds a single [`Aggregator`]. Nothing is
//! returned for export until every worker has finished.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::api::{HttpTransport, YouTubeClient};
use crate::error::{AppError, Result};
use crate::models::{ChannelId, Config, FilterCriteria, ResultRow, RunStats};
use crate::services::{ActivityResolver, ChannelDiscovery, DetailFetcher};
use crate::utils::progress;

use super::aggregate::Aggregator;
use super::filter::{FilterPipeline, Verdict};

const TOTAL_STEPS: usize = 4;

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Discovery produced no channel ids
    NoCandidates,
    /// Candidates were found but none passed the filter
    NoMatches,
    Matched(usize),
}

/// Rows in export order plus counters.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub rows: Vec<ResultRow>,
    pub stats: RunStats,
    pub status: RunStatus,
}

/// Channel discovery pipeline bound to one API client and configuration.
pub struct Scout {
    client: Arc<YouTubeClient>,
    config: Config,
}

impl Scout {
    pub fn new(client: Arc<YouTubeClient>, config: Config) -> Self {
        Self { client, config }
    }

    /// Build a scout over HTTP with the configured retry policy and gate.
    pub fn connect(config: Config, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::MissingCredential);
        }
        let transport = HttpTransport::new(&config.api, api_key.trim())?;
        Ok(Self::new(Arc::new(YouTubeClient::new(Arc::new(transport))), config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &Arc<YouTubeClient> {
        &self.client
    }

    /// Probe the API once before any real work.
    pub async fn sanity_check(&self) -> Result<()> {
        self.client.probe().await.map_err(AppError::SanityCheck)?;
        log::info!("API sanity check passed");
        Ok(())
    }

    /// Run discovery, enrichment, filtering and aggregation.
    ///
    /// Per-item failures are absorbed by the stages. The only error is a
    /// fatal API condition, in which case no rows are returned.
    pub async fn run(&self, criteria: FilterCriteria) -> Result<RunOutcome> {
        let mut stats = RunStats::started_at(Utc::now());
        let workers = self.config.pipeline.workers.max(1);
        let filter = FilterPipeline::new(criteria);

        progress::step(1, TOTAL_STEPS, "Discovering channels");
        let discovery = ChannelDiscovery::new(self.client.clone(), workers)
            .discover_all(&self.config.search.keywords, &self.config.search)
            .await?;
        stats.keywords_searched = discovery.keywords_searched;
        stats.search_page_failures = discovery.page_failures;
        stats.candidates = discovery.ids.len();

        if discovery.ids.is_empty() {
            log::warn!("No channels found for any keyword");
            return Ok(Self::finish(stats, Vec::new(), RunStatus::NoCandidates));
        }

        let mut ids: Vec<ChannelId> = discovery.ids.into_iter().collect();
        ids.sort();

        progress::step(2, TOTAL_STEPS, &format!("Fetching details for {} channels", ids.len()));
        let details = DetailFetcher::new(self.client.clone(), workers)
            .fetch_details(&ids)
            .await?;
        stats.detail_batches = details.batches;
        stats.detail_batch_failures = details.failed_batches;
        stats.details_fetched = details.details.len();

        let candidates: Vec<_> = details
            .details
            .into_iter()
            .filter(|detail| match filter.prefilter(detail) {
                Verdict::Accept => true,
                Verdict::Reject(predicate) => {
                    log::debug!("{} rejected by {}", detail.id, predicate);
                    stats.prefilter_rejected += 1;
                    false
                }
            })
            .collect();
        progress::sub_item(&format!(
            "{} of {} channels pass the detail filters",
            candidates.len(),
            stats.details_fetched
        ));

        progress::step(3, TOTAL_STEPS, "Resolving latest activity");
        let resolver = ActivityResolver::new(self.client.clone());
        let resolver = &resolver;
        let mut resolutions = stream::iter(candidates)
            .map(|detail| async move {
                let activity = resolver.resolve(&detail).await;
                (detail, activity)
            })
            .buffer_unordered(workers);

        let mut aggregator = Aggregator::new();
        while let Some((detail, activity)) = resolutions.next().await {
            if let Some(reason) = self.client.abort_signal().reason() {
                return Err(AppError::Fatal(reason.clone()));
            }

            stats.record_resolution(activity.resolved_via);
            match filter.evaluate(&detail, &activity) {
                Verdict::Accept => aggregator.push(ResultRow::new(&detail, &activity)),
                Verdict::Reject(predicate) => {
                    log::debug!("{} rejected by {}", detail.id, predicate);
                }
            }
        }
        drop(resolutions);

        progress::step(4, TOTAL_STEPS, "Aggregating results");
        stats.accepted = aggregator.pushed();
        let matched = !aggregator.is_empty();
        let rows = aggregator.finish(self.config.pipeline.max_results);

        let status = if matched {
            RunStatus::Matched(rows.len())
        } else {
            RunStatus::NoMatches
        };
        Ok(Self::finish(stats, rows, status))
    }

    fn finish(mut stats: RunStats, rows: Vec<ResultRow>, status: RunStatus) -> RunOutcome {
        stats.exported = rows.len();
        stats.end_time = Some(Utc::now());
        RunOutcome { rows, stats, status }
    }
}

/// Log the counters of a finished run.
pub fn report(stats: &RunStats) {
    use crate::models::ResolvedVia;

    progress::separator();
    progress::summary(
        "Run statistics",
        &[
            ("Keywords searched", stats.keywords_searched.to_string()),
            ("Failed search pages", stats.search_page_failures.to_string()),
            ("Candidates", stats.candidates.to_string()),
            (
                "Detail batches",
                format!("{} ({} failed)", stats.detail_batches, stats.detail_batch_failures),
            ),
            ("Details fetched", stats.details_fetched.to_string()),
            ("Rejected before activity", stats.prefilter_rejected.to_string()),
            (
                "Activity via playlist/search/none",
                format!(
                    "{}/{}/{}",
                    stats.resolved_via(ResolvedVia::Primary),
                    stats.resolved_via(ResolvedVia::Fallback),
                    stats.resolved_via(ResolvedVia::Unresolved)
                ),
            ),
            ("Accepted", stats.accepted.to_string()),
            ("Rows", stats.exported.to_string()),
            (
                "Elapsed",
                stats
                    .elapsed_secs()
                    .map_or_else(|| "-".to_string(), |s| format!("{s}s")),
            ),
        ],
    );
}
