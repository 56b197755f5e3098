//! Channel discovery service.
//!
//! Turns keywords into a deduplicated set of channel ids via paginated
//! `type=channel` search.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::api::{SearchHints, YouTubeClient};
use crate::error::{AppError, Result};
use crate::models::{ChannelId, SearchConfig};
use crate::utils::progress;

/// Ids found for a single keyword.
#[derive(Debug, Clone, Default)]
pub struct KeywordDiscovery {
    pub ids: HashSet<ChannelId>,
    pub pages_fetched: u32,
    /// A page failed and the remaining pages were not requested
    pub page_failed: bool,
}

/// Union over all keywords searched.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    pub ids: HashSet<ChannelId>,
    pub keywords_searched: usize,
    pub page_failures: usize,
    /// The candidate cap was reached before every keyword was searched
    pub capped: bool,
}

/// Service for discovering channels by keyword.
pub struct ChannelDiscovery {
    client: Arc<YouTubeClient>,
    concurrency: usize,
}

impl ChannelDiscovery {
    pub fn new(client: Arc<YouTubeClient>, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    /// Collect channel ids for one keyword, following continuation tokens.
    ///
    /// Stops at `max_pages`, at the last page, or at the first failed page.
    /// Ids from pages already fetched are kept either way.
    pub async fn discover(
        &self,
        keyword: &str,
        max_pages: u32,
        hints: SearchHints<'_>,
    ) -> KeywordDiscovery {
        let mut found = KeywordDiscovery::default();
        let mut page_token: Option<String> = None;

        for _ in 0..max_pages {
            let page = match self
                .client
                .search_channels(keyword, hints, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(error) => {
                    log::warn!("search.list failed for '{}': {}", keyword, error);
                    found.page_failed = true;
                    break;
                }
            };

            found.pages_fetched += 1;
            found.ids.extend(page.channel_ids);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        found
    }

    /// Union of [`discover`](Self::discover) over every keyword.
    ///
    /// Keywords are searched concurrently but reported in input order. Once
    /// `max_candidates` unique ids are known, no further keywords are
    /// searched. Fails only when the run has been aborted.
    pub async fn discover_all(&self, keywords: &[String], search: &SearchConfig) -> Result<DiscoveryOutcome> {
        let hints = SearchHints {
            region_code: search.region_code.as_deref(),
            relevance_language: search.relevance_language.as_deref(),
        };
        let keywords: Vec<&str> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();
        let total = keywords.len();

        let mut outcome = DiscoveryOutcome::default();
        let mut searches = stream::iter(keywords)
            .map(|keyword| async move {
                let found = self.discover(keyword, search.max_pages, hints).await;
                (keyword, found)
            })
            .buffered(self.concurrency);

        while let Some((keyword, found)) = searches.next().await {
            if let Some(reason) = self.client.abort_signal().reason() {
                return Err(AppError::Fatal(reason.clone()));
            }

            outcome.keywords_searched += 1;
            if found.page_failed {
                outcome.page_failures += 1;
            }

            let fetched = found.ids.len();
            let before = outcome.ids.len();
            outcome.ids.extend(found.ids);

            log::info!("Searching ({}/{}): {}", outcome.keywords_searched, total, keyword);
            progress::sub_item(&format!(
                "fetched={} / unique_added={} / unique_total={}",
                fetched,
                outcome.ids.len() - before,
                outcome.ids.len()
            ));

            if let Some(cap) = search.max_candidates {
                if outcome.ids.len() >= cap && outcome.keywords_searched < total {
                    log::info!("Candidate cap {} reached; skipping remaining keywords", cap);
                    outcome.capped = true;
                    break;
                }
            }
        }

        Ok(outcome)
    }
}
