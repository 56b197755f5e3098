//! Typed calls against the YouTube Data API.
//!
//! Wraps a [`Transport`] with endpoint-specific parameters and decoding, and
//! owns the run's [`AbortSignal`]: the first fatal error trips it, after
//! which no further calls are issued.

use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::models::{ChannelDetail, ChannelId};
use crate::utils::time::{Timestamp, parse_timestamp};

use super::transport::{Params, Transport};
use super::wire::{ChannelItem, ListResponse, PlaylistItem, SearchItem};

/// Largest page the API returns for list calls.
pub const MAX_PAGE_SIZE: usize = 50;

/// Well-known public channel used by the pre-run probe.
const PROBE_CHANNEL_ID: &str = "UC_x5XG1OV2P6uZZ5FSM9Ttw";

/// Tripped once on the first fatal API error of a run.
#[derive(Debug, Default)]
pub struct AbortSignal {
    reason: OnceLock<ApiError>,
}

impl AbortSignal {
    /// Record a fatal error. Returns `false` if already tripped.
    pub fn trip(&self, error: ApiError) -> bool {
        let first = self.reason.set(error).is_ok();
        if first {
            if let Some(reason) = self.reason() {
                log::error!("Fatal API error, aborting run: {}", reason);
            }
        }
        first
    }

    pub fn reason(&self) -> Option<&ApiError> {
        self.reason.get()
    }

    pub fn is_tripped(&self) -> bool {
        self.reason.get().is_some()
    }
}

/// Region and language hints for channel search.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchHints<'a> {
    pub region_code: Option<&'a str>,
    pub relevance_language: Option<&'a str>,
}

/// One page of channel search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub channel_ids: Vec<ChannelId>,
    pub next_page_token: Option<String>,
}

/// Client for the endpoints the pipeline consumes.
pub struct YouTubeClient {
    transport: Arc<dyn Transport>,
    abort: AbortSignal,
}

impl YouTubeClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            abort: AbortSignal::default(),
        }
    }

    pub fn abort_signal(&self) -> &AbortSignal {
        &self.abort
    }

    async fn call<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &Params<'_>,
    ) -> Result<T, ApiError> {
        if self.abort.is_tripped() {
            return Err(ApiError::aborted(path));
        }

        match self.transport.get(path, params).await {
            Ok(value) => serde_json::from_value(value).map_err(|e| ApiError::decode(path, e)),
            Err(error) => {
                if error.is_fatal() {
                    self.abort.trip(error.clone());
                }
                Err(error)
            }
        }
    }

    /// Cheapest possible call, confirming the key is valid and quota remains.
    pub async fn probe(&self) -> Result<(), ApiError> {
        let params = [("part", "id".to_string()), ("id", PROBE_CHANNEL_ID.to_string())];
        self.call::<ListResponse<ChannelItem>>("channels", &params)
            .await
            .map(|_| ())
    }

    /// One page of `type=channel` search results for a keyword.
    pub async fn search_channels(
        &self,
        keyword: &str,
        hints: SearchHints<'_>,
        page_token: Option<&str>,
    ) -> Result<SearchPage, ApiError> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("q", keyword.to_string()),
            ("type", "channel".to_string()),
            ("maxResults", MAX_PAGE_SIZE.to_string()),
        ];
        if let Some(region) = hints.region_code {
            params.push(("regionCode", region.to_string()));
        }
        if let Some(language) = hints.relevance_language {
            params.push(("relevanceLanguage", language.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let page: ListResponse<SearchItem> = self.call("search", &params).await?;
        Ok(SearchPage {
            channel_ids: page.items.iter().filter_map(SearchItem::channel_id).collect(),
            next_page_token: page.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    /// Statistics, snippet and content details for up to 50 channels.
    pub async fn list_channels(&self, ids: &[ChannelId]) -> Result<Vec<ChannelDetail>, ApiError> {
        let joined = ids
            .iter()
            .map(ChannelId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let params = [
            ("part", "statistics,snippet,contentDetails".to_string()),
            ("id", joined),
            ("maxResults", MAX_PAGE_SIZE.to_string()),
        ];

        let page: ListResponse<ChannelItem> = self.call("channels", &params).await?;
        Ok(page
            .items
            .into_iter()
            .filter(|item| !item.id.is_empty())
            .map(ChannelDetail::from)
            .collect())
    }

    /// Publish time of the newest item of an uploads playlist.
    ///
    /// `Ok(None)` means the call succeeded but yielded no usable item.
    pub async fn latest_upload(&self, playlist_id: &str) -> Result<Option<Timestamp>, ApiError> {
        let params = [
            ("part", "snippet,contentDetails".to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", "1".to_string()),
        ];

        let page: ListResponse<PlaylistItem> = self.call("playlistItems", &params).await?;
        Ok(page
            .items
            .first()
            .and_then(|item| item.snippet.published_at.as_deref())
            .and_then(parse_timestamp))
    }

    /// Publish time of the channel's newest video, via a date-ordered search.
    ///
    /// `Ok(None)` means the call succeeded but yielded no usable item.
    pub async fn latest_video(&self, channel_id: &ChannelId) -> Result<Option<Timestamp>, ApiError> {
        let params = [
            ("part", "snippet".to_string()),
            ("channelId", channel_id.to_string()),
            ("type", "video".to_string()),
            ("order", "date".to_string()),
            ("maxResults", "1".to_string()),
        ];

        let page: ListResponse<SearchItem> = self.call("search", &params).await?;
        Ok(page
            .items
            .first()
            .and_then(|item| item.snippet.published_at.as_deref())
            .and_then(parse_timestamp))
    }
}
