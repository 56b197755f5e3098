//! Response shapes consumed from the platform API.
//!
//! Only the fields the pipeline reads are modelled; everything is optional
//! or defaulted so that partial responses still decode.

use serde::Deserialize;

use crate::models::{ChannelDetail, ChannelId};
use crate::utils::time::parse_timestamp;

/// Envelope shared by every list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// `search` result item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchItem {
    pub id: SearchItemId,
    pub snippet: SearchSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchItemId {
    pub channel_id: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchSnippet {
    pub channel_id: Option<String>,
    pub published_at: Option<String>,
}

impl SearchItem {
    /// Channel the item belongs to, from the snippet or the id block.
    pub fn channel_id(&self) -> Option<ChannelId> {
        self.snippet
            .channel_id
            .as_deref()
            .or(self.id.channel_id.as_deref())
            .filter(|id| !id.is_empty())
            .map(ChannelId::from)
    }
}

/// `channels` result item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelItem {
    pub id: String,
    pub snippet: ChannelSnippet,
    pub statistics: ChannelStatistics,
    pub content_details: ChannelContentDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
    pub custom_url: Option<String>,
}

/// Counts arrive as decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub subscriber_count: Option<String>,
    pub video_count: Option<String>,
    pub hidden_subscriber_count: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

impl From<ChannelItem> for ChannelDetail {
    fn from(item: ChannelItem) -> Self {
        let stats = item.statistics;
        let subscriber_count = if stats.hidden_subscriber_count {
            None
        } else {
            parse_count(stats.subscriber_count.as_deref())
        };

        Self {
            id: ChannelId::from(item.id),
            title: item.snippet.title.unwrap_or_default(),
            description: item.snippet.description.unwrap_or_default(),
            subscriber_count,
            video_count: parse_count(stats.video_count.as_deref()),
            created_at: item.snippet.published_at.as_deref().and_then(parse_timestamp),
            uploads_playlist_id: non_empty(item.content_details.related_playlists.uploads),
            handle: non_empty(item.snippet.custom_url),
        }
    }
}

/// `playlistItems` result item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaylistItem {
    pub snippet: PlaylistSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaylistSnippet {
    pub published_at: Option<String>,
}

fn parse_count(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
