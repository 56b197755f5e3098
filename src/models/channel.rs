//! Channel identity and detail records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::time::Timestamp;

/// Opaque platform-assigned channel identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Channel metadata returned by a batched detail lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDetail {
    pub id: ChannelId,

    pub title: String,

    pub description: String,

    /// `None` when the owner hides it. Never treated as zero.
    pub subscriber_count: Option<u64>,

    pub video_count: Option<u64>,

    /// Channel creation time
    pub created_at: Option<Timestamp>,

    /// Implicit playlist holding every public upload, newest first
    pub uploads_playlist_id: Option<String>,

    /// Human-readable alias, e.g. `@someone`
    pub handle: Option<String>,
}

impl ChannelDetail {
    /// Minimal record with only an id and title, mostly for tests.
    pub fn new(id: impl Into<ChannelId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            subscriber_count: None,
            video_count: None,
            created_at: None,
            uploads_playlist_id: None,
            handle: None,
        }
    }

    /// Text the name-exclusion patterns are matched against.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Public channel page.
    pub fn channel_url(&self) -> String {
        format!("https://www.youtube.com/channel/{}", self.id)
    }

    /// Public handle page, if the channel has a handle.
    pub fn handle_url(&self) -> Option<String> {
        self.handle
            .as_deref()
            .filter(|h| !h.is_empty())
            .map(|h| format!("https://www.youtube.com/{h}"))
    }
}
