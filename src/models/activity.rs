//! Latest-activity resolution outcome.

use serde::{Deserialize, Serialize};

use super::ChannelId;
use crate::utils::time::Timestamp;

/// Which path produced an [`ActivityRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedVia {
    /// Newest item of the uploads playlist
    Primary,
    /// Newest video from a channel-scoped search
    Fallback,
    /// Neither path yielded a timestamp
    Unresolved,
}

impl ResolvedVia {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedVia::Primary => "primary",
            ResolvedVia::Fallback => "fallback",
            ResolvedVia::Unresolved => "unresolved",
        }
    }
}

/// Most recent publish time of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub channel_id: ChannelId,
    pub latest_published_at: Option<Timestamp>,
    pub resolved_via: ResolvedVia,
}

impl ActivityRecord {
    pub fn resolved(channel_id: ChannelId, at: Timestamp, via: ResolvedVia) -> Self {
        Self {
            channel_id,
            latest_published_at: Some(at),
            resolved_via: via,
        }
    }

    pub fn unresolved(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            latest_published_at: None,
            resolved_via: ResolvedVia::Unresolved,
        }
    }
}
