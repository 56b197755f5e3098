//! Latest-activity resolver.
//!
//! Determines when a channel last published a video. The uploads playlist is
//! tried first; a missing playlist, any error on it, or an empty playlist
//! falls back to a date-ordered video search.
//!
//! ```text
//! Start ─▶ TryPrimary ─▶ Resolved(Primary)
//!   │          │
//!   └──────────┴─▶ TryFallback ─▶ Resolved(Fallback) | Unresolved
//! ```

use std::sync::Arc;

use crate::api::YouTubeClient;
use crate::error::ApiError;
use crate::models::{ActivityRecord, ChannelDetail, ResolvedVia};
use crate::utils::time::Timestamp;

/// Why the fallback path was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackCause {
    MissingPlaylist,
    PrimaryNotFound,
    PrimaryFailed(ApiError),
    PrimaryEmpty,
}

/// Resolution state for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveState {
    Start,
    TryPrimary { playlist_id: String },
    TryFallback(FallbackCause),
    Resolved { at: Timestamp, via: ResolvedVia },
    Unresolved,
}

impl ResolveState {
    /// Transition out of `Start`.
    pub fn start(detail: &ChannelDetail) -> Self {
        match detail.uploads_playlist_id.as_deref() {
            Some(id) if !id.is_empty() => ResolveState::TryPrimary {
                playlist_id: id.to_string(),
            },
            _ => ResolveState::TryFallback(FallbackCause::MissingPlaylist),
        }
    }

    /// Transition out of `TryPrimary` given the playlist lookup result.
    pub fn after_primary(result: Result<Option<Timestamp>, ApiError>) -> Self {
        match result {
            Ok(Some(at)) => ResolveState::Resolved {
                at,
                via: ResolvedVia::Primary,
            },
            Ok(None) => ResolveState::TryFallback(FallbackCause::PrimaryEmpty),
            Err(error) if error.is_not_found() => {
                ResolveState::TryFallback(FallbackCause::PrimaryNotFound)
            }
            Err(error) => ResolveState::TryFallback(FallbackCause::PrimaryFailed(error)),
        }
    }

    /// Transition out of `TryFallback` given the search result.
    pub fn after_fallback(result: Result<Option<Timestamp>, ApiError>) -> Self {
        match result {
            Ok(Some(at)) => ResolveState::Resolved {
                at,
                via: ResolvedVia::Fallback,
            },
            Ok(None) | Err(_) => ResolveState::Unresolved,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ResolveState::Resolved { .. } | ResolveState::Unresolved)
    }
}

/// Service resolving the latest publish time of a channel. Never fails.
pub struct ActivityResolver {
    client: Arc<YouTubeClient>,
}

impl ActivityResolver {
    pub fn new(client: Arc<YouTubeClient>) -> Self {
        Self { client }
    }

    /// Drive the state machine to a terminal state.
    pub async fn resolve(&self, detail: &ChannelDetail) -> ActivityRecord {
        let mut state = ResolveState::Start;

        loop {
            state = match state {
                ResolveState::Start => ResolveState::start(detail),
                ResolveState::TryPrimary { playlist_id } => {
                    let result = self.client.latest_upload(&playlist_id).await;
                    ResolveState::after_primary(result)
                }
                ResolveState::TryFallback(cause) => {
                    log_fallback(detail, &cause);
                    let result = self.client.latest_video(&detail.id).await;
                    if let Err(error) = &result {
                        log::warn!("Fallback search failed for {}: {}", detail.id, error);
                    }
                    ResolveState::after_fallback(result)
                }
                ResolveState::Resolved { at, via } => {
                    return ActivityRecord::resolved(detail.id.clone(), at, via);
                }
                ResolveState::Unresolved => {
                    return ActivityRecord::unresolved(detail.id.clone());
                }
            };
        }
    }
}

fn log_fallback(detail: &ChannelDetail, cause: &FallbackCause) {
    match cause {
        FallbackCause::MissingPlaylist => {
            log::debug!("{} has no uploads playlist; using search", detail.id)
        }
        FallbackCause::PrimaryNotFound => {
            log::debug!("Uploads playlist of {} not found; using search", detail.id)
        }
        FallbackCause::PrimaryEmpty => {
            log::debug!("Uploads playlist of {} is empty; using search", detail.id)
        }
        FallbackCause::PrimaryFailed(error) => {
            log::warn!("playlistItems failed for {} ({}); using search", detail.id, error)
        }
    }
}
