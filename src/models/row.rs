//! Export row joining channel detail and resolved activity.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{ActivityRecord, ChannelDetail, ChannelId, ResolvedVia};
use crate::utils::time::Timestamp;

/// One exported channel.
///
/// Only built once both detail and activity are known for the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub channel_id: ChannelId,
    pub title: String,
    pub handle: String,
    pub channel_url: String,
    pub handle_url: String,
    pub subscribers: Option<u64>,
    pub latest_video_published_at: Option<Timestamp>,
    pub video_count: Option<u64>,
    pub channel_started_at: Option<Timestamp>,
    pub description: String,
    pub resolved_via: ResolvedVia,
}

impl ResultRow {
    /// Join a detail record with the activity resolved for it.
    pub fn new(detail: &ChannelDetail, activity: &ActivityRecord) -> Self {
        debug_assert_eq!(detail.id, activity.channel_id);

        Self {
            channel_id: detail.id.clone(),
            title: detail.title.clone(),
            handle: detail.handle.clone().unwrap_or_default(),
            channel_url: detail.channel_url(),
            handle_url: detail.handle_url().unwrap_or_default(),
            subscribers: detail.subscriber_count,
            latest_video_published_at: activity.latest_published_at,
            video_count: detail.video_count,
            channel_started_at: detail.created_at,
            description: detail.description.clone(),
            resolved_via: activity.resolved_via,
        }
    }

    /// Export order: subscribers ascending, then title by byte order, then id.
    ///
    /// The id tiebreak makes this a total order over distinct rows.
    pub fn export_cmp(&self, other: &Self) -> Ordering {
        self.subscribers
            .cmp(&other.subscribers)
            .then_with(|| self.title.as_bytes().cmp(other.title.as_bytes()))
            .then_with(|| self.channel_id.cmp(&other.channel_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, title: &str, subscribers: u64) -> ResultRow {
        let mut detail = ChannelDetail::new(id, title);
        detail.subscriber_count = Some(subscribers);
        ResultRow::new(&detail, &ActivityRecord::unresolved(detail.id.clone()))
    }

    #[test]
    fn test_new_projects_fields() {
        let mut detail = ChannelDetail::new("UC1", "Home Care");
        detail.subscriber_count = Some(12_000);
        detail.video_count = Some(80);
        detail.handle = Some("@homecare".to_string());
        let at = "2024-06-01T00:00:00Z".parse().unwrap();
        let activity = ActivityRecord::resolved(detail.id.clone(), at, ResolvedVia::Primary);

        let row = ResultRow::new(&detail, &activity);
        assert_eq!(row.channel_url, "https://www.youtube.com/channel/UC1");
        assert_eq!(row.handle_url, "https://www.youtube.com/@homecare");
        assert_eq!(row.subscribers, Some(12_000));
        assert_eq!(row.latest_video_published_at, Some(at));
        assert_eq!(row.resolved_via, ResolvedVia::Primary);
    }

    #[test]
    fn test_export_cmp_orders_by_subscribers_then_title() {
        let a = row("UC1", "Beta", 100);
        let b = row("UC2", "Alpha", 200);
        let c = row("UC3", "Alpha", 100);

        assert_eq!(a.export_cmp(&b), Ordering::Less);
        assert_eq!(c.export_cmp(&a), Ordering::Less);
        assert_eq!(a.export_cmp(&a), Ordering::Equal);
    }

    #[test]
    fn test_export_cmp_is_ordinal_not_case_folded() {
        let upper = row("UC1", "Zeta", 1);
        let lower = row("UC2", "alpha", 1);
        assert_eq!(upper.export_cmp(&lower), Ordering::Less);
    }
}
