//! Resolved filter criteria.
//!
//! [`FilterConfig`] is what the user writes; [`FilterCriteria`] is what the
//! filter stage evaluates. Resolution happens once per run: patterns are
//! compiled and a relative recency window becomes an absolute cutoff, so
//! every record is judged against the same instant.

use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use regex::{RegexSet, RegexSetBuilder};

use crate::error::Result;

use super::{FilterConfig, SubscriberBounds};

/// Decides whether a channel's text marks it as excluded.
pub trait NameExcluder: Send + Sync + fmt::Debug {
    fn matches(&self, text: &str) -> bool;
}

/// [`NameExcluder`] backed by a case-insensitive, OR-combined regex set.
#[derive(Debug, Clone)]
pub struct PatternExcluder {
    set: RegexSet,
}

impl PatternExcluder {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()?;
        Ok(Self { set })
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl NameExcluder for PatternExcluder {
    fn matches(&self, text: &str) -> bool {
        !text.is_empty() && self.set.is_match(text)
    }
}

/// Subscriber range with explicit per-bound inclusivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberRange {
    pub min: Bound<u64>,
    pub max: Bound<u64>,
}

impl SubscriberRange {
    pub fn unbounded() -> Self {
        Self {
            min: Bound::Unbounded,
            max: Bound::Unbounded,
        }
    }

    pub fn contains(&self, subscribers: u64) -> bool {
        (self.min, self.max).contains(&subscribers)
    }
}

impl From<SubscriberBounds> for SubscriberRange {
    fn from(bounds: SubscriberBounds) -> Self {
        let bound = |value: Option<u64>, inclusive: bool| match value {
            None => Bound::Unbounded,
            Some(v) if inclusive => Bound::Included(v),
            Some(v) => Bound::Excluded(v),
        };
        Self {
            min: bound(bounds.min, bounds.min_inclusive),
            max: bound(bounds.max, bounds.max_inclusive),
        }
    }
}

/// Predicate inputs for one run.
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    /// `None` disables the name-exclusion predicate
    pub excluder: Option<Arc<dyn NameExcluder>>,

    pub subscribers: SubscriberRange,

    /// `None` disables the channel-age predicate
    pub created_after: Option<DateTime<Utc>>,

    /// `None` disables the recency predicate
    pub latest_after: Option<DateTime<Utc>>,
}

impl FilterCriteria {
    /// Criteria that accept every record with a known subscriber count.
    pub fn permissive() -> Self {
        Self {
            excluder: None,
            subscribers: SubscriberRange::unbounded(),
            created_after: None,
            latest_after: None,
        }
    }

    /// Resolve configuration against a single `now`.
    pub fn from_config(config: &FilterConfig, now: DateTime<Utc>) -> Result<Self> {
        let excluder = if config.exclude_patterns.is_empty() {
            None
        } else {
            let patterns = PatternExcluder::new(&config.exclude_patterns)?;
            Some(Arc::new(patterns) as Arc<dyn NameExcluder>)
        };

        let latest_after = match (config.latest_after, config.latest_within_days) {
            (Some(at), _) => Some(at),
            (None, Some(days)) => Some(now - Duration::days(i64::from(days))),
            (None, None) => None,
        };

        Ok(Self {
            excluder,
            subscribers: config.subscribers.into(),
            created_after: config.created_after,
            latest_after,
        })
    }

    pub fn with_excluder(mut self, excluder: impl NameExcluder + 'static) -> Self {
        self.excluder = Some(Arc::new(excluder));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_excluder_is_case_insensitive_or() {
        let excluder = PatternExcluder::new(["NHK", "ball python"]).unwrap();
        assert!(excluder.matches("nhk world"));
        assert!(excluder.matches("My BALL PYTHON care"));
        assert!(!excluder.matches("Python tutorials"));
        assert!(!excluder.matches(""));
    }

    #[test]
    fn test_pattern_excluder_alternation() {
        let excluder = PatternExcluder::new(["芸能|有名人|アイドル"]).unwrap();
        assert!(excluder.matches("人気アイドルの部屋"));
        assert!(!excluder.matches("掃除チャンネル"));
    }

    #[test]
    fn test_subscriber_range_bound_semantics() {
        let inclusive = SubscriberRange::from(SubscriberBounds {
            min: Some(9_000),
            min_inclusive: true,
            max: Some(300_000),
            max_inclusive: true,
        });
        assert!(inclusive.contains(9_000));
        assert!(inclusive.contains(300_000));
        assert!(!inclusive.contains(8_999));
        assert!(!inclusive.contains(300_001));

        let exclusive = SubscriberRange::from(SubscriberBounds {
            min: None,
            min_inclusive: true,
            max: Some(10_000),
            max_inclusive: false,
        });
        assert!(exclusive.contains(0));
        assert!(exclusive.contains(9_999));
        assert!(!exclusive.contains(10_000));
    }

    #[test]
    fn test_within_days_resolves_once_against_now() {
        let now: DateTime<Utc> = "2025-07-01T00:00:00Z".parse().unwrap();
        let config = FilterConfig {
            latest_within_days: Some(30),
            exclude_patterns: Vec::new(),
            ..FilterConfig::default()
        };

        let criteria = FilterCriteria::from_config(&config, now).unwrap();
        let expected: DateTime<Utc> = "2025-06-01T00:00:00Z".parse().unwrap();
        assert_eq!(criteria.latest_after, Some(expected));
        assert!(criteria.excluder.is_none());
    }

    #[test]
    fn test_absolute_threshold_is_kept() {
        let at: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        let config = FilterConfig {
            latest_after: Some(at),
            ..FilterConfig::default()
        };
        let criteria = FilterCriteria::from_config(&config, Utc::now()).unwrap();
        assert_eq!(criteria.latest_after, Some(at));
        assert!(criteria.excluder.is_some());
    }
}
