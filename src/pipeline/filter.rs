//! Channel filter pipeline.
//!
//! A fixed-order conjunction of independent predicates over a
//! (detail, activity) pair. Cheap text checks run first; the order affects
//! only how early a rejection short-circuits, never the accepted set.

use std::fmt;

use chrono::Utc;

use crate::models::{ActivityRecord, ChannelDetail, FilterCriteria};

/// One filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    NameExclusion,
    SubscriberRange,
    ChannelAge,
    Recency,
}

impl Predicate {
    /// Evaluation order.
    pub const ALL: [Predicate; 4] = [
        Predicate::NameExclusion,
        Predicate::SubscriberRange,
        Predicate::ChannelAge,
        Predicate::Recency,
    ];

    /// Whether the predicate reads the activity record.
    pub fn needs_activity(&self) -> bool {
        matches!(self, Predicate::Recency)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Predicate::NameExclusion => "name exclusion",
            Predicate::SubscriberRange => "subscriber range",
            Predicate::ChannelAge => "channel age",
            Predicate::Recency => "recency",
        };
        f.write_str(name)
    }
}

/// Outcome of evaluating a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(Predicate),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Filter over resolved [`FilterCriteria`].
#[derive(Debug, Clone)]
pub struct FilterPipeline {
    criteria: FilterCriteria,
}

impl FilterPipeline {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Whether the predicate takes part in evaluation.
    ///
    /// The subscriber range is always active: an unknown count never passes.
    pub fn is_active(&self, predicate: Predicate) -> bool {
        match predicate {
            Predicate::NameExclusion => self.criteria.excluder.is_some(),
            Predicate::SubscriberRange => true,
            Predicate::ChannelAge => self.criteria.created_after.is_some(),
            Predicate::Recency => self.criteria.latest_after.is_some(),
        }
    }

    /// Evaluate a single predicate. `true` means the record passes it.
    ///
    /// Inactive predicates pass everything. Recency without an activity
    /// record fails.
    pub fn check(
        &self,
        predicate: Predicate,
        detail: &ChannelDetail,
        activity: Option<&ActivityRecord>,
    ) -> bool {
        let criteria = &self.criteria;
        match predicate {
            Predicate::NameExclusion => match &criteria.excluder {
                Some(excluder) => !excluder.matches(&detail.searchable_text()),
                None => true,
            },
            Predicate::SubscriberRange => detail
                .subscriber_count
                .is_some_and(|count| criteria.subscribers.contains(count)),
            Predicate::ChannelAge => match (criteria.created_after, detail.created_at) {
                (Some(threshold), Some(created)) => created.with_timezone(&Utc) >= threshold,
                _ => true,
            },
            Predicate::Recency => match criteria.latest_after {
                Some(threshold) => activity
                    .and_then(|a| a.latest_published_at)
                    .is_some_and(|latest| latest.with_timezone(&Utc) >= threshold),
                None => true,
            },
        }
    }

    fn evaluate_with(
        &self,
        detail: &ChannelDetail,
        activity: Option<&ActivityRecord>,
        include: impl Fn(Predicate) -> bool,
    ) -> Verdict {
        Predicate::ALL
            .into_iter()
            .filter(|p| include(*p) && self.is_active(*p))
            .find(|p| !self.check(*p, detail, activity))
            .map_or(Verdict::Accept, Verdict::Reject)
    }

    /// Evaluate every active predicate, stopping at the first rejection.
    pub fn evaluate(&self, detail: &ChannelDetail, activity: &ActivityRecord) -> Verdict {
        self.evaluate_with(detail, Some(activity), |_| true)
    }

    /// Evaluate only the predicates that do not read activity.
    ///
    /// A rejection here is final; an acceptance still needs [`accepts`](Self::accepts).
    pub fn prefilter(&self, detail: &ChannelDetail) -> Verdict {
        self.evaluate_with(detail, None, |p| !p.needs_activity())
    }

    /// Whether the record passes every active predicate.
    pub fn accepts(&self, detail: &ChannelDetail, activity: &ActivityRecord) -> bool {
        self.evaluate(detail, activity).is_accept()
    }

    /// Whether activity must be resolved to decide on this record.
    pub fn needs_activity(&self) -> bool {
        Predicate::ALL
            .into_iter()
            .any(|p| p.needs_activity() && self.is_active(p))
    }
}
