//! Pure stages and the run orchestrator.
//!
//! - `filter`: predicate conjunction over detail and activity
//! - `aggregate`: last-write-wins dedup and export ordering
//! - `run`: the [`Scout`] driving one end-to-end run

pub mod aggregate;
pub mod filter;
pub mod run;

pub use aggregate::{Aggregator, aggregate};
pub use filter::{FilterPipeline, Predicate, Verdict};
pub use run::{RunOutcome, RunStatus, Scout, report};
