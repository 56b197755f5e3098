pub mod activity;
pub mod details;
pub mod discovery;

pub use activity::{ActivityResolver, FallbackCause, ResolveState};
pub use details::{DetailFetcher, DetailOutcome};
pub use discovery::{ChannelDiscovery, DiscoveryOutcome, KeywordDiscovery};
