//! Platform API access.
//!
//! - `transport`: one resilient GET, failure returned as data
//! - `retry` / `gate`: backoff policy and shared rate limit
//! - `youtube`: typed endpoint calls and fatal-error abort
//! - `wire`: response shapes

#[cfg(test)]
pub(crate) mod fake;
pub mod gate;
pub mod retry;
pub mod transport;
pub mod wire;
pub mod youtube;

pub use gate::RateGate;
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, Transport};
pub use youtube::{AbortSignal, MAX_PAGE_SIZE, SearchHints, SearchPage, YouTubeClient};
