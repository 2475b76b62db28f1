//! Status aggregation core for the pirouter control panel.
//!
//! Three pieces:
//! - [`CoalescingCache`]: per-key single-flight TTL memoization that bounds
//!   how often expensive probes run under rapid UI polling.
//! - [`SpeedTracker`]: derives smoothed Mbit/s throughput from successive
//!   absolute byte-counter samples.
//! - [`StatusAggregator`]: composes probe results into the status, stats
//!   and client read-models, applying the documented default-on-failure
//!   mapping in one place.
//!
//! The push scheduler reads through the aggregator's `sample_*` (live)
//! methods; API handlers read through the cached getters.

pub mod aggregator;
pub mod cache;
pub mod rate;

pub use aggregator::StatusAggregator;
pub use cache::CoalescingCache;
pub use rate::{GroupRate, SpeedTracker};
