//! Request cache
//!
//! Responses are cached by request shape (URL, query parameters, body) for a
//! short TTL so that building several reports for the same space does not
//! refetch identical pages. Time and expiry are injected so the cache can be
//! driven deterministically in tests and so independent instances can live
//! side by side.

mod clock;
mod key;
mod scheduler;
mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{cache_key, canonical_json};
pub use scheduler::{ExpiryScheduler, ExpiryTask, ManualScheduler, TokioScheduler};
pub use ttl::{CacheStats, TtlCache};
