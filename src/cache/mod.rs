//! Response caching.
//!
//! Short-lived caches that keep repeated identical queries from hitting the
//! upstream provider. See [`ResponseCache`].

mod response_cache;

pub use response_cache::ResponseCache;
