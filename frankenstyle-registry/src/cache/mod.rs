//! Cache artifact: canonical rendering, content hashing and the on-disk store.

pub mod hash;
pub mod store;

pub use hash::{content_hash, hash_bytes, render};
pub use store::{is_stale, staleness, CacheStore, StaleReason};
