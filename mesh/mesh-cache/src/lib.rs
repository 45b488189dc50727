//! Lazily built caches for data derived from shared mesh objects.
//!
//! A [`LazyCache`] holds at most one [`CacheArtifact`]. The artifact is
//! built from its source on first access, served from then on, and thrown
//! away only when the owner calls [`LazyCache::invalidate`]. There is no
//! automatic dependency tracking: if the source changes, invalidate.
//!
//! The cache is `Sync` whenever the artifact is `Send + Sync`; concurrent
//! first use is serialized so exactly one build happens.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cache;

pub use cache::{CacheArtifact, LazyCache};
