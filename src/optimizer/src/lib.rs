//! # Optimizer
//!
//! The performance-optimizer component: a generic read-through cache with
//! true LRU eviction, a request batcher, and a prefetch helper (§4.6, §9
//! Open Question 3).

pub mod batcher;
pub mod cache;
pub mod prefetch;

pub use batcher::Batcher;
pub use cache::ReadThroughCache;
pub use prefetch::{prefetch, prefetch_many};
