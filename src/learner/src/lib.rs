//! # Learner
//!
//! The resolution learner and the two-level operation cache (§4.5):
//! everything the resolver needs to remember which operation an action
//! actually resolved to last time, and how confident to be about it next
//! time.

pub mod cache;
pub mod context_hash;
pub mod error;
pub mod learner;

pub use cache::{ExternalCache, OperationCache};
pub use context_hash::{cache_key, context_hash};
pub use error::LearnerError;
pub use learner::{PruneConfig, ResolutionLearner};
