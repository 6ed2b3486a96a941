//! # Resolver
//!
//! Maps an agent-supplied `action` and a free-form context to a concrete
//! OpenAPI operation (§4.3), scoring candidates semantically (§4.4) and
//! honouring a tool's declared resource scope (§4.6). Caching and learning
//! are delegated to the `learner` crate, which this resolver owns
//! exclusively for the lifetime of its tool binding.

pub mod error;
pub mod resolve;
pub mod scope;
pub mod scorer;
pub mod spec;

pub use error::ResolverError;
pub use resolve::{ResolvedOperation, Resolver};
pub use scope::ResourceScope;
pub use spec::{ApiOperation, OpenApiIndex};
