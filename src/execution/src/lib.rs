//! # Execution
//!
//! The resilient execution pipeline (§4.1): the seven stages, the three
//! mode dispatchers (sync/async/hybrid), per-execution checkpoints, and
//! reverse-order compensation on failure. This is the 25%-budget
//! centrepiece the rest of the workspace's components feed into.

pub mod capabilities;
pub mod compensation;
pub mod config;
pub mod error;
pub mod gate;
pub mod pipeline;
pub mod registry;
pub mod resolver_port;
pub mod service;

pub use capabilities::{ContentAnalyzer, EmbeddingService, EventStore, HistoryStore, SemanticGraph, SemanticNodeMetadata, ToolExecutionError, ToolExecutor};
pub use compensation::CompensationStack;
pub use config::{ExecutionConfig, ASYNC_WORKER_DEADLINE, HYBRID_WORKER_DEADLINE};
pub use error::ExecutionError;
pub use pipeline::{AdmissionOutcome, Capabilities, Pipeline};
pub use registry::CheckpointRegistry;
pub use resolver_port::OperationResolver;
pub use service::ExecutionService;
