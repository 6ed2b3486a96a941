//! The execution-level error taxonomy (§7). Only errors that actually
//! surface to the caller get a variant here — stages 4-7 are non-fatal by
//! contract and never produce one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("admission denied: {0}")]
    AdmissionDenied(#[from] resilience::ResilienceError),

    #[error("security blocked: {block_reason}")]
    SecurityBlocked { block_reason: String },

    #[error("budget blocked: {block_reason}")]
    BudgetBlocked { block_reason: String },

    #[error("tool execution failed: {message}")]
    ToolExecutionFailed { message: String },
}
