//! Identifier newtypes shared across the execution core.
//!
//! Everything that crosses a component boundary is addressed by one of these.
//! They are plain `Uuid` aliases rather than newtypes: the source system
//! threads raw UUIDs through dictionaries and every capability interface in
//! `§6` accepts them positionally, so a newtype would only add `.0` noise
//! without buying extra safety at these boundaries.

use uuid::Uuid;

pub type ExecutionId = Uuid;
pub type ToolId = Uuid;
pub type AgentId = Uuid;
pub type TenantId = Uuid;
pub type ContextId = Uuid;

/// An operation id drawn from an OpenAPI document, e.g. `"repos/get"`.
pub type OperationId = String;
