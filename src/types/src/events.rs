//! The event bus wire format. The core publishes at-least-once; consumers
//! (including the core's own async/hybrid detached workers) must be
//! idempotent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::ids::ExecutionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Queued,
    Started,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub execution_id: ExecutionId,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl Event {
    pub fn new(event_type: EventType, execution_id: ExecutionId, data: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            execution_id,
            timestamp: Utc::now(),
            data,
        }
    }
}
