//! # Cost Controller
//!
//! Per-tenant budget tracking, pre-execution cost checks, post-execution
//! recording, and threshold alerting (§4.2). Owns the spend ledger and the
//! budget cache exclusively.

pub mod budget;
pub mod controller;
pub mod error;
pub mod ledger;
pub mod repository;
pub mod workers;

pub use controller::{CostConfig, CostController, TrackingGranularity};
pub use error::CostError;
pub use repository::CostRepository;
