pub mod config;
pub mod context;
pub mod runtime;
pub mod service;
pub mod telemetry;

pub use config::CoreConfig;
pub use context::PlatformContext;
pub use runtime::{Platform, PlatformRuntime, PlatformDeps};
pub use service::ServiceRegistration;
pub use telemetry::{metrics_registry, MetricsCollector, StageTimer};
