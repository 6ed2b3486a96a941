//! The execution service (§4.1): wires the admission chain in front of the
//! pipeline and dispatches each request according to its `ExecutionMode`.
//! Owns the checkpoint registry and the per-execution compensation stack
//! exclusively, as required by §3's ownership rules.

use std::sync::Arc;
use std::time::Duration;

use resilience::{AdmissionChain, AdmissionConfig, ResilienceError};
use rtc_types::{Event, EventType, ExecutionCheckpoint, ExecutionMode, ExecutionRequest, ExecutionResponse};
use tracing::{info, instrument, warn};

use crate::capabilities::EventStore;
use crate::compensation::CompensationStack;
use crate::config::{ExecutionConfig, ASYNC_WORKER_DEADLINE, HYBRID_WORKER_DEADLINE};
use crate::error::ExecutionError;
use crate::pipeline::Pipeline;
use crate::registry::CheckpointRegistry;

pub struct ExecutionService {
    config: ExecutionConfig,
    admission: AdmissionChain,
    pipeline: Arc<Pipeline>,
    events: Arc<dyn EventStore>,
    checkpoints: Arc<CheckpointRegistry>,
}

impl ExecutionService {
    pub fn new(config: ExecutionConfig, admission_config: AdmissionConfig, pipeline: Arc<Pipeline>, events: Arc<dyn EventStore>) -> Self {
        Self {
            config,
            admission: AdmissionChain::new(admission_config),
            pipeline,
            events,
            checkpoints: Arc::new(CheckpointRegistry::new()),
        }
    }

    /// The one public entry point (§6 "Exposed operations": `execute`).
    /// Assigns a deadline, runs the admission chain, then dispatches to the
    /// mode-specific path. Errors only ever originate from admission,
    /// security, budget, or tool execution — stages 4-7 never fail a call.
    #[instrument(skip(self, request), fields(execution_id = %request.execution_id, mode = ?request.mode))]
    pub async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResponse, ExecutionError> {
        let deadline = self.config.deadline(request.timeout_seconds);

        let guard = self.admission.admit(deadline).await?;
        let checkpoint = ExecutionCheckpoint::new(request.clone());
        self.checkpoints.install(checkpoint.clone()).await;

        let result = match request.mode {
            ExecutionMode::Sync => self.run_sync(request.clone(), checkpoint, deadline).await,
            ExecutionMode::Async => self.run_async(request.clone(), checkpoint).await,
            ExecutionMode::Hybrid => self.run_hybrid(request.clone(), checkpoint, deadline).await,
        };

        match (&result, request.mode) {
            // Async/hybrid hand their own breaker bookkeeping off to the
            // detached worker; only the foreground result reports here.
            (Ok(_), ExecutionMode::Sync) => self.admission.record_success().await,
            (Err(ExecutionError::ToolExecutionFailed { .. }), ExecutionMode::Sync) => self.admission.record_failure().await,
            (Ok(_), ExecutionMode::Hybrid) => self.admission.record_success().await,
            (Err(ExecutionError::ToolExecutionFailed { .. }), ExecutionMode::Hybrid) => self.admission.record_failure().await,
            _ => {}
        }

        drop(guard);

        if request.mode == ExecutionMode::Sync {
            self.checkpoints.remove(request.execution_id).await;
        }

        result
    }

    async fn run_sync(&self, request: ExecutionRequest, mut checkpoint: ExecutionCheckpoint, deadline: Duration) -> Result<ExecutionResponse, ExecutionError> {
        let mut compensations = CompensationStack::new();
        let outcome = tokio::time::timeout(deadline, self.pipeline.run(&request, &mut checkpoint, &mut compensations)).await;

        match outcome {
            Ok(result) => {
                if result.is_err() {
                    self.drain_compensations(request.execution_id, compensations);
                }
                result
            }
            Err(_) => {
                self.drain_compensations(request.execution_id, compensations);
                Err(ExecutionError::AdmissionDenied(ResilienceError::Timeout(deadline)))
            }
        }
    }

    /// Emits `execution.queued`, forks a detached worker with its own
    /// 5-minute deadline, and returns immediately (§4.1 "Async"). The
    /// detached worker shares nothing of the caller's deadline or
    /// cancellation (§9 "Coroutines / detached workers").
    async fn run_async(&self, request: ExecutionRequest, checkpoint: ExecutionCheckpoint) -> Result<ExecutionResponse, ExecutionError> {
        let queued_event = Event::new(EventType::Queued, request.execution_id, serde_json::to_value(&request).unwrap_or_default());
        if let Err(err) = self.events.publish(queued_event).await {
            warn!(error = %err, "failed to publish execution.queued event");
        }

        let pipeline = Arc::clone(&self.pipeline);
        let events = Arc::clone(&self.events);
        let checkpoints = Arc::clone(&self.checkpoints);
        let spawned_request = request.clone();

        tokio::spawn(async move {
            let mut checkpoint = checkpoint;
            let mut compensations = CompensationStack::new();
            let run = pipeline.run(&spawned_request, &mut checkpoint, &mut compensations);

            match tokio::time::timeout(ASYNC_WORKER_DEADLINE, run).await {
                Ok(Ok(_response)) => {
                    let event = Event::new(EventType::Complete, spawned_request.execution_id, serde_json::Value::Null);
                    let _ = events.publish(event).await;
                }
                Ok(Err(err)) => {
                    warn!(error = %err, execution_id = %spawned_request.execution_id, "async pipeline failed, draining compensations");
                    compensations.run_all();
                    let event = Event::new(EventType::Failed, spawned_request.execution_id, serde_json::json!({ "error": err.to_string() }));
                    let _ = events.publish(event).await;
                }
                Err(_) => {
                    warn!(execution_id = %spawned_request.execution_id, "async pipeline exceeded its detached deadline");
                    compensations.run_all();
                }
            }

            checkpoints.remove(spawned_request.execution_id).await;
        });

        let mut response = ExecutionResponse::for_request(&request);
        response.metrics.queued = true;
        Ok(response)
    }

    /// Runs stage 3 synchronously, returns as soon as the tool result is in
    /// hand, then forks a detached worker with a 2-minute deadline for
    /// stages 4-7 (§4.1 "Hybrid").
    async fn run_hybrid(&self, request: ExecutionRequest, checkpoint: ExecutionCheckpoint, deadline: Duration) -> Result<ExecutionResponse, ExecutionError> {
        let mut checkpoint = checkpoint;
        let mut compensations = CompensationStack::new();

        let started = std::time::Instant::now();
        let admission = tokio::time::timeout(deadline, self.pipeline.run_admission_stages(&request, &mut checkpoint, &mut compensations)).await;

        let outcome = match admission {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                self.drain_compensations(request.execution_id, compensations);
                self.checkpoints.remove(request.execution_id).await;
                return Err(err);
            }
            Err(_) => {
                self.drain_compensations(request.execution_id, compensations);
                self.checkpoints.remove(request.execution_id).await;
                return Err(ExecutionError::AdmissionDenied(ResilienceError::Timeout(deadline)));
            }
        };

        let mut response = ExecutionResponse::for_request(&request);
        response.tool_result = Some(outcome.tool_result.clone());
        response.metrics.intelligence_deferred = true;
        response.metrics.execution_time_ms = started.elapsed().as_millis() as u64;

        let pipeline = Arc::clone(&self.pipeline);
        let checkpoints = Arc::clone(&self.checkpoints);
        let spawned_request = request.clone();

        tokio::spawn(async move {
            let mut checkpoint = checkpoint;
            let started_at = chrono::Utc::now();
            let result = tokio::time::timeout(
                HYBRID_WORKER_DEADLINE,
                pipeline.run_downstream_stages(&spawned_request, outcome, &mut checkpoint, started, started_at),
            )
            .await;

            if result.is_err() {
                warn!(execution_id = %spawned_request.execution_id, "hybrid deferred stages exceeded their detached deadline");
            }

            checkpoints.remove(spawned_request.execution_id).await;
        });

        Ok(response)
    }

    fn drain_compensations(&self, execution_id: uuid::Uuid, compensations: CompensationStack) {
        if !compensations.is_empty() {
            info!(%execution_id, count = compensations.len(), "running compensations after pipeline failure");
        }
        compensations.run_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use costctl::{CostConfig, CostController, CostRepository};
    use resilience::{AdmissionConfig, BreakerConfig};
    use rtc_types::{ContentAnalysis, ContentType, CostAlert, CostBreakdown, ExecutionId, ExecutionRequest, Money, TenantId, UsagePeriod, UsageSummary};
    use security::{SecurityConfig, SecurityValidator};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    use crate::capabilities::{ContentAnalyzer, EmbeddingService, HistoryStore, SemanticGraph, SemanticNodeMetadata, ToolExecutionError, ToolExecutor};
    use crate::pipeline::{Capabilities, Pipeline};

    struct StubRepository;

    #[async_trait]
    impl CostRepository for StubRepository {
        async fn store_cost(&self, _b: &CostBreakdown) -> Result<(), costctl::CostError> {
            Ok(())
        }
        async fn get_cost_breakdown(&self, _e: ExecutionId) -> Result<Option<CostBreakdown>, costctl::CostError> {
            Ok(None)
        }
        async fn get_usage_breakdown(&self, tenant_id: TenantId, period: UsagePeriod) -> Result<UsageSummary, costctl::CostError> {
            Ok(UsageSummary { tenant_id, period, daily_spend: Money::ZERO, monthly_spend: Money::ZERO, trends: Default::default(), top_operations: vec![], recommendations: vec![] })
        }
        async fn get_tenant_budget(&self, _t: TenantId) -> Result<Option<rtc_types::TenantBudget>, costctl::CostError> {
            Ok(None)
        }
        async fn get_all_tenant_budgets(&self) -> Result<Vec<rtc_types::TenantBudget>, costctl::CostError> {
            Ok(vec![])
        }
        async fn is_in_grace_period(&self, _t: TenantId) -> Result<bool, costctl::CostError> {
            Ok(false)
        }
        async fn store_alert(&self, _a: &CostAlert) -> Result<(), costctl::CostError> {
            Ok(())
        }
    }

    struct EchoTool;

    #[async_trait]
    impl ToolExecutor for EchoTool {
        async fn execute(&self, _tool_id: uuid::Uuid, _action: &str, params: &HashMap<String, serde_json::Value>) -> Result<serde_json::Value, ToolExecutionError> {
            Ok(serde_json::to_value(params).unwrap_or(serde_json::Value::Null))
        }
    }

    /// Sleeps briefly before returning, so the hybrid-mode deferred worker
    /// has time to still be running when the foreground response comes back.
    struct SlowAnalyzer;

    #[async_trait]
    impl ContentAnalyzer for SlowAnalyzer {
        async fn analyze(&self, bytes: &[u8]) -> Result<ContentAnalysis, String> {
            tokio::time::sleep(StdDuration::from_millis(50)).await;
            Ok(ContentAnalysis { content_type: ContentType::Json, size: bytes.len(), has_pii: false, has_secrets: false, language: None })
        }
    }

    struct UnreachableEmbeddings;

    #[async_trait]
    impl EmbeddingService for UnreachableEmbeddings {
        async fn generate(&self, _text: &str, _metadata: &HashMap<String, serde_json::Value>) -> Result<String, String> {
            Err("embedding service unreachable".to_string())
        }
    }

    struct NoopGraph;

    #[async_trait]
    impl SemanticGraph for NoopGraph {
        async fn add_node(&self, _context_id: uuid::Uuid, _metadata: SemanticNodeMetadata) -> Result<(), String> {
            Ok(())
        }
        async fn create_relationship(&self, _from: uuid::Uuid, _to: uuid::Uuid, _relationship: &str) -> Result<(), String> {
            Ok(())
        }
        async fn find_related(&self, _context_id: uuid::Uuid, _max_distance: u32) -> Result<Vec<uuid::Uuid>, String> {
            Ok(Vec::new())
        }
    }

    struct CountingHistory {
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl HistoryStore for CountingHistory {
        async fn insert(&self, _row: rtc_types::ExecutionHistoryRow) -> Result<(), String> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RecordingEvents {
        published: tokio::sync::Mutex<Vec<rtc_types::EventType>>,
    }

    #[async_trait]
    impl EventStore for RecordingEvents {
        async fn publish(&self, event: rtc_types::Event) -> Result<(), String> {
            self.published.lock().await.push(event.event_type);
            Ok(())
        }
    }

    fn service(history: Arc<CountingHistory>, events: Arc<RecordingEvents>) -> ExecutionService {
        let capabilities = Capabilities {
            tool_executor: Arc::new(EchoTool),
            content_analyzer: Arc::new(SlowAnalyzer),
            embedding_service: Arc::new(UnreachableEmbeddings),
            semantic_graph: Arc::new(NoopGraph),
            history_store: history,
        };
        let security = Arc::new(SecurityValidator::new(SecurityConfig::default()));
        let cost = Arc::new(CostController::new(CostConfig::default(), Default::default(), Arc::new(StubRepository)));
        let pipeline = Arc::new(Pipeline::new(capabilities, security, cost, 5000, true, StdDuration::from_secs(300)));

        let admission = AdmissionConfig { requests_per_second: 1000.0, burst_size: 100, max_concurrency: 10, breaker: BreakerConfig::default() };
        ExecutionService::new(ExecutionConfig::default(), admission, pipeline, events)
    }

    fn request(mode: ExecutionMode) -> ExecutionRequest {
        ExecutionRequest::new(uuid::Uuid::new_v4(), uuid::Uuid::new_v4(), uuid::Uuid::new_v4(), "get", HashMap::new(), mode)
    }

    use rtc_types::ExecutionMode;

    #[tokio::test]
    async fn async_mode_returns_immediately_and_queues_the_rest() {
        let history = Arc::new(CountingHistory { inserts: AtomicUsize::new(0) });
        let events = Arc::new(RecordingEvents { published: tokio::sync::Mutex::new(Vec::new()) });
        let service = service(Arc::clone(&history), Arc::clone(&events));

        let response = service.execute(request(ExecutionMode::Async)).await.expect("async admission succeeds");
        assert!(response.metrics.queued);
        assert!(response.tool_result.is_none());

        // Detached worker runs in the background; give it time to land.
        tokio::time::sleep(StdDuration::from_millis(200)).await;
        assert_eq!(history.inserts.load(Ordering::SeqCst), 1);
        assert!(events.published.lock().await.contains(&rtc_types::EventType::Queued));
    }

    #[tokio::test]
    async fn hybrid_mode_returns_tool_result_before_downstream_stages_land() {
        let history = Arc::new(CountingHistory { inserts: AtomicUsize::new(0) });
        let events = Arc::new(RecordingEvents { published: tokio::sync::Mutex::new(Vec::new()) });
        let service = service(Arc::clone(&history), events);

        let response = service.execute(request(ExecutionMode::Hybrid)).await.expect("hybrid admission succeeds");
        assert!(response.metrics.intelligence_deferred);
        assert!(response.tool_result.is_some());
        // The analyzer sleeps 50ms; the persistence row should not exist yet.
        assert_eq!(history.inserts.load(Ordering::SeqCst), 0);

        tokio::time::sleep(StdDuration::from_millis(200)).await;
        assert_eq!(history.inserts.load(Ordering::SeqCst), 1);
    }
}
