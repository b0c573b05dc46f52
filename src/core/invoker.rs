//! Isolated, bounded, deadline-enforced model invocation

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::metrics::Metrics;
use crate::models::{FailureKind, Instrument, ModelResult, WorkerFailure};
use crate::services::worker::StrategyWorker;

/// Runs every configured model for an instrument.
///
/// Each invocation is its own task, so a panic becomes a `Crash` failure
/// instead of unwinding through siblings. A shared semaphore bounds how many
/// workers run at once across the whole engine.
pub struct WorkerInvoker {
    workers: Vec<Arc<dyn StrategyWorker>>,
    slots: Arc<Semaphore>,
    timeout: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl WorkerInvoker {
    pub fn new(workers: Vec<Arc<dyn StrategyWorker>>, concurrency: usize, timeout: Duration) -> Self {
        Self {
            workers,
            slots: Arc::new(Semaphore::new(concurrency.max(1))),
            timeout,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn model_names(&self) -> Vec<String> {
        self.workers.iter().map(|w| w.name().to_string()).collect()
    }

    /// Invoke all models concurrently and wait for every one of them.
    ///
    /// Results come back in configuration order regardless of finish order.
    pub async fn invoke_all(&self, instrument: &Instrument) -> Vec<ModelResult> {
        join_all(
            self.workers
                .iter()
                .map(|worker| self.invoke(worker.clone(), instrument)),
        )
        .await
    }

    /// Invoke one model; never fails, failures are folded into the result.
    pub async fn invoke(&self, worker: Arc<dyn StrategyWorker>, instrument: &Instrument) -> ModelResult {
        let model = worker.name().to_string();
        let slots = self.slots.clone();
        let deadline = self.timeout;
        let task_instrument = instrument.clone();

        let handle = tokio::spawn(async move {
            let _permit = slots
                .acquire_owned()
                .await
                .map_err(|_| WorkerFailure::crash("worker pool closed"))?;
            match tokio::time::timeout(deadline, worker.run(&task_instrument)).await {
                Ok(result) => result,
                Err(_) => Err(WorkerFailure::timeout(format!(
                    "no result after {}s",
                    deadline.as_secs_f64()
                ))),
            }
        });

        let result = match handle.await {
            Ok(Ok(payload)) => payload.into_result(&model),
            Ok(Err(failure)) => ModelResult::failed(&model, failure),
            Err(e) => ModelResult::failed(
                &model,
                WorkerFailure::crash(if e.is_panic() { "worker panicked" } else { "worker cancelled" }),
            ),
        };

        match result.failure() {
            None => debug!(model = %model, instrument = %instrument, "model result received"),
            Some(failure) => warn!(
                model = %model,
                instrument = %instrument,
                kind = %failure.kind,
                reason = %failure.reason,
                "model invocation failed"
            ),
        }

        if let Some(metrics) = &self.metrics {
            let outcome = match result.failure().map(|f| f.kind) {
                None => "live",
                Some(FailureKind::Timeout) => "timeout",
                Some(FailureKind::Crash) => "crash",
                Some(FailureKind::Logic) => "logic",
            };
            metrics
                .model_invocations_total
                .with_label_values(&[model.as_str(), outcome])
                .inc();
        }

        result
    }
}
