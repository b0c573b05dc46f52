//! Fake workers, sinks and builders shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use superscore::core::{Orchestrator, WorkerInvoker};
use superscore::error::ReportError;
use superscore::metrics::Metrics;
use superscore::models::{CycleOutcome, Instrument, WorkerFailure, WorkerPayload};
use superscore::services::{ReportSink, StaticUniverseSource, StrategyWorker};
use superscore::signals::EnsembleEngine;

type PayloadFn = dyn Fn(&Instrument) -> WorkerPayload + Send + Sync;

/// What a fake worker does once its delay has elapsed.
#[derive(Clone)]
pub enum Response {
    Payload(Value),
    PerInstrument(Arc<PayloadFn>),
    Fail(WorkerFailure),
    Panic,
}

/// Scripted in-process worker.
pub struct FakeWorker {
    name: String,
    response: Response,
    delay: Duration,
    tracker: Option<Arc<ConcurrencyTracker>>,
    pub calls: AtomicUsize,
}

impl FakeWorker {
    pub fn new(name: &str, response: Response) -> Self {
        Self {
            name: name.to_string(),
            response,
            delay: Duration::ZERO,
            tracker: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<ConcurrencyTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn shared(self) -> Arc<dyn StrategyWorker> {
        Arc::new(self)
    }
}

#[async_trait]
impl StrategyWorker for FakeWorker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, instrument: &Instrument) -> Result<WorkerPayload, WorkerFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.tracker.as_ref().map(|t| t.enter());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let value = match &self.response {
            Response::Payload(value) => value.clone(),
            Response::PerInstrument(build) => return Ok(build(instrument)),
            Response::Fail(failure) => return Err(failure.clone()),
            Response::Panic => panic!("strategy exploded on {instrument}"),
        };
        Ok(serde_json::from_value(value).expect("fake payload must decode"))
    }
}

/// Records the highest number of simultaneously running workers.
#[derive(Default)]
pub struct ConcurrencyTracker {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyTracker {
    pub fn enter(self: &Arc<Self>) -> TrackerGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        TrackerGuard(self.clone())
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct TrackerGuard(Arc<ConcurrencyTracker>);

impl Drop for TrackerGuard {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Keeps every published outcome for inspection.
#[derive(Default)]
pub struct CapturingSink {
    pub published: Mutex<Vec<CycleOutcome>>,
}

impl CapturingSink {
    pub fn last(&self) -> Option<CycleOutcome> {
        self.published.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportSink for CapturingSink {
    async fn publish(&self, outcome: &CycleOutcome) -> Result<(), ReportError> {
        self.published.lock().unwrap().push(outcome.clone());
        Ok(())
    }
}

/// Payload with the same call on both horizons and optional ADX.
pub fn payload(signal: &str, confidence: f64, adx: Option<f64>) -> Value {
    let record = json!({
        "signal": signal,
        "confidence": confidence,
        "entry": 100.0,
        "target": 110.0,
        "sl": 95.0
    });
    let mut body = json!({ "swing": record.clone(), "intraday": record });
    if let Some(adx) = adx {
        body["details"] = json!({ "adx": adx });
    }
    body
}

pub fn live_worker(name: &str, signal: &str, confidence: f64) -> Arc<dyn StrategyWorker> {
    FakeWorker::new(name, Response::Payload(payload(signal, confidence, Some(30.0)))).shared()
}

pub fn universe(ids: &[&str]) -> Arc<StaticUniverseSource> {
    Arc::new(StaticUniverseSource::new(ids.iter().map(|id| Instrument::new(*id)).collect()))
}

pub struct TestCycle {
    pub orchestrator: Orchestrator,
    pub sink: Arc<CapturingSink>,
    pub metrics: Arc<Metrics>,
}

/// Orchestrator over `workers` and a static universe, with default engine tuning.
pub fn build_cycle(workers: Vec<Arc<dyn StrategyWorker>>, ids: &[&str]) -> TestCycle {
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let sink = Arc::new(CapturingSink::default());
    let invoker = WorkerInvoker::new(workers, 4, Duration::from_secs(5)).with_metrics(metrics.clone());
    let orchestrator = Orchestrator::new(invoker, EnsembleEngine::default(), universe(ids), sink.clone())
        .with_metrics(metrics.clone());
    TestCycle {
        orchestrator,
        sink,
        metrics,
    }
}
