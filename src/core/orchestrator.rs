//! Drives one evaluation cycle across the instrument universe

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::core::invoker::WorkerInvoker;
use crate::error::EngineError;
use crate::metrics::Metrics;
use crate::models::{CycleOutcome, CycleReport, Instrument, InstrumentAnalysis, SkippedInstrument};
use crate::services::reporting::ReportSink;
use crate::services::universe::UniverseSource;
use crate::signals::engine::EnsembleEngine;

/// Sequential over instruments, concurrent over models within one.
///
/// Holds no state between cycles; every cycle starts from the universe.
pub struct Orchestrator {
    invoker: Arc<WorkerInvoker>,
    engine: Arc<EnsembleEngine>,
    universe: Arc<dyn UniverseSource>,
    sink: Arc<dyn ReportSink>,
    metrics: Option<Arc<Metrics>>,
}

impl Orchestrator {
    pub fn new(
        invoker: WorkerInvoker,
        engine: EnsembleEngine,
        universe: Arc<dyn UniverseSource>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            invoker: Arc::new(invoker),
            engine: Arc::new(engine),
            universe,
            sink,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Fetch the universe, evaluate it and hand the result to the sink.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, EngineError> {
        let started = Instant::now();
        let universe = self.universe.fetch().await?;
        info!(instruments = universe.len(), "starting evaluation cycle");

        let outcome = self.evaluate_universe(&universe).await;
        self.sink.publish(&outcome).await?;

        if let Some(metrics) = &self.metrics {
            metrics.cycle_duration_seconds.observe(started.elapsed().as_secs_f64());
        }
        Ok(outcome)
    }

    /// Evaluate every instrument in order. One instrument failing never stops
    /// the rest; it is recorded as skipped for both horizons.
    pub async fn evaluate_universe(&self, universe: &[Instrument]) -> CycleOutcome {
        let started_at = Utc::now();
        let mut swing = Vec::with_capacity(universe.len());
        let mut intraday = Vec::with_capacity(universe.len());
        let mut skipped = Vec::new();

        for (index, instrument) in universe.iter().enumerate() {
            info!(
                instrument = %instrument,
                position = index + 1,
                total = universe.len(),
                "analyzing {} [{}/{}]",
                instrument,
                index + 1,
                universe.len()
            );

            match self.analyze_instrument(instrument).await {
                Ok(analysis) => {
                    info!(
                        instrument = %instrument,
                        swing = %analysis.swing.result.final_signal,
                        swing_score = analysis.swing.result.super_score,
                        intraday = %analysis.intraday.result.final_signal,
                        intraday_score = analysis.intraday.result.super_score,
                        "instrument analyzed"
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.instruments_processed_total.inc();
                    }
                    swing.push(analysis.swing);
                    intraday.push(analysis.intraday);
                }
                Err(e) => {
                    error!(instrument = %instrument, error = %e, "skipping instrument");
                    if let Some(metrics) = &self.metrics {
                        metrics.instruments_skipped_total.inc();
                    }
                    skipped.push(SkippedInstrument {
                        instrument: instrument.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let outcome = CycleOutcome::from_report(CycleReport {
            started_at,
            finished_at: Utc::now(),
            attempted: universe.len(),
            swing,
            intraday,
            skipped,
        });

        if outcome.is_empty() {
            warn!(attempted = universe.len(), "no instrument produced a decision this cycle");
        }
        outcome
    }

    /// Fan out to every model, wait for all of them, then score both horizons.
    pub async fn analyze_instrument(&self, instrument: &Instrument) -> Result<InstrumentAnalysis, EngineError> {
        let results = self.invoker.invoke_all(instrument).await;

        let live = results.iter().filter(|r| r.is_live()).count();
        if let Some(metrics) = &self.metrics {
            metrics.live_models.set(live as i64);
        }
        if live == 0 {
            warn!(instrument = %instrument, models = results.len(), "no live models");
        }

        let engine = self.engine.clone();
        let task_instrument = instrument.clone();
        tokio::task::spawn_blocking(move || engine.evaluate(&task_instrument, &results))
            .await
            .map_err(|e| EngineError::InstrumentProcessing {
                instrument: instrument.to_string(),
                reason: if e.is_panic() {
                    "aggregation panicked".to_string()
                } else {
                    e.to_string()
                },
            })?
    }
}
