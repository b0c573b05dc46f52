//! Prometheus metrics for evaluation cycles.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    /// Labelled by `model` and `outcome` (live, timeout, crash, logic).
    pub model_invocations_total: IntCounterVec,
    pub instruments_processed_total: IntCounter,
    pub instruments_skipped_total: IntCounter,
    pub cycle_duration_seconds: Histogram,
    /// Live models for the most recently processed instrument.
    pub live_models: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let model_invocations_total = IntCounterVec::new(
            Opts::new("model_invocations_total", "Strategy model invocations by outcome"),
            &["model", "outcome"],
        )?;
        let instruments_processed_total = IntCounter::new(
            "instruments_processed_total",
            "Instruments that produced a decision",
        )?;
        let instruments_skipped_total = IntCounter::new(
            "instruments_skipped_total",
            "Instruments skipped after a processing error",
        )?;
        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("cycle_duration_seconds", "Wall time of one evaluation cycle")
                .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        )?;
        let live_models = IntGauge::new("live_models", "Live models for the last instrument")?;

        registry.register(Box::new(model_invocations_total.clone()))?;
        registry.register(Box::new(instruments_processed_total.clone()))?;
        registry.register(Box::new(instruments_skipped_total.clone()))?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;
        registry.register(Box::new(live_models.clone()))?;

        Ok(Self {
            registry,
            model_invocations_total,
            instruments_processed_total,
            instruments_skipped_total,
            cycle_duration_seconds,
            live_models,
        })
    }

    /// Render all metrics in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
