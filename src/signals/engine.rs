//! Ensemble evaluation for one instrument across both horizons.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::{
    HorizonDecision, Instrument, InstrumentAnalysis, ModelBreakdown, ModelResult, Horizon,
};
use crate::signals::aggregation::Aggregator;
use crate::signals::decision::DecisionResolver;
use crate::signals::regime::{RegimeFilter, RegimeReading};

/// Aggregator, regime filter and resolver wired together.
///
/// Pure: the same results always produce the same analysis.
#[derive(Debug, Clone)]
pub struct EnsembleEngine {
    regime: RegimeFilter,
    resolver: DecisionResolver,
}

impl EnsembleEngine {
    pub fn new(regime: RegimeFilter, resolver: DecisionResolver) -> Self {
        Self { regime, resolver }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            RegimeFilter::new(config.regime.clone()),
            DecisionResolver::new(config.model_priority.clone(), config.primary_model.clone()),
        )
    }

    pub fn evaluate(
        &self,
        instrument: &Instrument,
        results: &[ModelResult],
    ) -> Result<InstrumentAnalysis, EngineError> {
        let reading = RegimeReading::from_results(results);
        Ok(InstrumentAnalysis {
            swing: self.evaluate_horizon(instrument, results, Horizon::Swing, &reading)?,
            intraday: self.evaluate_horizon(instrument, results, Horizon::Intraday, &reading)?,
        })
    }

    /// Evaluate a single horizon.
    pub fn evaluate_horizon(
        &self,
        instrument: &Instrument,
        results: &[ModelResult],
        horizon: Horizon,
        reading: &RegimeReading,
    ) -> Result<HorizonDecision, EngineError> {
        let scores = Aggregator::model_scores(results, horizon);
        let raw_score = Aggregator::super_score(results, horizon);
        if !raw_score.is_finite() {
            return Err(EngineError::NonFiniteScore {
                instrument: instrument.to_string(),
                horizon,
            });
        }

        let (score, vetoed) = self.regime.apply(horizon, raw_score, reading);
        let result = self.resolver.resolve(results, horizon, score);

        let models = results
            .iter()
            .zip(scores)
            .map(|(model, score)| ModelBreakdown::from_result(model, horizon, score.unwrap_or(0.0)))
            .collect();

        Ok(HorizonDecision {
            instrument: instrument.clone(),
            horizon,
            result,
            raw_score,
            vetoed,
            models,
        })
    }
}

impl Default for EnsembleEngine {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
