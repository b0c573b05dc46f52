//! Persistence scoring and cross-model aggregation

use crate::models::{Horizon, ModelReport, ModelResult};
use crate::signals::normalizer::normalize;

/// Decay weights for history offsets T, T-1, T-2.
pub const PERSISTENCE_WEIGHTS: [f64; 3] = [0.5, 0.3, 0.2];

/// Weight applied when a model reports no history at all.
pub const SINGLE_SNAPSHOT_WEIGHT: f64 = 0.5;

/// Combines per-model scores into a super score
pub struct Aggregator;

impl Aggregator {
    /// Time-decayed, confidence-weighted directional score for one model.
    ///
    /// Missing history offsets contribute nothing; the remaining weights are
    /// not re-normalized.
    pub fn persistence_score(report: &ModelReport, horizon: Horizon) -> f64 {
        if report.history.is_empty() {
            let current = report.record(horizon);
            return f64::from(normalize(&current.signal)) * current.confidence * SINGLE_SNAPSHOT_WEIGHT;
        }

        report
            .history
            .iter()
            .zip(PERSISTENCE_WEIGHTS.iter())
            .map(|(snapshot, weight)| f64::from(normalize(&snapshot.signal)) * snapshot.confidence * weight)
            .sum()
    }

    /// Persistence score per result; failed models score 0 and are flagged `None`.
    pub fn model_scores(results: &[ModelResult], horizon: Horizon) -> Vec<Option<f64>> {
        results
            .iter()
            .map(|result| result.report().map(|report| Self::persistence_score(report, horizon)))
            .collect()
    }

    /// Arithmetic mean of live models' persistence scores; 0 with no live models.
    pub fn super_score(results: &[ModelResult], horizon: Horizon) -> f64 {
        let live: Vec<f64> = Self::model_scores(results, horizon).into_iter().flatten().collect();
        if live.is_empty() {
            return 0.0;
        }
        live.iter().sum::<f64>() / live.len() as f64
    }
}
