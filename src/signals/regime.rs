//! Trend-regime veto

use crate::config::RegimeConfig;
use crate::models::{Horizon, ModelResult};

/// Details key carrying a model's trend-strength (ADX) reading.
pub const ADX_KEY: &str = "adx";
/// Details key carrying a model's relative-volume reading.
pub const RVOL_KEY: &str = "rvol";

/// Aggregate regime indicators across live models.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegimeReading {
    /// Mean positive ADX, `None` when no live model reported one.
    pub avg_adx: Option<f64>,
    /// Mean positive RVOL, `None` when no live model reported one.
    pub avg_rvol: Option<f64>,
}

impl RegimeReading {
    pub fn from_results(results: &[ModelResult]) -> Self {
        Self {
            avg_adx: positive_mean(results, ADX_KEY),
            avg_rvol: positive_mean(results, RVOL_KEY),
        }
    }
}

/// Suppresses bullish swing calls in choppy markets.
///
/// The veto is one-sided: negative scores and the intraday horizon pass
/// through untouched. The RVOL variant is computed every cycle but only
/// applied when `rvol_filter_enabled` is set.
#[derive(Debug, Clone)]
pub struct RegimeFilter {
    config: RegimeConfig,
}

impl RegimeFilter {
    pub fn new(config: RegimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RegimeConfig {
        &self.config
    }

    /// Returns the filtered score and whether a veto fired.
    pub fn apply(&self, horizon: Horizon, score: f64, reading: &RegimeReading) -> (f64, bool) {
        if horizon != Horizon::Swing || score <= 0.0 {
            return (score, false);
        }

        let choppy = reading
            .avg_adx
            .is_some_and(|adx| adx < self.config.adx_threshold);
        let thin_volume = self.config.rvol_filter_enabled
            && reading
                .avg_rvol
                .is_some_and(|rvol| rvol < self.config.rvol_threshold);

        if choppy || thin_volume {
            (0.0, true)
        } else {
            (score, false)
        }
    }
}

impl Default for RegimeFilter {
    fn default() -> Self {
        Self::new(RegimeConfig::default())
    }
}

fn positive_mean(results: &[ModelResult], key: &str) -> Option<f64> {
    let values: Vec<f64> = results
        .iter()
        .filter_map(|result| result.report())
        .filter_map(|report| report.detail(key))
        .filter(|value| *value > 0.0)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
