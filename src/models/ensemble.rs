use serde::{Deserialize, Serialize};

use super::instrument::Instrument;
use super::result::ModelResult;
use super::signal::{Horizon, SignalKind};

/// Consensus decision for one instrument and horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleResult {
    pub super_score: f64,
    pub final_signal: SignalKind,
    pub entry: f64,
    pub target: f64,
    #[serde(rename = "sl")]
    pub stop_loss: f64,
    /// Model whose trade parameters were adopted; empty when none were.
    pub source_model: String,
}

/// How one model looked for a horizon, failed models included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBreakdown {
    pub model: String,
    pub signal: String,
    pub confidence: f64,
    pub persistence_score: f64,
    pub errored: bool,
}

impl ModelBreakdown {
    pub fn from_result(result: &ModelResult, horizon: Horizon, persistence_score: f64) -> Self {
        match (result.report(), result.failure()) {
            (Some(report), _) => {
                let record = report.record(horizon);
                Self {
                    model: result.model.clone(),
                    signal: record.signal.clone(),
                    confidence: record.confidence,
                    persistence_score,
                    errored: false,
                }
            }
            (None, failure) => Self {
                model: result.model.clone(),
                signal: format!(
                    "ERR: {}",
                    failure.map(|f| f.reason.as_str()).unwrap_or_default()
                ),
                confidence: 0.0,
                persistence_score: 0.0,
                errored: true,
            },
        }
    }
}

/// One row of a horizon report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonDecision {
    pub instrument: Instrument,
    pub horizon: Horizon,
    pub result: EnsembleResult,
    /// Super score before the regime filter ran.
    pub raw_score: f64,
    pub vetoed: bool,
    pub models: Vec<ModelBreakdown>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentAnalysis {
    pub swing: HorizonDecision,
    pub intraday: HorizonDecision,
}
