use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ensemble::HorizonDecision;
use super::instrument::Instrument;
use super::signal::Horizon;

/// Instrument dropped from a cycle and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedInstrument {
    pub instrument: Instrument,
    pub reason: String,
}

/// Output of one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub attempted: usize,
    pub swing: Vec<HorizonDecision>,
    pub intraday: Vec<HorizonDecision>,
    pub skipped: Vec<SkippedInstrument>,
}

impl CycleReport {
    pub fn decisions(&self, horizon: Horizon) -> &[HorizonDecision] {
        match horizon {
            Horizon::Swing => &self.swing,
            Horizon::Intraday => &self.intraday,
        }
    }

    /// Decisions for `horizon`, highest super score first.
    pub fn ranked(&self, horizon: Horizon) -> Vec<&HorizonDecision> {
        let mut ranked: Vec<&HorizonDecision> = self.decisions(horizon).iter().collect();
        ranked.sort_by(|a, b| b.result.super_score.total_cmp(&a.result.super_score));
        ranked
    }
}

/// A cycle either produced decisions or nothing at all.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Every instrument in the universe was skipped (or the universe was empty).
    NoResults(CycleReport),
}

impl CycleOutcome {
    pub fn from_report(report: CycleReport) -> Self {
        if report.swing.is_empty() && report.intraday.is_empty() {
            CycleOutcome::NoResults(report)
        } else {
            CycleOutcome::Completed(report)
        }
    }

    pub fn report(&self) -> &CycleReport {
        match self {
            CycleOutcome::Completed(report) | CycleOutcome::NoResults(report) => report,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CycleOutcome::NoResults(_))
    }
}
