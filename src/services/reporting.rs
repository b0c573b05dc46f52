//! Reporting sinks that receive each cycle's decision lists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::ReportError;
use crate::models::{CycleOutcome, Horizon, HorizonDecision, SkippedInstrument};

/// Consumer of a finished cycle; owns all presentation.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn publish(&self, outcome: &CycleOutcome) -> Result<(), ReportError>;
}

/// Emits one log line per decision, best score first.
pub struct LogReportSink;

#[async_trait]
impl ReportSink for LogReportSink {
    async fn publish(&self, outcome: &CycleOutcome) -> Result<(), ReportError> {
        let report = outcome.report();
        if outcome.is_empty() {
            warn!(
                attempted = report.attempted,
                skipped = report.skipped.len(),
                "cycle produced no decisions"
            );
            return Ok(());
        }

        for horizon in Horizon::ALL {
            for decision in report.ranked(horizon) {
                info!(
                    horizon = %horizon,
                    instrument = %decision.instrument,
                    signal = %decision.result.final_signal,
                    super_score = decision.result.super_score,
                    entry = decision.result.entry,
                    target = decision.result.target,
                    sl = decision.result.stop_loss,
                    source_model = %decision.result.source_model,
                    "{} {}: {} ({:.2})",
                    horizon,
                    decision.instrument,
                    decision.result.final_signal,
                    decision.result.super_score
                );
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct HorizonReport<'a> {
    horizon: Horizon,
    generated_at: DateTime<Utc>,
    status: &'static str,
    attempted: usize,
    decisions: Vec<&'a HorizonDecision>,
    skipped: &'a [SkippedInstrument],
}

/// Writes `superscore_swing.json` and `superscore_intraday.json`, each
/// ranked by super score.
pub struct JsonReportSink {
    dir: PathBuf,
}

impl JsonReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, horizon: Horizon) -> PathBuf {
        self.dir.join(format!("superscore_{}.json", horizon))
    }
}

#[async_trait]
impl ReportSink for JsonReportSink {
    async fn publish(&self, outcome: &CycleOutcome) -> Result<(), ReportError> {
        let report = outcome.report();
        tokio::fs::create_dir_all(&self.dir).await.map_err(|source| io_error(&self.dir, source))?;

        for horizon in Horizon::ALL {
            let body = HorizonReport {
                horizon,
                generated_at: report.finished_at,
                status: if outcome.is_empty() { "empty" } else { "completed" },
                attempted: report.attempted,
                decisions: report.ranked(horizon),
                skipped: &report.skipped,
            };
            let path = self.path_for(horizon);
            let json = serde_json::to_string_pretty(&body)?;
            tokio::fs::write(&path, json).await.map_err(|source| io_error(&path, source))?;
            info!(horizon = %horizon, path = %path.display(), "report written");
        }
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}
