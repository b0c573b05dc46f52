//! Per-model results and the worker wire payload.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::signal::{Horizon, SignalRecord, SignalSnapshot};

/// Longest diagnostic kept on a failed model.
pub const MAX_FAILURE_REASON: usize = 100;

/// Snapshots kept from a worker's history (T, T-1, T-2).
pub const MAX_HISTORY: usize = 3;

/// Why a worker produced no usable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Deadline exceeded.
    Timeout,
    /// Non-zero exit, panic, or unparseable output.
    Crash,
    /// The worker returned an explicit `{"error": ...}` payload.
    Logic,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Crash => "crash",
            FailureKind::Logic => "logic error",
        };
        f.write_str(label)
    }
}

/// Uniform failure marker for one model invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {reason}")]
pub struct WorkerFailure {
    pub kind: FailureKind,
    pub reason: String,
}

impl WorkerFailure {
    pub fn new(kind: FailureKind, reason: impl AsRef<str>) -> Self {
        let reason: String = reason.as_ref().trim().chars().take(MAX_FAILURE_REASON).collect();
        Self { kind, reason }
    }

    pub fn timeout(reason: impl AsRef<str>) -> Self {
        Self::new(FailureKind::Timeout, reason)
    }

    pub fn crash(reason: impl AsRef<str>) -> Self {
        Self::new(FailureKind::Crash, reason)
    }

    pub fn logic(reason: impl AsRef<str>) -> Self {
        Self::new(FailureKind::Logic, reason)
    }
}

/// Everything a live model reported this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    pub swing: SignalRecord,
    pub intraday: SignalRecord,
    /// Most recent first, at most three entries.
    #[serde(default)]
    pub history: Vec<SignalSnapshot>,
    /// Auxiliary indicators; only the regime filter reads them.
    #[serde(default)]
    pub details: BTreeMap<String, f64>,
}

impl ModelReport {
    pub fn new(swing: SignalRecord, intraday: SignalRecord) -> Self {
        Self {
            swing,
            intraday,
            history: Vec::new(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_history(mut self, mut history: Vec<SignalSnapshot>) -> Self {
        order_most_recent_first(&mut history);
        history.truncate(MAX_HISTORY);
        self.history = history;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: f64) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    pub fn record(&self, horizon: Horizon) -> &SignalRecord {
        match horizon {
            Horizon::Swing => &self.swing,
            Horizon::Intraday => &self.intraday,
        }
    }

    pub fn detail(&self, key: &str) -> Option<f64> {
        self.details.get(key).copied()
    }
}

/// A model either produced a report or failed; never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    Live(ModelReport),
    Failed(WorkerFailure),
}

/// One (instrument, model) result for the current cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResult {
    pub model: String,
    pub outcome: ModelOutcome,
}

impl ModelResult {
    pub fn live(model: impl Into<String>, report: ModelReport) -> Self {
        Self {
            model: model.into(),
            outcome: ModelOutcome::Live(report),
        }
    }

    pub fn failed(model: impl Into<String>, failure: WorkerFailure) -> Self {
        Self {
            model: model.into(),
            outcome: ModelOutcome::Failed(failure),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.outcome, ModelOutcome::Live(_))
    }

    pub fn report(&self) -> Option<&ModelReport> {
        match &self.outcome {
            ModelOutcome::Live(report) => Some(report),
            ModelOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&WorkerFailure> {
        match &self.outcome {
            ModelOutcome::Live(_) => None,
            ModelOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// The final JSON line a worker prints.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WorkerPayload {
    Failure { error: String },
    Success(SuccessPayload),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuccessPayload {
    #[serde(default)]
    pub model_name: Option<String>,
    pub swing: SignalRecord,
    pub intraday: SignalRecord,
    #[serde(default, deserialize_with = "bounded_history")]
    pub history: Vec<SignalSnapshot>,
    #[serde(default, deserialize_with = "numeric_details")]
    pub details: BTreeMap<String, f64>,
}

impl WorkerPayload {
    /// Converts the payload into a result attributed to `model`, the name the
    /// engine invoked rather than whatever the worker calls itself.
    pub fn into_result(self, model: &str) -> ModelResult {
        match self {
            WorkerPayload::Failure { error } => ModelResult::failed(model, WorkerFailure::logic(error)),
            WorkerPayload::Success(success) => ModelResult::live(
                model,
                ModelReport {
                    swing: success.swing,
                    intraday: success.intraday,
                    history: success.history,
                    details: success.details,
                },
            ),
        }
    }
}

fn bounded_history<'de, D>(deserializer: D) -> Result<Vec<SignalSnapshot>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut history = Option::<Vec<SignalSnapshot>>::deserialize(deserializer)?.unwrap_or_default();
    order_most_recent_first(&mut history);
    history.truncate(MAX_HISTORY);
    Ok(history)
}

/// Sort history newest first when every snapshot carries a parseable date.
///
/// Undated or partly dated history is kept in the order the worker sent it,
/// which the wire contract defines as most recent first.
pub fn order_most_recent_first(history: &mut [SignalSnapshot]) {
    let stamps: Option<Vec<NaiveDateTime>> = history
        .iter()
        .map(|snapshot| snapshot.date.as_deref().and_then(parse_snapshot_date))
        .collect();
    let Some(stamps) = stamps else {
        return;
    };

    let mut keyed: Vec<(NaiveDateTime, SignalSnapshot)> = stamps.into_iter().zip(history.iter().cloned()).collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    for (slot, (_, snapshot)) in history.iter_mut().zip(keyed) {
        *slot = snapshot;
    }
}

fn parse_snapshot_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.naive_utc());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(stamp);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
}

// Workers sometimes emit strings or nulls next to the numbers; only numbers survive.
fn numeric_details<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| value.as_f64().map(|number| (key, number)))
        .collect())
}
