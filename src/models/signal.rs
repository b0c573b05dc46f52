//! Signal vocabulary shared by workers and the ensemble.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Evaluation timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    Swing,
    Intraday,
}

impl Horizon {
    pub const ALL: [Horizon; 2] = [Horizon::Swing, Horizon::Intraday];

    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::Swing => "swing",
            Horizon::Intraday => "intraday",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete ensemble decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    StrongBuy,
    Buy,
    Sell,
    StrongSell,
    Wait,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::StrongBuy => "STRONG_BUY",
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
            SignalKind::StrongSell => "STRONG_SELL",
            SignalKind::Wait => "WAIT",
        }
    }

    pub fn is_actionable(&self) -> bool {
        !matches!(self, SignalKind::Wait)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One model's call for one horizon.
///
/// `signal` is kept as the worker's raw text; workers disagree on spelling
/// ("STRONG BUY", "strong_buy", "HOLD") and the normalizer owns that mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    #[serde(default = "default_signal")]
    pub signal: String,
    #[serde(default, deserialize_with = "unit_interval")]
    pub confidence: f64,
    #[serde(default)]
    pub entry: f64,
    #[serde(default)]
    pub target: f64,
    #[serde(default, rename = "sl", alias = "stopLoss", alias = "stop_loss")]
    pub stop_loss: f64,
}

impl SignalRecord {
    pub fn new(signal: impl Into<String>, confidence: f64) -> Self {
        Self {
            signal: signal.into(),
            confidence: clamp_confidence(confidence),
            entry: 0.0,
            target: 0.0,
            stop_loss: 0.0,
        }
    }

    pub fn with_levels(mut self, entry: f64, target: f64, stop_loss: f64) -> Self {
        self.entry = entry;
        self.target = target;
        self.stop_loss = stop_loss;
        self
    }
}

/// Prior call at offset T, T-1 or T-2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    #[serde(default = "default_signal")]
    pub signal: String,
    #[serde(default, deserialize_with = "unit_interval")]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl SignalSnapshot {
    pub fn new(signal: impl Into<String>, confidence: f64) -> Self {
        Self {
            signal: signal.into(),
            confidence: clamp_confidence(confidence),
            date: None,
        }
    }
}

/// Bounds a confidence to [0, 1]. NaN is passed through untouched so the
/// engine can reject it instead of silently scoring it.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        value
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn default_signal() -> String {
    SignalKind::Wait.as_str().to_string()
}

fn unit_interval<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_confidence(raw))
}
