//! Final signal mapping and trade-parameter resolution

use crate::models::{EnsembleResult, Horizon, ModelResult, SignalKind};
use crate::signals::normalizer::signal_matches;

/// Scores at or beyond this magnitude are STRONG calls.
pub const STRONG_THRESHOLD: f64 = 0.5;
/// Scores strictly beyond this magnitude are actionable.
pub const ACTION_THRESHOLD: f64 = 0.15;

/// Map a super score onto the discrete signal scale.
pub fn final_signal(score: f64) -> SignalKind {
    if score >= STRONG_THRESHOLD {
        SignalKind::StrongBuy
    } else if score > ACTION_THRESHOLD {
        SignalKind::Buy
    } else if score <= -STRONG_THRESHOLD {
        SignalKind::StrongSell
    } else if score < -ACTION_THRESHOLD {
        SignalKind::Sell
    } else {
        SignalKind::Wait
    }
}

/// Picks whose entry/target/stop the ensemble adopts.
#[derive(Debug, Clone)]
pub struct DecisionResolver {
    priority: Vec<String>,
    primary: String,
}

impl DecisionResolver {
    pub fn new(priority: Vec<String>, primary: impl Into<String>) -> Self {
        Self {
            priority,
            primary: primary.into(),
        }
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Resolve the decision for one horizon.
    ///
    /// The first live model in priority order whose signal agrees with the
    /// final signal supplies the parameters verbatim. Otherwise the primary
    /// model does, agreeing or not; if it failed too, parameters are zero.
    pub fn resolve(&self, results: &[ModelResult], horizon: Horizon, super_score: f64) -> EnsembleResult {
        let signal = final_signal(super_score);

        let agreeing = self.priority.iter().find_map(|name| {
            let result = results.iter().find(|r| &r.model == name)?;
            let record = result.report()?.record(horizon);
            signal_matches(&record.signal, signal.as_str()).then_some((result, record))
        });

        let chosen = agreeing.or_else(|| {
            let result = results.iter().find(|r| r.model == self.primary)?;
            Some((result, result.report()?.record(horizon)))
        });

        match chosen {
            Some((result, record)) => EnsembleResult {
                super_score,
                final_signal: signal,
                entry: record.entry,
                target: record.target,
                stop_loss: record.stop_loss,
                source_model: result.model.clone(),
            },
            None => EnsembleResult {
                super_score,
                final_signal: signal,
                entry: 0.0,
                target: 0.0,
                stop_loss: 0.0,
                source_model: String::new(),
            },
        }
    }
}
