//! Unit tests for the ensemble engine

use crate::support::*;
use superscore::config::{APEX_MODEL, HFM_MODEL, QUANT_MODEL, STOCK_AI_MODEL};
use superscore::error::EngineError;
use superscore::models::{Horizon, Instrument, SignalKind};
use superscore::signals::EnsembleEngine;

fn instrument() -> Instrument {
    Instrument::new("TCS.NS")
}

#[test]
fn test_consensus_without_regime_data_is_buy() {
    let analysis = EnsembleEngine::default()
        .evaluate(&instrument(), &consensus_trio())
        .unwrap();

    assert_close(analysis.swing.result.super_score, 0.16);
    assert_eq!(analysis.swing.result.final_signal, SignalKind::Buy);
    assert!(!analysis.swing.vetoed);
    assert_eq!(analysis.intraday.result.final_signal, SignalKind::Buy);
}

#[test]
fn test_choppy_regime_vetoes_swing_but_not_intraday() {
    let results: Vec<_> = consensus_trio().into_iter().map(|r| with_adx(r, 18.0)).collect();
    let analysis = EnsembleEngine::default().evaluate(&instrument(), &results).unwrap();

    assert_eq!(analysis.swing.result.super_score, 0.0);
    assert_eq!(analysis.swing.result.final_signal, SignalKind::Wait);
    assert!(analysis.swing.vetoed);
    assert_close(analysis.swing.raw_score, 0.16);

    assert_close(analysis.intraday.result.super_score, 0.16);
    assert_eq!(analysis.intraday.result.final_signal, SignalKind::Buy);
    assert!(!analysis.intraday.vetoed);
}

#[test]
fn test_all_models_failed() {
    let results = vec![
        failed(HFM_MODEL, "No data"),
        failed(STOCK_AI_MODEL, "No data"),
        failed(QUANT_MODEL, "exit status: 1"),
        failed(APEX_MODEL, "Insufficient data"),
    ];
    let analysis = EnsembleEngine::default().evaluate(&instrument(), &results).unwrap();

    for decision in [&analysis.swing, &analysis.intraday] {
        assert_eq!(decision.result.super_score, 0.0);
        assert_eq!(decision.result.final_signal, SignalKind::Wait);
        assert_eq!(decision.result.entry, 0.0);
        assert_eq!(decision.result.target, 0.0);
        assert_eq!(decision.result.stop_loss, 0.0);
        assert_eq!(decision.result.source_model, "");
        assert_eq!(decision.models.len(), 4);
        assert!(decision.models.iter().all(|m| m.errored && m.confidence == 0.0));
        assert!(decision.models.iter().all(|m| m.signal.starts_with("ERR: ")));
    }
}

#[test]
fn test_breakdown_keeps_model_order_and_scores() {
    let mut results = consensus_trio();
    results.push(failed(APEX_MODEL, "timed out"));
    let analysis = EnsembleEngine::default().evaluate(&instrument(), &results).unwrap();

    let names: Vec<_> = analysis.swing.models.iter().map(|m| m.model.as_str()).collect();
    assert_eq!(names, vec![QUANT_MODEL, STOCK_AI_MODEL, HFM_MODEL, APEX_MODEL]);
    assert_close(analysis.swing.models[0].persistence_score, 0.28);
    assert_close(analysis.swing.models[2].persistence_score, -0.10);
    assert_eq!(analysis.swing.models[3].signal, "ERR: timed out");
}

#[test]
fn test_evaluation_is_idempotent() {
    let engine = EnsembleEngine::default();
    let results: Vec<_> = consensus_trio().into_iter().map(|r| with_adx(r, 31.0)).collect();

    let first = engine.evaluate(&instrument(), &results).unwrap();
    let second = engine.evaluate(&instrument(), &results).unwrap();

    assert_eq!(first, second);
    for horizon in Horizon::ALL {
        let (a, b) = match horizon {
            Horizon::Swing => (&first.swing, &second.swing),
            Horizon::Intraday => (&first.intraday, &second.intraday),
        };
        assert_eq!(a.result.super_score.to_bits(), b.result.super_score.to_bits());
    }
}

#[test]
fn test_non_finite_score_is_an_error() {
    let results = vec![live(QUANT_MODEL, "BUY", f64::NAN)];
    let err = EnsembleEngine::default().evaluate(&instrument(), &results).unwrap_err();
    assert!(matches!(err, EngineError::NonFiniteScore { horizon: Horizon::Swing, .. }));
}
