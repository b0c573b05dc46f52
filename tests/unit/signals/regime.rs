//! Unit tests for the trend-regime veto

use crate::support::*;
use superscore::config::RegimeConfig;
use superscore::models::Horizon;
use superscore::signals::regime::{RegimeFilter, RegimeReading};

fn reading(adx: Option<f64>, rvol: Option<f64>) -> RegimeReading {
    RegimeReading {
        avg_adx: adx,
        avg_rvol: rvol,
    }
}

#[test]
fn test_reading_averages_positive_values_of_live_models() {
    let results = vec![
        with_adx(live("a", "BUY", 0.5), 18.0),
        with_adx(live("b", "BUY", 0.5), 30.0),
        with_adx(live("c", "BUY", 0.5), 0.0),
        failed("d", "crash"),
    ];
    let reading = RegimeReading::from_results(&results);
    assert_close(reading.avg_adx.unwrap(), 24.0);
    assert!(reading.avg_rvol.is_none());
}

#[test]
fn test_reading_without_any_adx() {
    let reading = RegimeReading::from_results(&consensus_trio());
    assert!(reading.avg_adx.is_none());
}

#[test]
fn test_choppy_regime_vetoes_bullish_swing() {
    let filter = RegimeFilter::default();
    assert_eq!(filter.apply(Horizon::Swing, 0.16, &reading(Some(18.0), None)), (0.0, true));
}

#[test]
fn test_veto_is_swing_only() {
    let filter = RegimeFilter::default();
    assert_eq!(filter.apply(Horizon::Intraday, 0.16, &reading(Some(18.0), None)), (0.16, false));
}

#[test]
fn test_veto_never_touches_bearish_scores() {
    let filter = RegimeFilter::default();
    assert_eq!(filter.apply(Horizon::Swing, -0.4, &reading(Some(10.0), None)), (-0.4, false));
}

#[test]
fn test_trending_regime_passes() {
    let filter = RegimeFilter::default();
    assert_eq!(filter.apply(Horizon::Swing, 0.6, &reading(Some(25.0), None)), (0.6, false));
    assert_eq!(filter.apply(Horizon::Swing, 0.6, &reading(None, None)), (0.6, false));
}

#[test]
fn test_rvol_filter_disabled_by_default() {
    let filter = RegimeFilter::default();
    assert!(!filter.config().rvol_filter_enabled);
    assert_eq!(filter.apply(Horizon::Swing, 0.6, &reading(Some(40.0), Some(0.4))), (0.6, false));
}

#[test]
fn test_rvol_filter_when_enabled() {
    let filter = RegimeFilter::new(RegimeConfig {
        rvol_filter_enabled: true,
        ..RegimeConfig::default()
    });
    assert_eq!(filter.apply(Horizon::Swing, 0.6, &reading(Some(40.0), Some(0.4))), (0.0, true));
    assert_eq!(filter.apply(Horizon::Swing, 0.6, &reading(Some(40.0), Some(1.5))), (0.6, false));
    assert_eq!(filter.apply(Horizon::Intraday, 0.6, &reading(Some(40.0), Some(0.4))), (0.6, false));
}
