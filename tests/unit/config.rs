//! Unit tests for environment configuration

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use superscore::config::{EngineConfig, APEX_MODEL, HFM_MODEL, QUANT_MODEL};
use superscore::error::ConfigError;

fn config_from(vars: &[(&str, &str)]) -> Result<EngineConfig, ConfigError> {
    let map: HashMap<&str, &str> = vars.iter().copied().collect();
    EngineConfig::from_lookup(|key| map.get(key).map(|value| value.to_string()))
}

#[test]
fn test_defaults() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.models.len(), 4);
    assert_eq!(config.models[0].name, HFM_MODEL);
    assert_eq!(config.models[0].program, "python3");
    assert!(config.models[0].args[0].ends_with("hfm_wrapper.py"));
    assert_eq!(config.worker_concurrency, 4);
    assert_eq!(config.worker_timeout, Duration::from_secs(120));
    assert_eq!(config.primary_model, QUANT_MODEL);
    assert_eq!(config.model_priority[0], QUANT_MODEL);
    assert_eq!(config.model_priority[3], APEX_MODEL);
    assert_eq!(config.regime.adx_threshold, 25.0);
    assert!(!config.regime.rvol_filter_enabled);
    assert_eq!(config.universe_suffix, ".NS");
    assert!(config.universe_url.is_none());
    assert!(config.report_dir.is_none());
    assert_eq!(config.cycle_interval_seconds, 0);
}

#[test]
fn test_overrides() {
    let config = config_from(&[
        ("PYTHON", "/opt/venv/bin/python"),
        ("WRAPPER_DIR", "/srv/wrappers"),
        ("WORKER_CONCURRENCY", "2"),
        ("WORKER_TIMEOUT_SECONDS", " 30 "),
        ("PRIMARY_MODEL", APEX_MODEL),
        ("MODEL_PRIORITY", "Apex Logic, Hedge Fund Manager,,"),
        ("ADX_THRESHOLD", "20.5"),
        ("RVOL_FILTER_ENABLED", "Yes"),
        ("RVOL_THRESHOLD", "1.5"),
        ("UNIVERSE_URL", "https://example.test/ind_nifty500list.csv"),
        ("REPORT_DIR", "/tmp/reports"),
        ("CYCLE_INTERVAL_SECONDS", "300"),
    ])
    .unwrap();

    assert_eq!(config.models[2].program, "/opt/venv/bin/python");
    assert_eq!(config.models[2].args, vec!["/srv/wrappers/quant_wrapper.py".to_string()]);
    assert_eq!(config.worker_concurrency, 2);
    assert_eq!(config.worker_timeout, Duration::from_secs(30));
    assert_eq!(config.primary_model, APEX_MODEL);
    assert_eq!(config.model_priority, vec![APEX_MODEL.to_string(), HFM_MODEL.to_string()]);
    assert_eq!(config.regime.adx_threshold, 20.5);
    assert!(config.regime.rvol_filter_enabled);
    assert_eq!(config.regime.rvol_threshold, 1.5);
    assert!(config.universe_url.is_some());
    assert_eq!(config.report_dir.unwrap().to_str(), Some("/tmp/reports"));
    assert_eq!(config.cycle_interval_seconds, 300);
}

#[test]
fn test_invalid_values_are_rejected() {
    for (key, value) in [
        ("WORKER_CONCURRENCY", "abc"),
        ("WORKER_CONCURRENCY", "0"),
        ("WORKER_TIMEOUT_SECONDS", "0"),
        ("ADX_THRESHOLD", "high"),
        ("RVOL_FILTER_ENABLED", "maybe"),
        ("CYCLE_INTERVAL_SECONDS", "-5"),
        ("CYCLE_INTERVAL_SECONDS", "45"),
        ("CYCLE_INTERVAL_SECONDS", "90"),
    ] {
        match config_from(&[(key, value)]) {
            Err(ConfigError::Invalid { key: reported, .. }) => assert_eq!(reported, key),
            other => panic!("expected invalid {key}={value}, got {other:?}"),
        }
    }
}

#[test]
fn test_models_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"name": "Momentum", "program": "/usr/bin/momentum"}}, {{"name": "Mean Reversion", "program": "python3", "args": ["mr.py", "--fast"]}}]"#
    )
    .unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let config = config_from(&[("MODELS_CONFIG", path.as_str())]).unwrap();
    assert_eq!(config.model_names(), vec!["Momentum".to_string(), "Mean Reversion".to_string()]);
    assert!(config.models[0].args.is_empty());
    assert_eq!(config.models[1].args, vec!["mr.py".to_string(), "--fast".to_string()]);
}

#[test]
fn test_models_config_errors() {
    let missing = config_from(&[("MODELS_CONFIG", "/nonexistent/models.json")]);
    assert!(matches!(missing, Err(ConfigError::Io { .. })));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    let path = file.path().to_str().unwrap().to_string();
    assert!(matches!(config_from(&[("MODELS_CONFIG", path.as_str())]), Err(ConfigError::Parse { .. })));
}
