//! Environment-driven engine configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::core::scheduler::interval_to_cron;
use crate::error::ConfigError;

pub const HFM_MODEL: &str = "Hedge Fund Manager";
pub const STOCK_AI_MODEL: &str = "Most Advance stock_AI";
pub const QUANT_MODEL: &str = "Quantitative Development";
pub const APEX_MODEL: &str = "Apex Logic";

/// Deployment environment, `sandbox` unless `ENVIRONMENT` says otherwise.
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn is_production() -> bool {
    matches!(get_environment().as_str(), "production" | "prod")
}

/// How to launch one strategy-model worker.
///
/// The invoker appends `--ticker <instrument>` to `args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
        }
    }
}

/// Regime filter tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeConfig {
    /// Bullish swing scores are vetoed below this average ADX.
    pub adx_threshold: f64,
    /// Relative-volume veto; computed always, applied only when set.
    pub rvol_filter_enabled: bool,
    pub rvol_threshold: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            adx_threshold: 25.0,
            rvol_filter_enabled: false,
            rvol_threshold: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub models: Vec<ModelSpec>,
    pub worker_concurrency: usize,
    pub worker_timeout: Duration,
    pub primary_model: String,
    pub model_priority: Vec<String>,
    pub regime: RegimeConfig,
    pub universe_url: Option<String>,
    pub universe_suffix: String,
    pub universe_cache_path: PathBuf,
    pub report_dir: Option<PathBuf>,
    pub cycle_interval_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            models: default_models("python3", Path::new("wrappers")),
            worker_concurrency: 4,
            worker_timeout: Duration::from_secs(120),
            primary_model: QUANT_MODEL.to_string(),
            model_priority: vec![
                QUANT_MODEL.to_string(),
                STOCK_AI_MODEL.to_string(),
                HFM_MODEL.to_string(),
                APEX_MODEL.to_string(),
            ],
            regime: RegimeConfig::default(),
            universe_url: None,
            universe_suffix: ".NS".to_string(),
            universe_cache_path: PathBuf::from("universe_snapshot.json"),
            report_dir: None,
            cycle_interval_seconds: 0,
        }
    }
}

impl EngineConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset keys keep their defaults,
    /// set-but-invalid keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let models = match lookup("MODELS_CONFIG") {
            Some(path) => load_models(Path::new(&path))?,
            None => {
                let python = lookup("PYTHON").unwrap_or_else(|| "python3".to_string());
                let dir = lookup("WRAPPER_DIR").unwrap_or_else(|| "wrappers".to_string());
                default_models(&python, Path::new(&dir))
            }
        };

        let worker_concurrency: usize = parse_var(&lookup, "WORKER_CONCURRENCY", defaults.worker_concurrency)?;
        if worker_concurrency == 0 {
            return Err(invalid("WORKER_CONCURRENCY", "0"));
        }
        let timeout_secs: u64 = parse_var(&lookup, "WORKER_TIMEOUT_SECONDS", defaults.worker_timeout.as_secs())?;
        if timeout_secs == 0 {
            return Err(invalid("WORKER_TIMEOUT_SECONDS", "0"));
        }

        let cycle_interval_seconds: u64 =
            parse_var(&lookup, "CYCLE_INTERVAL_SECONDS", defaults.cycle_interval_seconds)?;
        if cycle_interval_seconds > 0 && interval_to_cron(cycle_interval_seconds).is_none() {
            return Err(invalid("CYCLE_INTERVAL_SECONDS", &cycle_interval_seconds.to_string()));
        }

        let model_priority = match lookup("MODEL_PRIORITY") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.model_priority,
        };

        let regime = RegimeConfig {
            adx_threshold: parse_var(&lookup, "ADX_THRESHOLD", defaults.regime.adx_threshold)?,
            rvol_filter_enabled: parse_flag(&lookup, "RVOL_FILTER_ENABLED", defaults.regime.rvol_filter_enabled)?,
            rvol_threshold: parse_var(&lookup, "RVOL_THRESHOLD", defaults.regime.rvol_threshold)?,
        };

        Ok(Self {
            models,
            worker_concurrency,
            worker_timeout: Duration::from_secs(timeout_secs),
            primary_model: lookup("PRIMARY_MODEL").unwrap_or(defaults.primary_model),
            model_priority,
            regime,
            universe_url: lookup("UNIVERSE_URL").filter(|url| !url.is_empty()),
            universe_suffix: lookup("UNIVERSE_SUFFIX").unwrap_or(defaults.universe_suffix),
            universe_cache_path: lookup("UNIVERSE_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.universe_cache_path),
            report_dir: lookup("REPORT_DIR").filter(|dir| !dir.is_empty()).map(PathBuf::from),
            cycle_interval_seconds,
        })
    }

    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name.clone()).collect()
    }
}

/// The four bundled strategy wrappers, run through `python`.
pub fn default_models(python: &str, wrapper_dir: &Path) -> Vec<ModelSpec> {
    [
        (HFM_MODEL, "hfm_wrapper.py"),
        (STOCK_AI_MODEL, "stock_ai_wrapper.py"),
        (QUANT_MODEL, "quant_wrapper.py"),
        (APEX_MODEL, "apex_wrapper.py"),
    ]
    .into_iter()
    .map(|(name, script)| {
        ModelSpec::new(
            name,
            python,
            vec![wrapper_dir.join(script).to_string_lossy().into_owned()],
        )
    })
    .collect()
}

/// Load worker definitions from a JSON array of `{name, program, args}`.
pub fn load_models(path: &Path) -> Result<Vec<ModelSpec>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| invalid(key, &raw)),
        None => Ok(default),
    }
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(key, &raw)),
        },
        None => Ok(default),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}
