//! Instrument-universe providers and their fallback chain.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::UniverseError;
use crate::models::Instrument;

/// Source of the ordered instrument list evaluated each cycle.
#[async_trait]
pub trait UniverseSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<Instrument>, UniverseError>;
}

/// Browser-like agent; NSE archives refuse requests without one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Downloads a CSV index constituent list and reads its `Symbol` column.
pub struct HttpUniverseSource {
    url: String,
    suffix: String,
    client: reqwest::Client,
    user_agent: String,
    retries: usize,
}

impl HttpUniverseSource {
    pub fn new(url: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::with_client(url, suffix, reqwest::Client::new())
    }

    pub fn with_client(url: impl Into<String>, suffix: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            suffix: suffix.into(),
            client,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retries: 2,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    async fn download(&self) -> Result<String, UniverseError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .timeout(Duration::from_secs(10))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UniverseError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl UniverseSource for HttpUniverseSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> Result<Vec<Instrument>, UniverseError> {
        let body = (|| self.download())
            .retry(ExponentialBuilder::default().with_max_times(self.retries))
            .when(|e| matches!(e, UniverseError::Http(_) | UniverseError::Status { status: 500..=599, .. }))
            .notify(|e, delay| warn!(url = %self.url, error = %e, ?delay, "universe download failed, retrying"))
            .await?;
        parse_symbol_csv(&body, &self.suffix)
    }
}

/// Read the `Symbol` column of a CSV document, appending the venue suffix.
pub fn parse_symbol_csv(body: &str, suffix: &str) -> Result<Vec<Instrument>, UniverseError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let column = reader
        .headers()
        .map_err(|e| UniverseError::Parse(e.to_string()))?
        .iter()
        .position(|header| header == "Symbol")
        .ok_or_else(|| UniverseError::Parse("missing Symbol column".to_string()))?;

    let mut instruments = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| UniverseError::Parse(e.to_string()))?;
        if let Some(symbol) = record.get(column).filter(|s| !s.is_empty()) {
            instruments.push(Instrument::new(format!("{}{}", symbol, suffix)));
        }
    }
    Ok(dedup_preserving_order(instruments))
}

/// Cached universe snapshot stored as a JSON array of identifiers.
pub struct SnapshotUniverseSource {
    path: PathBuf,
}

impl SnapshotUniverseSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the snapshot with a freshly fetched universe.
    pub async fn store(&self, instruments: &[Instrument]) -> Result<(), UniverseError> {
        let body = serde_json::to_string_pretty(instruments).map_err(|e| UniverseError::Parse(e.to_string()))?;
        tokio::fs::write(&self.path, body).await.map_err(|source| UniverseError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl UniverseSource for SnapshotUniverseSource {
    fn name(&self) -> &str {
        "snapshot"
    }

    async fn fetch(&self) -> Result<Vec<Instrument>, UniverseError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|source| UniverseError::Io {
            path: self.path.clone(),
            source,
        })?;
        let instruments: Vec<Instrument> =
            serde_json::from_str(&raw).map_err(|e| UniverseError::Parse(e.to_string()))?;
        Ok(dedup_preserving_order(instruments))
    }
}

const NIFTY_50: &[&str] = &[
    "RELIANCE.NS", "TCS.NS", "HDFCBANK.NS", "INFY.NS", "ICICIBANK.NS",
    "HINDUNILVR.NS", "SBIN.NS", "BHARTIARTL.NS", "ITC.NS", "KOTAKBANK.NS",
    "LICI.NS", "LT.NS", "AXISBANK.NS", "ASIANPAINT.NS", "HCLTECH.NS",
    "MARUTI.NS", "TITAN.NS", "BAJFINANCE.NS", "SUNPHARMA.NS", "ULTRACEMCO.NS",
    "TATAMOTORS.NS", "NTPC.NS", "POWERGRID.NS", "M&M.NS", "ONGC.NS",
    "ADANIENT.NS", "ADANIPORTS.NS", "BAJAJFINSV.NS", "COALINDIA.NS", "JSWSTEEL.NS",
    "TATASTEEL.NS", "HINDALCO.NS", "GRASIM.NS", "CIPLA.NS", "TECHM.NS",
    "WIPRO.NS", "DRREDDY.NS", "SBILIFE.NS", "BRITANNIA.NS", "INDUSINDBK.NS",
    "TATACONSUM.NS", "DIVISLAB.NS", "EICHERMOT.NS", "NESTLEIND.NS", "BPCL.NS",
    "HEROMOTOCO.NS", "APOLLOHOSP.NS", "UPL.NS",
];

const SENSEX_30: &[&str] = &[
    "RELIANCE.BO", "TCS.BO", "HDFCBANK.BO", "INFY.BO", "ICICIBANK.BO",
    "HINDUNILVR.BO", "SBIN.BO", "BHARTIARTL.BO", "ITC.BO", "KOTAKBANK.BO",
    "LT.BO", "AXISBANK.BO", "ASIANPAINT.BO", "HCLTECH.BO", "MARUTI.BO",
    "TITAN.BO", "BAJFINANCE.BO", "SUNPHARMA.BO", "ULTRACEMCO.BO", "TATAMOTORS.BO",
    "NTPC.BO", "POWERGRID.BO", "M&M.BO", "TATASTEEL.BO", "JSWSTEEL.BO",
    "BAJAJFINSV.BO", "INDUSINDBK.BO", "TECHM.BO", "WIPRO.BO", "NESTLEIND.BO",
];

/// Fixed instrument list, the last resort of the chain.
pub struct StaticUniverseSource {
    instruments: Vec<Instrument>,
}

impl StaticUniverseSource {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self {
            instruments: dedup_preserving_order(instruments),
        }
    }

    /// NIFTY 50 followed by SENSEX 30.
    pub fn indian_large_caps() -> Self {
        Self::new(NIFTY_50.iter().chain(SENSEX_30).map(|&id| Instrument::new(id)).collect())
    }
}

#[async_trait]
impl UniverseSource for StaticUniverseSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<Vec<Instrument>, UniverseError> {
        Ok(self.instruments.clone())
    }
}

/// Tries each source in order; the first non-empty list wins.
///
/// When the first source wins and a snapshot is attached, the snapshot is
/// refreshed so later cycles can fall back to it.
pub struct FallbackUniverse {
    sources: Vec<Arc<dyn UniverseSource>>,
    snapshot: Option<Arc<SnapshotUniverseSource>>,
}

impl FallbackUniverse {
    pub fn new(sources: Vec<Arc<dyn UniverseSource>>) -> Self {
        Self { sources, snapshot: None }
    }

    pub fn with_snapshot_refresh(mut self, snapshot: Arc<SnapshotUniverseSource>) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}

#[async_trait]
impl UniverseSource for FallbackUniverse {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch(&self) -> Result<Vec<Instrument>, UniverseError> {
        for (index, source) in self.sources.iter().enumerate() {
            match source.fetch().await {
                Ok(instruments) if !instruments.is_empty() => {
                    info!(source = source.name(), count = instruments.len(), "universe loaded");
                    if index == 0 {
                        if let Some(snapshot) = &self.snapshot {
                            if let Err(e) = snapshot.store(&instruments).await {
                                warn!(error = %e, "failed to refresh universe snapshot");
                            }
                        }
                    }
                    return Ok(instruments);
                }
                Ok(_) => warn!(source = source.name(), error = %UniverseError::Empty(source.name().to_string()), "universe source empty"),
                Err(e) => warn!(source = source.name(), error = %e, "universe source failed"),
            }
        }
        Err(UniverseError::Exhausted)
    }
}

fn dedup_preserving_order(instruments: Vec<Instrument>) -> Vec<Instrument> {
    let mut seen = HashSet::new();
    instruments
        .into_iter()
        .filter(|instrument| seen.insert(instrument.clone()))
        .collect()
}
