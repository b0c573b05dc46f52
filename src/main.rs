//! Superscore runner
//!
//! Evaluates the configured instrument universe once, or repeatedly when
//! `CYCLE_INTERVAL_SECONDS` is set, and hands each cycle to a report sink.

use dotenvy::dotenv;
use std::sync::Arc;
use superscore::config::{get_environment, EngineConfig};
use superscore::core::{CycleScheduler, Orchestrator, WorkerInvoker};
use superscore::logging;
use superscore::metrics::Metrics;
use superscore::models::CycleOutcome;
use superscore::services::{
    FallbackUniverse, HttpUniverseSource, JsonReportSink, LogReportSink, ReportSink,
    SnapshotUniverseSource, StaticUniverseSource, StrategyWorker, SubprocessWorker,
    UniverseSource,
};
use superscore::signals::EnsembleEngine;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = EngineConfig::from_env()?;
    info!(environment = %get_environment(), "Starting Superscore");
    info!(
        models = ?config.model_names(),
        concurrency = config.worker_concurrency,
        timeout_secs = config.worker_timeout.as_secs(),
        "Worker pool configured"
    );
    if config.regime.rvol_filter_enabled {
        info!(threshold = config.regime.rvol_threshold, "RVOL filter enabled");
    }

    let metrics = Arc::new(Metrics::new()?);

    let workers: Vec<Arc<dyn StrategyWorker>> = config
        .models
        .iter()
        .cloned()
        .map(|spec| Arc::new(SubprocessWorker::new(spec)) as Arc<dyn StrategyWorker>)
        .collect();
    let invoker = WorkerInvoker::new(workers, config.worker_concurrency, config.worker_timeout)
        .with_metrics(metrics.clone());

    let orchestrator = Arc::new(
        Orchestrator::new(
            invoker,
            EnsembleEngine::from_config(&config),
            build_universe(&config),
            build_sink(&config),
        )
        .with_metrics(metrics.clone()),
    );

    if config.cycle_interval_seconds == 0 {
        match orchestrator.run_cycle().await? {
            CycleOutcome::Completed(report) => info!(
                swing = report.swing.len(),
                intraday = report.intraday.len(),
                skipped = report.skipped.len(),
                "Analysis complete"
            ),
            CycleOutcome::NoResults(report) => warn!(
                attempted = report.attempted,
                "Analysis complete: no instrument produced a decision"
            ),
        }
        if let Ok(text) = metrics.export() {
            tracing::debug!(metrics = %text, "final metrics");
        }
        return Ok(());
    }

    let scheduler = CycleScheduler::new(orchestrator, config.cycle_interval_seconds)?;
    scheduler.start().await;

    info!("Scheduler running, waiting for shutdown signal...");
    signal::ctrl_c().await?;
    info!("Shutting down...");
    scheduler.stop().await;

    Ok(())
}

fn build_universe(config: &EngineConfig) -> Arc<dyn UniverseSource> {
    let snapshot = Arc::new(SnapshotUniverseSource::new(config.universe_cache_path.clone()));
    let mut sources: Vec<Arc<dyn UniverseSource>> = Vec::new();

    if let Some(url) = &config.universe_url {
        sources.push(Arc::new(HttpUniverseSource::new(url.clone(), config.universe_suffix.clone())));
    }
    sources.push(snapshot.clone());
    sources.push(Arc::new(StaticUniverseSource::indian_large_caps()));

    let chain = FallbackUniverse::new(sources);
    if config.universe_url.is_some() {
        Arc::new(chain.with_snapshot_refresh(snapshot))
    } else {
        Arc::new(chain)
    }
}

fn build_sink(config: &EngineConfig) -> Arc<dyn ReportSink> {
    match &config.report_dir {
        Some(dir) => Arc::new(JsonReportSink::new(dir.clone())),
        None => Arc::new(LogReportSink),
    }
}
