//! Cron-based scheduler that repeats the evaluation cycle

use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::core::orchestrator::Orchestrator;
use crate::error::ConfigError;
use crate::models::CycleOutcome;

/// Runs a full, stateless cycle on every cron tick
pub struct CycleScheduler {
    orchestrator: Arc<Orchestrator>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl CycleScheduler {
    /// Create a scheduler firing every `interval_seconds`.
    ///
    /// Fails for intervals cron cannot repeat evenly, see [`interval_to_cron`].
    pub fn new(orchestrator: Arc<Orchestrator>, interval_seconds: u64) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::Invalid {
            key: "CYCLE_INTERVAL_SECONDS".to_string(),
            value: interval_seconds.to_string(),
        };
        let cron_expr = interval_to_cron(interval_seconds).ok_or_else(invalid)?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|_| invalid())?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "CycleScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            orchestrator,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub async fn start(&self) {
        let orchestrator = self.orchestrator.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("CycleScheduler: started, waiting for cron schedule...");

            loop {
                match schedule.upcoming(chrono::Utc).next() {
                    Some(next_tick) => {
                        let duration = (next_tick - chrono::Utc::now()).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }
                    None => {
                        tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                        continue;
                    }
                }

                match orchestrator.run_cycle().await {
                    Ok(CycleOutcome::Completed(report)) => info!(
                        swing = report.swing.len(),
                        intraday = report.intraday.len(),
                        skipped = report.skipped.len(),
                        "CycleScheduler: cycle completed"
                    ),
                    Ok(CycleOutcome::NoResults(report)) => warn!(
                        attempted = report.attempted,
                        "CycleScheduler: cycle produced no decisions"
                    ),
                    Err(e) => error!(error = %e, "CycleScheduler: cycle failed"),
                }
            }
        });

        *self.handle.write().await = Some(handle);
        info!("CycleScheduler: started successfully");
    }

    pub async fn stop(&self) {
        if let Some(h) = self.handle.write().await.take() {
            h.abort();
            info!("CycleScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}

/// Cron expression (second minute hour day month weekday) repeating every
/// `interval_seconds`, or `None` when no single field steps evenly.
///
/// Cron steps restart at each minute, hour or day boundary, so the interval
/// must divide the enclosing unit: 45s or 90s have no evenly spaced form.
pub fn interval_to_cron(interval_seconds: u64) -> Option<String> {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    match interval_seconds {
        0 => None,
        s if s < MINUTE && MINUTE % s == 0 => Some(format!("*/{} * * * * *", s)),
        s if s < HOUR && s % MINUTE == 0 && HOUR % s == 0 => Some(format!("0 */{} * * * *", s / MINUTE)),
        s if s < DAY && s % HOUR == 0 && DAY % s == 0 => Some(format!("0 0 */{} * * *", s / HOUR)),
        DAY => Some("0 0 0 * * *".to_string()),
        _ => None,
    }
}
