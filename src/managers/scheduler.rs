//! Daily backup scheduler
//!
//! Fires the scheduled handler once at startup (when enabled) and then every day
//! at a fixed local time. Errors and panics from a run are logged here and never
//! leave the scheduler; there is no retry within a tick.

use super::service::BackupService;
use crate::config::{self, ScheduleConfig};
use crate::error::BackupError;
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveTime, TimeZone};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub struct Scheduler {
    service: Arc<BackupService>,
    daily_at: NaiveTime,
    run_on_startup: bool,
}

impl Scheduler {
    pub fn new(service: Arc<BackupService>, daily_at: NaiveTime, run_on_startup: bool) -> Self {
        Self {
            service,
            daily_at,
            run_on_startup,
        }
    }

    pub fn from_config(service: Arc<BackupService>, schedule: &ScheduleConfig) -> config::Result<Self> {
        let daily_at = config::parse_daily_time(&schedule.daily_at)?;
        Ok(Self::new(service, daily_at, schedule.run_on_startup))
    }

    /// Run one scheduled job. Never fails: every outcome is logged.
    pub async fn run_daily_job(&self) -> Option<PathBuf> {
        let service = self.service.clone();
        let job = tokio::spawn(async move { service.handle_daily_backup().await });

        match job.await {
            Ok(Ok(outcome)) => {
                if !outcome.prune.warnings.is_empty() {
                    warn!(
                        "Scheduled backup succeeded but {} expired archive(s) could not be removed",
                        outcome.prune.warnings.len()
                    );
                }
                Some(outcome.archive)
            }
            Ok(Err(BackupError::BackupInProgress)) => {
                warn!("Skipping scheduled backup: another backup job is running");
                None
            }
            Ok(Err(e)) => {
                error!("Scheduled backup failed: {}", e);
                None
            }
            Err(join_error) => {
                error!("Scheduled backup task aborted: {}", join_error);
                None
            }
        }
    }

    /// Run until `shutdown` changes or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Scheduler started: daily at {}, run on startup: {}",
            self.daily_at, self.run_on_startup
        );

        if self.run_on_startup {
            info!("Running startup backup");
            self.run_daily_job().await;
        }

        let mut last_fired: Option<DateTime<Local>> = None;

        loop {
            let now = Local::now();
            let next = next_trigger_since(&now, self.daily_at, last_fired.as_ref());
            let wait = (next.clone() - now).to_std().unwrap_or(Duration::ZERO);
            info!("Next scheduled backup at {}", next.to_rfc3339());

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    last_fired = Some(next.clone());
                    self.run_daily_job().await;
                }
                _ = shutdown.changed() => {
                    info!("Scheduler stopping");
                    break;
                }
            }
        }
    }

    /// Spawn [`Scheduler::run`] onto the current runtime
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

/// Next trigger to wait for, never at or before the one that last fired.
///
/// A timer may wake slightly before its wall-clock deadline; measuring from
/// `last_fired` keeps that trigger from running twice.
pub fn next_trigger_since<Tz: TimeZone>(
    now: &DateTime<Tz>,
    at: NaiveTime,
    last_fired: Option<&DateTime<Tz>>,
) -> DateTime<Tz> {
    match last_fired {
        Some(fired) if fired >= now => next_trigger_after(fired, at),
        _ => next_trigger_after(now, at),
    }
}

/// Next occurrence of the wall-clock time `at` strictly after `now`.
///
/// Times falling in a DST gap move forward by an hour; ambiguous times use the
/// earlier instant.
pub fn next_trigger_after<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();

    for _ in 0..3 {
        let naive = date.and_time(at);
        let candidate = tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(naive + ChronoDuration::hours(1))).earliest());

        if let Some(candidate) = candidate {
            if candidate > *now {
                return candidate;
            }
        }

        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    now.clone() + ChronoDuration::days(1)
}
