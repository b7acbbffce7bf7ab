//! Cron scheduling for the weekly prompt round.
//!
//! Wraps `tokio-cron-scheduler` around a single recurring job. The
//! schedule string accepts standard cron (5- or 6-field) plus a few
//! human-readable forms, and `missed_runs` lets the startup path detect
//! rounds that should have fired while the bot was down.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

/// Errors from scheduling operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The cron runtime failed to create, register, or stop the job.
    #[error("scheduler error: {0}")]
    JobError(String),

    /// The schedule is neither valid cron nor a recognized phrase.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
}

fn job_err(e: JobSchedulerError) -> SchedulerError {
    SchedulerError::JobError(e.to_string())
}

/// Callback invoked with the fire time each time the schedule triggers.
pub type PromptCallback =
    Arc<dyn Fn(DateTime<Utc>) -> futures_util::future::BoxFuture<'static, ()> + Send + Sync>;

// ---------------------------------------------------------------------------
// Schedule normalization
// ---------------------------------------------------------------------------

const WEEKDAYS: [(&str, &str); 7] = [
    ("monday", "Mon"),
    ("tuesday", "Tue"),
    ("wednesday", "Wed"),
    ("thursday", "Thu"),
    ("friday", "Fri"),
    ("saturday", "Sat"),
    ("sunday", "Sun"),
];

/// Normalize a schedule string to a 6-field cron expression.
///
/// Supported forms (case-insensitive):
/// - 5-field cron           -> "0" prepended for seconds
/// - 6-field cron           -> returned as-is
/// - "every N seconds"      -> "*/N * * * * *"
/// - "every N minutes"      -> "0 */N * * * *"
/// - "every N hours"        -> "0 0 */N * * *"
/// - "every hour" / "hourly"-> "0 0 * * * *"
/// - "every day" / "daily"  -> "0 0 0 * * *"
/// - "every day at HH:MM"   -> "0 MM HH * * *"
/// - "every friday"         -> "0 0 0 * * Fri" (any weekday name)
/// - "every friday at HH:MM"-> "0 MM HH * * Fri"
pub fn normalize_schedule(input: &str) -> Result<String, SchedulerError> {
    let spec = input.trim();
    let lowered = spec.to_lowercase();

    if let Some(phrase) = lowered.strip_prefix("every ") {
        return phrase_to_cron(phrase, spec);
    }

    // Bare cron: 5-field expressions gain a seconds column, 6-field pass
    // through untouched.
    match spec.split_whitespace().count() {
        5 => Ok(format!("0 {spec}")),
        6 => Ok(spec.to_string()),
        _ => match lowered.as_str() {
            "hourly" => Ok("0 0 * * * *".to_string()),
            "daily" => Ok("0 0 0 * * *".to_string()),
            _ => Err(unrecognized(spec)),
        },
    }
}

/// Translate the phrase following "every " into 6-field cron.
fn phrase_to_cron(phrase: &str, original: &str) -> Result<String, SchedulerError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    match words.as_slice() {
        ["hour"] => Ok("0 0 * * * *".to_string()),
        ["day"] => Ok("0 0 0 * * *".to_string()),
        ["day", "at", time] => {
            let (hour, minute) = clock_time(time, original)?;
            Ok(format!("0 {minute} {hour} * * *"))
        }
        [day] => match weekday_abbrev(day) {
            Some(abbrev) => Ok(format!("0 0 0 * * {abbrev}")),
            None => Err(unrecognized(original)),
        },
        [day, "at", time] => {
            let abbrev = weekday_abbrev(day).ok_or_else(|| unrecognized(original))?;
            let (hour, minute) = clock_time(time, original)?;
            Ok(format!("0 {minute} {hour} * * {abbrev}"))
        }
        [count, unit] => interval_to_cron(count, unit, original),
        _ => Err(unrecognized(original)),
    }
}

/// "N seconds" / "N minutes" / "N hours", singular or plural.
fn interval_to_cron(count: &str, unit: &str, original: &str) -> Result<String, SchedulerError> {
    let n: u32 = count.parse().map_err(|_| unrecognized(original))?;
    if n == 0 {
        return Err(SchedulerError::InvalidSchedule(
            "interval must be > 0".to_string(),
        ));
    }
    match unit.trim_end_matches('s') {
        "second" => Ok(format!("*/{n} * * * * *")),
        "minute" => Ok(format!("0 */{n} * * * *")),
        "hour" => Ok(format!("0 0 */{n} * * *")),
        _ => Err(unrecognized(original)),
    }
}

fn weekday_abbrev(name: &str) -> Option<&'static str> {
    WEEKDAYS
        .iter()
        .find(|(long, _)| *long == name)
        .map(|(_, abbrev)| *abbrev)
}

/// Parse "HH:MM" on a 24-hour clock.
fn clock_time(value: &str, original: &str) -> Result<(u32, u32), SchedulerError> {
    value
        .trim()
        .split_once(':')
        .and_then(|(h, m)| {
            let hour: u32 = h.trim().parse().ok()?;
            let minute: u32 = m.trim().parse().ok()?;
            (hour < 24 && minute < 60).then_some((hour, minute))
        })
        .ok_or_else(|| SchedulerError::InvalidSchedule(format!("bad clock time in '{original}'")))
}

fn unrecognized(spec: &str) -> SchedulerError {
    SchedulerError::InvalidSchedule(format!("unrecognized schedule format: '{spec}'"))
}

/// Fire times between `last_fired` and now that never ran.
///
/// Used on startup: if the bot was down across a scheduled round, the
/// caller can deliver one catch-up round instead of silently skipping a
/// week.
pub fn missed_runs(
    schedule: &str,
    last_fired: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>, SchedulerError> {
    let expr = normalize_schedule(schedule)?;
    let cron = expr
        .parse::<croner::Cron>()
        .map_err(|e| SchedulerError::InvalidSchedule(e.to_string()))?;

    let now = Utc::now();
    Ok(cron
        .iter_after(last_fired)
        .take_while(|fire| *fire < now)
        .collect())
}

// ---------------------------------------------------------------------------
// PromptScheduler
// ---------------------------------------------------------------------------

/// Owns the single cron job that triggers prompt rounds.
#[derive(Default)]
pub struct PromptScheduler {
    runner: Arc<RwLock<Option<JobScheduler>>>,
    job_id: Arc<RwLock<Option<Uuid>>>,
}

impl PromptScheduler {
    /// Create a scheduler (not yet started).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the round job and start ticking.
    pub async fn start(&self, schedule: &str, callback: PromptCallback) -> Result<(), SchedulerError> {
        let expr = normalize_schedule(schedule)?;

        let runner = JobScheduler::new().await.map_err(job_err)?;

        let trigger = Job::new_async(expr.as_str(), move |_uuid, _lock| {
            let cb = Arc::clone(&callback);
            Box::pin(async move {
                let fired_at = Utc::now();
                tracing::debug!(%fired_at, "prompt trigger fired");
                cb(fired_at).await;
            })
        })
        .map_err(|e| SchedulerError::InvalidSchedule(e.to_string()))?;

        let id = trigger.guid();
        runner.add(trigger).await.map_err(job_err)?;
        runner.start().await.map_err(job_err)?;

        *self.runner.write().await = Some(runner);
        *self.job_id.write().await = Some(id);

        tracing::info!(job_id = %id, cron = %expr, "prompt scheduler started");
        Ok(())
    }

    /// Shut the scheduler down. Safe to call when never started.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let stopped = self.runner.write().await.take();
        if let Some(mut runner) = stopped {
            runner.shutdown().await.map_err(job_err)?;
            tracing::info!("prompt scheduler stopped");
        }
        *self.job_id.write().await = None;
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.runner.read().await.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
