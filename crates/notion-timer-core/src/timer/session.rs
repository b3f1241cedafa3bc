use chrono::{DateTime, Duration, FixedOffset, Local};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The persisted record of an in-progress session.
///
/// Serialized as `{"project", "task", "start"}` so the state file stays
/// readable (and deletable) by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub project: String,
    pub task: String,
    #[serde(rename = "start")]
    pub started_at: DateTime<FixedOffset>,
}

impl TimerState {
    /// Build a state from user input, trimming both labels.
    ///
    /// # Errors
    /// Returns `ValidationError::EmptyField` if either label is blank.
    pub fn new(
        project: &str,
        task: &str,
        started_at: DateTime<FixedOffset>,
    ) -> Result<Self, ValidationError> {
        let project = non_empty("project", project)?;
        let task = non_empty("task", task)?;
        Ok(Self {
            project,
            task,
            started_at,
        })
    }

    /// Time since `started_at`, never negative.
    pub fn elapsed_at(&self, now: DateTime<FixedOffset>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }

    /// Close the session at `now`.
    ///
    /// A wall clock that moved backwards is clamped to `started_at`.
    pub fn complete_at(&self, now: DateTime<FixedOffset>) -> CompletedInterval {
        let ended_at = now.max(self.started_at);
        CompletedInterval {
            project: self.project.clone(),
            task: self.task.clone(),
            started_at: self.started_at,
            ended_at,
            duration_minutes: duration_minutes(ended_at - self.started_at),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        non_empty("project", &self.project)?;
        non_empty("task", &self.task)?;
        Ok(())
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

/// Start/end/duration triple produced at stop time. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedInterval {
    pub project: String,
    pub task: String,
    pub started_at: DateTime<FixedOffset>,
    pub ended_at: DateTime<FixedOffset>,
    pub duration_minutes: f64,
}

/// Result of `status`.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerStatus {
    Idle,
    Running { state: TimerState, elapsed: Duration },
}

impl TimerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, TimerStatus::Running { .. })
    }
}

/// Wall-clock now in local time, keeping the offset.
pub fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Minutes in `elapsed`, rounded half away from zero to two decimals.
pub fn duration_minutes(elapsed: Duration) -> f64 {
    let millis = elapsed.num_milliseconds().max(0) as f64;
    round2(millis / 60_000.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
