use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::integrations::RemoteRecordId;
use crate::timer::{duration_minutes, StopOutcome, TimerState, TimerStatus};

/// Every command result has a machine-readable Event.
/// Front-ends print these as JSON when asked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        project: String,
        task: String,
        started_at: DateTime<FixedOffset>,
    },
    StateSnapshot {
        running: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        started_at: Option<DateTime<FixedOffset>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        elapsed_minutes: Option<f64>,
        at: DateTime<FixedOffset>,
    },
    TimerStopped {
        project: String,
        task: String,
        started_at: DateTime<FixedOffset>,
        ended_at: DateTime<FixedOffset>,
        duration_minutes: f64,
        record_id: RemoteRecordId,
    },
    /// The running timer was dropped without a record. Fields are absent
    /// when the discarded state file was unreadable.
    TimerDiscarded {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        started_at: Option<DateTime<FixedOffset>>,
    },
}

impl Event {
    pub fn started(state: &TimerState) -> Self {
        Event::TimerStarted {
            project: state.project.clone(),
            task: state.task.clone(),
            started_at: state.started_at,
        }
    }

    pub fn snapshot(status: &TimerStatus, at: DateTime<FixedOffset>) -> Self {
        match status {
            TimerStatus::Idle => Event::StateSnapshot {
                running: false,
                project: None,
                task: None,
                started_at: None,
                elapsed_minutes: None,
                at,
            },
            TimerStatus::Running { state, elapsed } => Event::StateSnapshot {
                running: true,
                project: Some(state.project.clone()),
                task: Some(state.task.clone()),
                started_at: Some(state.started_at),
                elapsed_minutes: Some(duration_minutes(*elapsed)),
                at,
            },
        }
    }

    pub fn stopped(outcome: &StopOutcome) -> Self {
        let interval = &outcome.interval;
        Event::TimerStopped {
            project: interval.project.clone(),
            task: interval.task.clone(),
            started_at: interval.started_at,
            ended_at: interval.ended_at,
            duration_minutes: interval.duration_minutes,
            record_id: outcome.record_id.clone(),
        }
    }

    pub fn discarded(state: Option<&TimerState>) -> Self {
        Event::TimerDiscarded {
            project: state.map(|s| s.project.clone()),
            task: state.map(|s| s.task.clone()),
            started_at: state.map(|s| s.started_at),
        }
    }
}
