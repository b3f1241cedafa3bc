//! Timer engine implementation.
//!
//! A two-state machine over an injected [`StateStore`]. The engine keeps no
//! state of its own: "running" means the store holds a `TimerState`, so a
//! later process resumes whatever an earlier one started.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --stop (submit ok, then clear)--> Idle
//! ```
//!
//! `stop` clears local state only after the remote write is confirmed; a
//! failed submission leaves the timer running from its first start.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::session::{local_now, CompletedInterval, TimerState, TimerStatus};
use crate::error::{ConfigError, CoreError, Result};
use crate::integrations::{RecordSubmitter, RemoteRecordId};
use crate::storage::{Credentials, StateStore};

/// What a successful `stop` produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopOutcome {
    pub interval: CompletedInterval,
    pub record_id: RemoteRecordId,
}

/// Core timer engine.
#[derive(Debug)]
pub struct TimerEngine<S> {
    store: S,
}

impl<S: StateStore> TimerEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a timer now. See [`TimerEngine::start_at`].
    pub fn start(&self, project: &str, task: &str) -> Result<TimerState> {
        self.start_at(project, task, local_now())
    }

    /// Start a timer at `now`.
    ///
    /// # Errors
    /// `Validation` for blank labels, `AlreadyRunning` if a timer exists
    /// (the existing one is kept), `CorruptState` if the stored state cannot
    /// be read.
    pub fn start_at(
        &self,
        project: &str,
        task: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<TimerState> {
        let state = TimerState::new(project, task, now)?;

        if let Some(existing) = self.store.read()? {
            return Err(CoreError::AlreadyRunning {
                project: existing.project,
                task: existing.task,
                started_at: existing.started_at,
            });
        }

        // The store re-checks atomically; a concurrent start still loses here.
        self.store.write(&state)?;
        tracing::debug!(project = %state.project, task = %state.task, started_at = %state.started_at, "timer started");
        Ok(state)
    }

    /// Stop the running timer now. See [`TimerEngine::stop_at`].
    pub fn stop<R, F>(&self, submitter: &R, resolve_credentials: F) -> Result<StopOutcome>
    where
        R: RecordSubmitter + ?Sized,
        F: FnOnce() -> Result<Credentials, ConfigError>,
    {
        self.stop_at(submitter, resolve_credentials, local_now())
    }

    /// Stop the running timer at `now` with an already built submitter.
    ///
    /// Credentials are only resolved once a timer is known to be running.
    /// See [`TimerEngine::stop_with_at`] for the full contract.
    pub fn stop_at<R, F>(
        &self,
        submitter: &R,
        resolve_credentials: F,
        now: DateTime<FixedOffset>,
    ) -> Result<StopOutcome>
    where
        R: RecordSubmitter + ?Sized,
        F: FnOnce() -> Result<Credentials, ConfigError>,
    {
        self.stop_with_at(|| Ok((submitter, resolve_credentials()?)), now)
    }

    /// Stop the running timer now. See [`TimerEngine::stop_with_at`].
    pub fn stop_with<R, F>(&self, connect: F) -> Result<StopOutcome>
    where
        R: RecordSubmitter,
        F: FnOnce() -> Result<(R, Credentials)>,
    {
        self.stop_with_at(connect, local_now())
    }

    /// Stop the running timer at `now` and submit the interval.
    ///
    /// Order: read state, `connect` (build the submitter, resolve
    /// credentials), submit, clear. `connect` only runs once a timer is known
    /// to be running, and nothing is cleared unless the submission succeeded.
    ///
    /// # Errors
    /// `NotRunning` when idle (`connect` is not called), whatever `connect`
    /// returns (e.g. `Config` for missing credentials), `Submission` when the
    /// remote write fails. In those cases the stored state is unchanged.
    ///
    /// `ClearFailed` when the record was created but the state could not be
    /// removed; it carries the record id and must not be retried with `stop`.
    pub fn stop_with_at<R, F>(&self, connect: F, now: DateTime<FixedOffset>) -> Result<StopOutcome>
    where
        R: RecordSubmitter,
        F: FnOnce() -> Result<(R, Credentials)>,
    {
        let state = self.store.read()?.ok_or(CoreError::NotRunning)?;
        let (submitter, credentials) = connect()?;

        let interval = state.complete_at(now);
        let record_id = submitter.submit(&interval, &credentials)?;

        if let Err(source) = self.store.clear() {
            tracing::error!(record_id = %record_id, error = %source, "record created but timer state not cleared");
            return Err(CoreError::ClearFailed {
                record_id,
                interval,
                source: Box::new(source),
            });
        }
        tracing::debug!(
            project = %interval.project,
            task = %interval.task,
            duration_minutes = interval.duration_minutes,
            "timer stopped"
        );
        Ok(StopOutcome {
            interval,
            record_id,
        })
    }

    /// Drop the running timer without submitting anything.
    ///
    /// Returns the discarded state, or `None` if the stored state was corrupt
    /// (it is removed either way).
    ///
    /// # Errors
    /// `NotRunning` when idle.
    pub fn discard(&self) -> Result<Option<TimerState>> {
        let discarded = match self.store.read() {
            Ok(Some(state)) => Some(state),
            Ok(None) => return Err(CoreError::NotRunning),
            Err(CoreError::CorruptState { .. }) => None,
            Err(e) => return Err(e),
        };
        self.store.clear()?;
        tracing::debug!(had_state = discarded.is_some(), "timer discarded");
        Ok(discarded)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current status now. See [`TimerEngine::status_at`].
    pub fn status(&self) -> Result<TimerStatus> {
        self.status_at(local_now())
    }

    /// Current status, with elapsed time measured up to `now`.
    pub fn status_at(&self, now: DateTime<FixedOffset>) -> Result<TimerStatus> {
        Ok(match self.store.read()? {
            None => TimerStatus::Idle,
            Some(state) => {
                let elapsed = state.elapsed_at(now);
                TimerStatus::Running { state, elapsed }
            }
        })
    }
}
