//! # notion-timer Core Library
//!
//! This library provides the core logic for a single-user time tracker that
//! records finished sessions as rows of a Notion database. Front-ends (the
//! `notion-timer` CLI) are thin callers over the same core.
//!
//! ## Architecture
//!
//! - **State store**: one durable slot holding the running timer, shared
//!   across process invocations
//! - **Timer Engine**: the Idle/Running state machine over the store
//! - **Integrations**: the record submitter that turns a finished interval
//!   into one Notion create-page call
//! - **Storage**: TOML configuration and credential resolution
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`StateStore`]: Persistence seam, with [`FileStateStore`] and [`MemoryStateStore`]
//! - [`RecordSubmitter`]: Remote write seam, implemented by [`NotionSubmitter`]
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod integrations;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, SubmissionError, ValidationError};
pub use events::Event;
pub use integrations::{NotionSubmitter, RecordSubmitter, RemoteRecordId};
pub use storage::{Config, Credentials, FileStateStore, MemoryStateStore, StateStore};
pub use timer::{CompletedInterval, StopOutcome, TimerEngine, TimerState, TimerStatus};
