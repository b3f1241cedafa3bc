//! Process exit codes, one per failure class callers need to tell apart.
//!
//! 2 is left to clap for usage errors.

use notion_timer_core::{ConfigError, CoreError};

pub const FAILURE: u8 = 1;
pub const ALREADY_RUNNING: u8 = 3;
pub const NOT_RUNNING: u8 = 4;
pub const MISSING_CONFIG: u8 = 5;
pub const SUBMISSION_FAILED: u8 = 6;
pub const CORRUPT_STATE: u8 = 7;
pub const VALIDATION: u8 = 8;
pub const RECORDED_NOT_CLEARED: u8 = 9;

pub fn for_error(err: &CoreError) -> u8 {
    match err {
        CoreError::Validation(_) => VALIDATION,
        CoreError::AlreadyRunning { .. } => ALREADY_RUNNING,
        CoreError::NotRunning => NOT_RUNNING,
        CoreError::Config(ConfigError::Missing { .. }) => MISSING_CONFIG,
        CoreError::Submission(_) => SUBMISSION_FAILED,
        CoreError::CorruptState { .. } => CORRUPT_STATE,
        CoreError::ClearFailed { .. } => RECORDED_NOT_CLEARED,
        CoreError::Config(_) | CoreError::Io(_) | CoreError::Json(_) => FAILURE,
    }
}
