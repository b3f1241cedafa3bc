mod engine;
mod session;

pub use engine::{StopOutcome, TimerEngine};
pub use session::{duration_minutes, local_now, CompletedInterval, TimerState, TimerStatus};
