use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use notion_timer_core::error::Result;
use notion_timer_core::timer::local_now;
use notion_timer_core::{
    Config, Credentials, Event, FileStateStore, NotionSubmitter, TimerEngine, TimerStatus,
};

/// Values given on the command line that win over config and environment.
pub struct Overrides {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub state_file: Option<PathBuf>,
}

fn open_engine(config: &Config, overrides: &Overrides) -> TimerEngine<FileStateStore> {
    let path = config.state_file_path(overrides.state_file.as_deref());
    tracing::debug!(path = %path.display(), "using state file");
    TimerEngine::new(FileStateStore::new(path))
}

fn print_json(event: &Event) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

fn fmt_time(at: &DateTime<FixedOffset>) -> String {
    at.format("%Y-%m-%d %H:%M:%S %:z").to_string()
}

pub fn start(overrides: &Overrides, project: &str, task: &str, json: bool) -> Result<()> {
    let config = Config::load()?;
    let engine = open_engine(&config, overrides);
    let state = engine.start(project, task)?;

    if json {
        return print_json(&Event::started(&state));
    }
    println!(
        "Started '{}' / '{}' at {}",
        state.project,
        state.task,
        fmt_time(&state.started_at)
    );
    Ok(())
}

pub fn stop(overrides: &Overrides, json: bool) -> Result<()> {
    // With --state-file the config is not needed to find the timer, so it is
    // read only after a running timer has been found.
    let (engine, config) = match overrides.state_file.as_deref() {
        Some(path) => (TimerEngine::new(FileStateStore::new(path)), None),
        None => {
            let config = Config::load()?;
            (open_engine(&config, overrides), Some(config))
        }
    };

    let outcome = engine.stop_with(|| {
        let credentials =
            Credentials::resolve(overrides.token.as_deref(), overrides.database_id.as_deref())?;
        let config = match config {
            Some(config) => config,
            None => Config::load()?,
        };
        Ok((NotionSubmitter::new(&config.notion)?, credentials))
    })?;

    if json {
        return print_json(&Event::stopped(&outcome));
    }
    let interval = &outcome.interval;
    println!(
        "Recorded '{}' / '{}' for {:.2} minutes. Entry stored in Notion.",
        interval.project, interval.task, interval.duration_minutes
    );
    Ok(())
}

pub fn status(overrides: &Overrides, json: bool) -> Result<()> {
    let config = Config::load()?;
    let engine = open_engine(&config, overrides);
    let now = local_now();
    let status = engine.status_at(now)?;

    if json {
        return print_json(&Event::snapshot(&status, now));
    }
    match status {
        TimerStatus::Idle => println!("No active session."),
        TimerStatus::Running { state, elapsed } => println!(
            "Running: project='{}', task='{}', started at {} ({:.2} minutes elapsed)",
            state.project,
            state.task,
            fmt_time(&state.started_at),
            notion_timer_core::timer::duration_minutes(elapsed)
        ),
    }
    Ok(())
}

pub fn discard(overrides: &Overrides, json: bool) -> Result<()> {
    let config = Config::load()?;
    let engine = open_engine(&config, overrides);
    let discarded = engine.discard()?;

    if json {
        return print_json(&Event::discarded(discarded.as_ref()));
    }
    match discarded {
        Some(state) => println!(
            "Discarded '{}' / '{}' started at {}. Nothing was written to Notion.",
            state.project,
            state.task,
            fmt_time(&state.started_at)
        ),
        None => println!(
            "Removed unreadable state file {}.",
            engine.store().path().display()
        ),
    }
    Ok(())
}
