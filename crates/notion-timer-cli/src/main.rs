use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;
mod exit_code;
mod logging;

#[derive(Parser)]
#[command(
    name = "notion-timer",
    version,
    about = "Minimal Notion-backed timer. Start a session, then stop it to send the elapsed time into your Notion database."
)]
struct Cli {
    /// Notion integration token. If omitted, the NOTION_TOKEN environment variable is used.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Notion database ID that will receive time entries. If omitted, NOTION_DATABASE_ID is used.
    #[arg(long, global = true)]
    database_id: Option<String>,

    /// State file to use instead of the configured one.
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Begin a new timer session
    Start {
        /// Project or category name (maps to the Notion select property)
        project: String,
        /// Specific task name (maps to the Notion title property)
        task: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stop the timer and write the entry to Notion
    Stop {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current timer state
    Status {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop the running timer without writing anything to Notion
    Discard {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let overrides = commands::timer::Overrides {
        token: cli.token,
        database_id: cli.database_id,
        state_file: cli.state_file,
    };

    let result = match cli.command {
        Commands::Start {
            project,
            task,
            json,
        } => commands::timer::start(&overrides, &project, &task, json),
        Commands::Stop { json } => commands::timer::stop(&overrides, json),
        Commands::Status { json } => commands::timer::status(&overrides, json),
        Commands::Discard { json } => commands::timer::discard(&overrides, json),
        Commands::Config { action } => commands::config::run(action),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(exit_code::for_error(&e))
        }
    }
}
