use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod import_cmd;
mod plan_cmd;
mod score_cmd;
mod state;
mod task_cmd;
mod train_cmd;

use config::{init_config, load_config};
use score_cmd::ScoreCommand;
use task_cmd::TaskCommand;

#[derive(Parser, Debug)]
#[command(
    name = "dayflow",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("DAYFLOW_BUILD_SHA"), ")"),
    about = "Energy-aware day planner"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.dayflow/config.toml and an empty snapshot
    Init,

    /// Lay out a day's backlog into availability windows
    Plan {
        /// Snapshot JSON (default: ~/.dayflow/snapshot.json)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Day to plan, YYYY-MM-DD (default: today in the configured timezone)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Suggest the best slot for one task, with an explanation
    Recommend {
        #[arg(long)]
        input: Option<PathBuf>,

        /// Task id from the snapshot
        #[arg(long)]
        task: String,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value_t = false)]
        json: bool,

        /// Keep the result in the snapshot so it can be accepted or rejected
        #[arg(long, default_value_t = false)]
        save: bool,
    },

    /// Update tasks and log work sessions
    Task {
        #[arg(long)]
        input: Option<PathBuf>,

        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Productivity scores and burnout forecast
    Score {
        #[arg(long)]
        input: Option<PathBuf>,

        #[command(subcommand)]
        command: ScoreCommand,
    },

    /// Fit the focus model on recorded executions
    Train {
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Build or extend a snapshot from CSV exports
    ImportCsv {
        /// id,title,priority,energy,duration,due,status,postpone_count
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// day,range,active
        #[arg(long)]
        availability: Option<PathBuf>,

        /// task_id,started_at,ended_at,energy,focus
        #[arg(long)]
        executions: Option<PathBuf>,

        /// Snapshot to write; merged into when it already exists
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cfg.general.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Init => {
            let (path, created) = init_config()?;
            if created {
                println!("Wrote {}", path.display());
            } else {
                println!("Config already exists: {}", path.display());
            }
            let snapshot = state::snapshot_path()?;
            if !snapshot.exists() {
                dayflow_ingest::save_snapshot(&snapshot, &dayflow_ingest::Snapshot::default())
                    .with_context(|| format!("creating {}", snapshot.display()))?;
                println!("Wrote {}", snapshot.display());
            }
        }

        Command::Plan { input, date, json } => {
            let today = cfg.today()?;
            plan_cmd::run_plan(&cfg, input, date.unwrap_or(today), today, json)?;
        }

        Command::Recommend {
            input,
            task,
            date,
            json,
            save,
        } => {
            let date = match date {
                Some(d) => d,
                None => cfg.today()?,
            };
            plan_cmd::run_recommend(&cfg, input, &task, date, json, save)?;
        }

        Command::Task { input, command } => {
            task_cmd::run(&cfg, input, command)?;
        }

        Command::Score { input, command } => {
            score_cmd::run(&cfg, input, command)?;
        }

        Command::Train { input } => {
            train_cmd::run(&cfg, input)?;
        }

        Command::ImportCsv {
            tasks,
            availability,
            executions,
            out,
        } => {
            import_cmd::run(tasks, availability, executions, out)?;
        }
    }

    Ok(())
}
