//! attendwise CLI — attendance ratios, forecasts and today's status.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use attendwise_core::{AttendanceError, ProjectionMode, UpstreamError};

mod commands;

#[derive(Parser)]
#[command(name = "attendwise", version, about = "Attendance forecasting for students")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Percentage, risk band and lectures to spare for one course
    Ratio {
        /// Lectures attended
        #[arg(long)]
        present: u32,

        /// Lectures held
        #[arg(long)]
        total: u32,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Project every course's attendance to a future date
    Project {
        /// Target date (DD/MM/YYYY or YYYY-MM-DD)
        #[arg(long)]
        target: String,

        /// Projection mode: none, uniform
        #[arg(long)]
        mode: Option<ProjectionMode>,

        /// Planned absence, DATE or DATE@COURSE_ID (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Read portal data from a JSON snapshot
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Treat this date as today
        #[arg(long)]
        today: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show today's status for every course
    Today {
        /// Read portal data from a JSON snapshot
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Treat this instant as now (DD/MM/YYYY HH:MM)
        #[arg(long)]
        now: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create a starter attendwise.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("attendwise=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ratio {
            present,
            total,
            json,
        } => commands::ratio::execute(present, total, json),
        Commands::Project {
            target,
            mode,
            exclude,
            snapshot,
            config,
            today,
            json,
        } => {
            commands::project::execute(target, mode, exclude, snapshot, config, today, json).await
        }
        Commands::Today {
            snapshot,
            config,
            now,
            json,
        } => commands::today::execute(snapshot, config, now, json).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        if authorization_expired(&e) {
            eprintln!("Your portal session has expired. Log in again and update ATTENDWISE_TOKEN.");
        }
        process::exit(1);
    }
}

fn authorization_expired(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<AttendanceError>()
            .is_some_and(AttendanceError::is_authorization_expired)
            || cause
                .downcast_ref::<UpstreamError>()
                .is_some_and(UpstreamError::is_authorization_expired)
    })
}
