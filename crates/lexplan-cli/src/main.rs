//! lexplan CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "lexplan", version, about = "Spaced-repetition study planner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one day's study plan and persist progress
    Generate {
        /// Path to the plan JSON file
        #[arg(long)]
        plan: PathBuf,

        /// Path to a catalog JSON file or directory
        #[arg(long)]
        catalog: PathBuf,

        /// Target date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// State directory override
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// Output directory override
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: table, json, all
        #[arg(long, default_value = "table")]
        format: String,

        /// Select without persisting state
        #[arg(long)]
        dry_run: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Preview consecutive days without persisting anything
    Schedule {
        /// Path to the plan JSON file
        #[arg(long)]
        plan: PathBuf,

        /// Path to a catalog JSON file or directory
        #[arg(long)]
        catalog: PathBuf,

        /// First date of the preview; defaults to the plan start
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Number of days to preview
        #[arg(long, default_value = "7")]
        days: u32,

        /// State directory override
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a plan file, optionally against a catalog
    Validate {
        /// Path to the plan JSON file
        #[arg(long)]
        plan: PathBuf,

        /// Path to a catalog JSON file or directory
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Show tracked-memory statistics per category
    Status {
        /// Path to the plan JSON file
        #[arg(long)]
        plan: PathBuf,

        /// Reference date for due counts; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// State directory override
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config, example plan, and example catalog
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lexplan=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            plan,
            catalog,
            date,
            state_dir,
            output,
            format,
            dry_run,
            config,
        } => commands::generate::execute(
            plan, catalog, date, state_dir, output, format, dry_run, config,
        ),
        Commands::Schedule {
            plan,
            catalog,
            from,
            days,
            state_dir,
            config,
        } => commands::schedule::execute(plan, catalog, from, days, state_dir, config),
        Commands::Validate { plan, catalog } => commands::validate::execute(plan, catalog),
        Commands::Status {
            plan,
            date,
            state_dir,
            config,
        } => commands::status::execute(plan, date, state_dir, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
