mod commands;
mod config;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    ProfileUpdate, cmd_add, cmd_close_day, cmd_delete, cmd_history, cmd_list, cmd_profile_set,
    cmd_profile_show, cmd_reset, cmd_summary, cmd_target_clear, cmd_target_set, cmd_target_show,
    report_unsaved,
};
use crate::config::Config;
use macrolog_core::rollover::RolloverOutcome;
use macrolog_core::storage::SqliteStore;
use macrolog_core::store::StateStore;

#[derive(Parser)]
#[command(
    name = "macrolog",
    version,
    about = "A simple daily nutrition tracker",
    long_about = "Log what you eat today, watch your totals against your targets, \
                  and keep a history of past days. A new day starts automatically \
                  the first time you run macrolog after midnight."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a food for today
    Add {
        /// Food name
        name: String,
        /// Calories (kcal)
        #[arg(short, long, default_value = "0")]
        calories: f64,
        /// Protein (g)
        #[arg(short, long, default_value = "0")]
        protein: f64,
        /// Carbohydrates (g)
        #[arg(long, default_value = "0")]
        carbs: f64,
        /// Fat (g)
        #[arg(short, long, default_value = "0")]
        fat: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List today's foods
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a food by its number in `list`
    Delete {
        /// Entry number as shown by `list`
        number: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show today's totals and progress toward targets
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show archived days, newest first
    History {
        /// Show at most this many days
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move today's foods into history and start a new day
    CloseDay {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Erase ALL data
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage body metrics used to estimate RMR and TDEE
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Manage the daily calorie goal and macro split
    Target {
        #[command(subcommand)]
        command: TargetCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Update body metrics (omitted fields keep their value)
    Set {
        /// male or female
        #[arg(long)]
        sex: Option<String>,
        /// Age in years
        #[arg(long)]
        age: Option<f64>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
        /// Activity: sedentary, light, moderate, very, extra
        #[arg(long)]
        activity: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show body metrics and energy estimates
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TargetCommands {
    /// Set the daily calorie goal and optional macro split
    Set {
        /// Daily calorie goal
        calories: f64,
        /// Protein percentage (requires --carbs and --fat, must sum to 100)
        #[arg(long)]
        protein: Option<i64>,
        /// Carbs percentage (requires --protein and --fat, must sum to 100)
        #[arg(long)]
        carbs: Option<i64>,
        /// Fat percentage (requires --protein and --carbs, must sum to 100)
        #[arg(long)]
        fat: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current targets
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear all targets
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    debug!(data_dir = %config.data_dir.display(), "using data directory");

    let today = Local::now().date_naive();
    let backend = SqliteStore::open(&config.db_path)?;
    let mut store = StateStore::initialize(backend, today)?;

    match store.check_and_rollover_on_load(today) {
        Ok(RolloverOutcome::Archived(record)) => {
            let date = record.date;
            let count = record.meal_count;
            eprintln!("New day: {date} ({count} items) moved to history");
        }
        Ok(_) => {}
        Err(e) => report_unsaved(&e),
    }

    match cli.command {
        Commands::Add {
            name,
            calories,
            protein,
            carbs,
            fat,
            json,
        } => cmd_add(&mut store, &name, calories, protein, carbs, fat, today, json),
        Commands::List { json } => cmd_list(&store, json),
        Commands::Delete { number, json } => cmd_delete(&mut store, number, json),
        Commands::Summary { json } => cmd_summary(&store, json),
        Commands::History { limit, json } => cmd_history(&store, limit, json),
        Commands::CloseDay { json } => cmd_close_day(&mut store, today, json),
        Commands::Reset { yes, json } => cmd_reset(&mut store, today, yes, json),
        Commands::Profile { command } => match command {
            ProfileCommands::Set {
                sex,
                age,
                weight,
                height,
                activity,
                json,
            } => cmd_profile_set(
                &mut store,
                ProfileUpdate {
                    sex,
                    age,
                    weight,
                    height,
                    activity,
                },
                json,
            ),
            ProfileCommands::Show { json } => cmd_profile_show(&store, json),
        },
        Commands::Target { command } => match command {
            TargetCommands::Set {
                calories,
                protein,
                carbs,
                fat,
                json,
            } => cmd_target_set(&mut store, calories, protein, carbs, fat, json),
            TargetCommands::Show { json } => cmd_target_show(&store, json),
            TargetCommands::Clear { json } => cmd_target_clear(&mut store, json),
        },
    }
}
