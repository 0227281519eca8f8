// src/cli.rs
use chrono::{Duration, Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan and reschedule workouts on a weekly calendar", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    #[arg(long, global = true)]
    pub export_csv: bool,
}

// Custom parser for date strings and shorthands
pub fn parse_date_shorthand(s: &str) -> Result<NaiveDate, String> {
    let today = Local::now().date_naive();
    match s.to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => Ok(today - Duration::days(1)),
        "tomorrow" => Ok(today + Duration::days(1)),
        _ => {
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(date)
            } else if let Ok(date) = NaiveDate::parse_from_str(s, "%d.%m.%Y") {
                Ok(date)
            } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
                Ok(date)
            } else {
                Err(format!(
                    "Invalid date format: '{}'. Use 'today', 'yesterday', 'tomorrow', YYYY-MM-DD, DD.MM.YYYY, or YYYY/MM/DD.",
                    s
                ))
            }
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a week grid of planned and imported workouts
    Week {
        /// Any day in the first week to show (default: today)
        #[arg(short, long, value_parser = parse_date_shorthand)]
        date: Option<NaiveDate>,
        /// Number of weeks to show
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=52))]
        weeks: u32,
    },
    /// List workouts between two dates (inclusive)
    List {
        /// First day (default: Monday of the current week)
        #[arg(long, value_parser = parse_date_shorthand)]
        from: Option<NaiveDate>,
        /// Last day (default: four weeks after --from)
        #[arg(long, value_parser = parse_date_shorthand)]
        to: Option<NaiveDate>,
    },
    /// Plan a new workout
    Add {
        /// Day of the workout
        #[arg(short, long, value_parser = parse_date_shorthand)]
        date: NaiveDate,
        /// Short description (required, max 150 characters)
        #[arg(short = 's', long)]
        description: String,
        #[arg(long)]
        warmup: Option<String>,
        #[arg(long)]
        main: Option<String>,
        #[arg(long)]
        cooldown: Option<String>,
        #[arg(short, long)]
        terrain: Option<String>,
        /// Distance in km
        #[arg(long)]
        distance: Option<f64>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Edit a planned workout; omitted fields keep their value
    Edit {
        /// ID of the workout to edit
        id: i64,
        #[arg(short = 's', long)]
        description: Option<String>,
        #[arg(long)]
        warmup: Option<String>,
        #[arg(long)]
        main: Option<String>,
        #[arg(long)]
        cooldown: Option<String>,
        #[arg(short, long)]
        terrain: Option<String>,
        #[arg(long)]
        distance: Option<f64>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Reschedule a planned workout to another day
    Move {
        /// ID of the workout to move
        id: i64,
        /// New day
        #[arg(long, value_parser = parse_date_shorthand)]
        to: NaiveDate,
    },
    /// Delete a planned workout
    Delete {
        /// ID of the workout to delete
        id: i64,
    },
    GenerateCompletion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
