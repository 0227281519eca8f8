//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use plancal_lib::{
    format_calendar_date, monday_of, parse_color, CalendarService, DateWindow, DropOutcome,
    EntryKind, PlanRecord, ServiceError, StandardColor, WorkoutEntry, WorkoutStore,
};
use std::io::{self, stdout};
use tracing_subscriber::EnvFilter;

/// Default span of `list` when `--to` is omitted.
const DEFAULT_LIST_DAYS: i64 = 27;

type Service = CalendarService<Box<dyn WorkoutStore>>;

fn main() -> Result<()> {
    // --- Check for completion generation request FIRST ---
    let cli_args = cli::parse_args(); // Parse arguments once
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command(); // Get the command structure
        let bin_name = cmd.get_name().to_string(); // Get the binary name

        eprintln!("Generating completion script for {}...", shell); // Print to stderr
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout()); // Print script to stdout
        return Ok(()); // Exit after generating script
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    // Loads config, connects the configured store
    let mut service: Service =
        CalendarService::initialize().context("Failed to initialize calendar service")?;
    service.reload().context("Failed to load workouts")?;

    let header_color = to_comfy_color(
        parse_color(&service.config.theme.header_color).unwrap_or(StandardColor::Green),
    );
    let today = Local::now().date_naive();

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            // This case is handled above, but keep it exhaustive
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Week { date, weeks } => {
            let window = DateWindow::initialize(date.unwrap_or(today), 0, weeks - 1);
            print_week_table(&service, &window, today, header_color);
        }
        cli::Commands::List { from, to } => {
            let from = from.unwrap_or_else(|| monday_of(today));
            let to = to.unwrap_or(from + Duration::days(DEFAULT_LIST_DAYS));
            if to < from {
                bail!("--to ({}) is before --from ({})", to, from);
            }
            let entries: Vec<WorkoutEntry> = service
                .index()
                .entries_between(from, to)
                .into_iter()
                .cloned()
                .collect();
            if export_csv {
                print_entries_csv(&entries)?;
            } else if entries.is_empty() {
                println!("No workouts between {} and {}.", from, to);
            } else {
                print_entries_table(&entries, header_color);
            }
        }
        cli::Commands::Add {
            date,
            description,
            warmup,
            main,
            cooldown,
            terrain,
            distance,
            notes,
        } => {
            let record = PlanRecord {
                id: None,
                date: format_calendar_date(date),
                kind: None,
                description: Some(description),
                warmup_target: warmup,
                main_target: main,
                cooldown_target: cooldown,
                terrain,
                notes,
                distance,
            };
            match settle_write(service.create_plan(record))? {
                Some(id) => println!("Planned workout on {} (ID: {})", date, id),
                None => println!("Planned workout on {}", date),
            }
        }
        cli::Commands::Edit {
            id,
            description,
            warmup,
            main,
            cooldown,
            terrain,
            distance,
            notes,
        } => {
            let Some(entry) = service.index().find(id) else {
                bail!("Workout ID {} not found.", id);
            };
            let mut record = entry.to_record();
            if description.is_some() {
                record.description = description;
            }
            if warmup.is_some() {
                record.warmup_target = warmup;
            }
            if main.is_some() {
                record.main_target = main;
            }
            if cooldown.is_some() {
                record.cooldown_target = cooldown;
            }
            if terrain.is_some() {
                record.terrain = terrain;
            }
            if distance.is_some() {
                record.distance = distance;
            }
            if notes.is_some() {
                record.notes = notes;
            }
            settle_write(service.update_plan(id, record))?;
            println!("Successfully updated workout ID {}", id);
        }
        cli::Commands::Move { id, to } => match settle_write(service.move_entry(id, to))? {
            Some(DropOutcome::Unchanged) => println!("Workout ID {} is already on {}.", id, to),
            Some(DropOutcome::Ignored) => println!("Nothing to move."),
            Some(DropOutcome::Moved { id, to }) => println!("Moved workout ID {} to {}", id, to),
            None => println!("Moved workout ID {} to {}", id, to),
        },
        cli::Commands::Delete { id } => {
            settle_write(service.delete_plan(id))?;
            println!("Successfully deleted workout ID {}", id);
        }
    }

    service.teardown();
    Ok(())
}

/// A one-shot command has nothing to refresh, so a failed post-write reload is only a warning.
fn settle_write<T>(result: Result<T, ServiceError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ServiceError::ReloadFailed(e)) => {
            tracing::warn!(error = %e, "write succeeded but reload failed");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn to_comfy_color(color: StandardColor) -> Color {
    match color {
        StandardColor::Black => Color::Black,
        StandardColor::Red => Color::Red,
        StandardColor::Green => Color::Green,
        StandardColor::Yellow => Color::Yellow,
        StandardColor::Blue => Color::Blue,
        StandardColor::Magenta => Color::Magenta,
        StandardColor::Cyan => Color::Cyan,
        StandardColor::White => Color::White,
        StandardColor::DarkGrey => Color::DarkGrey,
        StandardColor::DarkRed => Color::DarkRed,
        StandardColor::DarkGreen => Color::DarkGreen,
        StandardColor::DarkYellow => Color::DarkYellow,
        StandardColor::DarkBlue => Color::DarkBlue,
        StandardColor::DarkMagenta => Color::DarkMagenta,
        StandardColor::DarkCyan => Color::DarkCyan,
        StandardColor::Grey => Color::Grey,
    }
}

fn entry_line(entry: &WorkoutEntry) -> String {
    match (entry.kind, entry.id) {
        (EntryKind::Planned, Some(id)) => format!("#{} {}", id, entry.display_description()),
        (EntryKind::Planned, None) => entry.display_description().to_string(),
        (EntryKind::Imported, _) => format!("~ {}", entry.display_description()),
    }
}

/// Prints one table row per week with a cell per day.
fn print_week_table(service: &Service, window: &DateWindow, today: NaiveDate, header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
                .into_iter()
                .map(|day| Cell::new(day).fg(header_color)),
        );

    for week in window.week_rows() {
        table.add_row(week.iter().map(|date| {
            let mut lines = vec![date.format("%d %b").to_string()];
            lines.extend(service.lookup(*date).entries().map(entry_line));
            let cell = Cell::new(lines.join("\n"));
            if *date == today {
                cell.add_attribute(Attribute::Bold).fg(Color::Cyan)
            } else {
                cell
            }
        }));
    }
    println!("{table}");
    println!("#ID = planned (editable), ~ = imported (read-only)");
}

/// Prints workout entries in a formatted table.
fn print_entries_table(entries: &[WorkoutEntry], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Date").fg(header_color),
            Cell::new("Type").fg(header_color),
            Cell::new("Description").fg(header_color),
            Cell::new("Warmup / Main / Cooldown").fg(header_color),
            Cell::new("Terrain").fg(header_color),
            Cell::new("Distance (km)").fg(header_color),
            Cell::new("Notes").fg(header_color),
        ]);

    for entry in entries {
        let targets = [
            entry.targets.warmup.as_deref(),
            entry.targets.main.as_deref(),
            entry.targets.cooldown.as_deref(),
        ]
        .map(|t| t.unwrap_or("-"))
        .join(" / ");
        table.add_row(vec![
            Cell::new(entry.id.map_or("-".to_string(), |v| v.to_string())),
            Cell::new(entry.date.format("%a %Y-%m-%d").to_string()),
            Cell::new(entry.kind.to_string()),
            Cell::new(entry.display_description()),
            Cell::new(targets),
            Cell::new(entry.terrain.as_deref().unwrap_or("-")),
            Cell::new(entry.distance.map_or("-".to_string(), |v| format!("{:.2}", v))),
            Cell::new(entry.notes.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

fn print_entries_csv(entries: &[WorkoutEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());

    // Write header
    writer.write_record([
        "ID",
        "Date",
        "Type",
        "Description",
        "Warmup",
        "Main",
        "Cooldown",
        "Terrain",
        "Distance_km",
        "Notes",
    ])?;

    for entry in entries {
        writer.write_record(&[
            entry.id.map_or(String::new(), |v| v.to_string()),
            format_calendar_date(entry.date),
            entry.kind.to_string(),
            entry.description.clone(),
            entry.targets.warmup.clone().unwrap_or_default(),
            entry.targets.main.clone().unwrap_or_default(),
            entry.targets.cooldown.clone().unwrap_or_default(),
            entry.terrain.clone().unwrap_or_default(),
            entry.distance.map_or(String::new(), |v| format!("{:.2}", v)),
            entry.notes.clone().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
