// src/main.rs
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use plancal_lib::{get_config_dir_util, CalendarService, FileSizeStore};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    fs::OpenOptions,
    io,
    path::Path,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

mod app; // Application state
mod ui; // UI rendering logic

use crate::app::App;

const LOG_FILE_NAME: &str = "plancal-tui.log";
const POLL_INTERVAL: Duration = Duration::from_millis(250);

// The terminal owns stdout, so logs go to a file next to the config.
fn init_logging(config_dir: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config_dir.join(LOG_FILE_NAME))
        .context("Failed to open log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let config_dir = get_config_dir_util()?;
    init_logging(&config_dir)?;

    // Initialize the library service
    let service = CalendarService::initialize().context("Failed to initialize calendar")?;
    let sizes = FileSizeStore::in_dir(&config_dir);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run it
    let size = terminal.size()?;
    let mut app = App::new(service, sizes, size.width);
    app.on_terminal_resize(size.width, ui::calendar_area(size));
    let res = run_app(&mut terminal, &mut app);
    app.teardown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "calendar exited with an error");
        eprintln!("Error: {:?}", err); // Print errors to stderr
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.tick(Instant::now());

        terminal.draw(|f| ui::render_ui(f, app))?;

        // Wake early when a throttled scroll evaluation is due.
        let timeout = app
            .windows
            .time_until_scroll_eval(Instant::now())
            .map_or(POLL_INTERVAL, |due| due.min(POLL_INTERVAL));
        if event::poll(timeout)? {
            match event::read()? {
                // Only process key press events
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key_event(key)?,
                Event::Mouse(mouse) => app.handle_mouse_event(mouse)?,
                Event::Resize(width, height) => {
                    let area = Rect::new(0, 0, width, height);
                    app.on_terminal_resize(width, ui::calendar_area(area));
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
