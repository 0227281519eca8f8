// src/ui/layout.rs
use crate::{
    app::{ActiveModal, App},
    ui::{calendar::render_calendar, modals::render_modal, status_bar::render_status_bar},
};
use plancal_lib::{parse_color, StandardColor};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::rc::Rc;

fn main_chunks(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Calendar
            Constraint::Length(1), // Status Bar
        ])
        .split(area)
}

/// Area the calendar grid occupies for a terminal of `area`.
pub fn calendar_area(area: Rect) -> Rect {
    main_chunks(area)[1]
}

// Main UI rendering function
pub fn render_ui(f: &mut Frame, app: &mut App) {
    let chunks = main_chunks(f.size());

    app.hit_map.clear();
    app.hit_map.calendar = chunks[1];

    render_header(f, app, chunks[0]);
    render_calendar(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);

    // Render modal last if active
    if app.active_modal != ActiveModal::None {
        render_modal(f, app);
    }
}

pub fn to_ratatui_color(color: StandardColor) -> Color {
    match color {
        StandardColor::Black => Color::Black,
        StandardColor::Red => Color::LightRed,
        StandardColor::Green => Color::LightGreen,
        StandardColor::Yellow => Color::LightYellow,
        StandardColor::Blue => Color::LightBlue,
        StandardColor::Magenta => Color::LightMagenta,
        StandardColor::Cyan => Color::LightCyan,
        StandardColor::White => Color::White,
        StandardColor::DarkGrey => Color::DarkGray,
        StandardColor::DarkRed => Color::Red,
        StandardColor::DarkGreen => Color::Green,
        StandardColor::DarkYellow => Color::Yellow,
        StandardColor::DarkBlue => Color::Blue,
        StandardColor::DarkMagenta => Color::Magenta,
        StandardColor::DarkCyan => Color::Cyan,
        StandardColor::Grey => Color::Gray,
    }
}

fn header_color(app: &App) -> Color {
    parse_color(&app.service.config.theme.header_color)
        .map(to_ratatui_color)
        .unwrap_or(Color::Green)
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let window = app.windows.window();
    let mut spans = vec![
        Span::styled(
            format!(
                " {} to {} ",
                window.first().format("%d %b %Y"),
                window.last().format("%d %b %Y")
            ),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "| Selected: {} ",
            app.selected_date.format("%a %d %b %Y")
        )),
    ];
    if app.drag.is_dragging() {
        spans.push(Span::styled(
            " MOVING: pick a day and press Enter ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }

    let block = Block::default()
        .title(" Training Calendar ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(header_color(app)));
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Helper function to create a centered rectangle for modals
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
