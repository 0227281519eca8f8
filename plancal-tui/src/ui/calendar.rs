// src/ui/calendar.rs
use crate::app::App;
use chrono::{Datelike, NaiveDate};
use plancal_lib::{DragState, EntryKind, WorkoutEntry};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Terminal lines per week row, borders included.
const WEEK_ROW_HEIGHT: u16 = 6;
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn day_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(area)
}

pub fn render_calendar(f: &mut Frame, app: &mut App, area: Rect) {
    if area.height < 2 {
        return;
    }
    let header_area = Rect { height: 1, ..area };
    let rows_area = Rect {
        y: area.y + 1,
        height: area.height - 1,
        ..area
    };

    for (column, name) in day_columns(header_area).iter().zip(WEEKDAYS) {
        f.render_widget(
            Paragraph::new(name)
                .alignment(ratatui::layout::Alignment::Center)
                .style(Style::new().bold()),
            *column,
        );
    }

    let visible = usize::from((rows_area.height / WEEK_ROW_HEIGHT).max(1));
    app.visible_weeks = visible;
    let weeks = app.windows.window().weeks();
    app.first_visible_week = app.first_visible_week.min(weeks.saturating_sub(visible));

    let rows: Vec<_> = app
        .windows
        .window()
        .week_rows()
        .skip(app.first_visible_week)
        .take(visible)
        .collect();
    for (i, week) in rows.into_iter().enumerate() {
        let y = rows_area.y + i as u16 * WEEK_ROW_HEIGHT;
        if y >= rows_area.y + rows_area.height {
            break;
        }
        let row_rect = Rect {
            y,
            height: WEEK_ROW_HEIGHT.min(rows_area.y + rows_area.height - y),
            ..rows_area
        };
        for (cell, date) in day_columns(row_rect).iter().zip(week) {
            render_day_cell(f, app, *cell, date);
        }
    }
}

fn cell_title(date: NaiveDate) -> String {
    if date.day() == 1 {
        date.format(" %d %b ").to_string()
    } else {
        date.format(" %d ").to_string()
    }
}

/// Card line: description first, then distance and notes while they fit in `width`.
fn entry_text(entry: &WorkoutEntry, width: usize) -> String {
    let marker = match entry.kind {
        EntryKind::Planned => "• ",
        EntryKind::Imported => "↗ ",
    };
    let mut text = format!("{}{}", marker, entry.display_description());
    let notes = entry
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let extras = [entry.distance.map(|km| format!("{:.1} km", km)), notes];
    for extra in extras.into_iter().flatten() {
        let candidate = format!("{} · {}", text, extra);
        if candidate.chars().count() > width {
            break;
        }
        text = candidate;
    }
    text
}

fn render_day_cell(f: &mut Frame, app: &mut App, rect: Rect, date: NaiveDate) {
    let is_selected = date == app.selected_date;
    let is_today = date == app.today;
    let is_drop_target = app.drag.hovered() == Some(date) && app.drag.is_valid_target(date);
    let dragged_id = match app.drag.state() {
        DragState::Dragging { payload } | DragState::Moving { payload, .. } => Some(payload.id),
        DragState::Idle => None,
    };

    let border_style = if is_drop_target {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if is_selected {
        Style::default().fg(Color::Yellow)
    } else if is_today {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title_style = if is_today {
        Style::new().bold().cyan()
    } else if date.month() % 2 == 0 {
        Style::new().gray()
    } else {
        Style::new().white()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(cell_title(date), title_style));
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    app.hit_map.cells.push((rect, date));

    if rect.width > 6 {
        let add_rect = Rect::new(rect.x + rect.width - 4, rect.y, 3, 1);
        f.render_widget(
            Paragraph::new("[+]").style(Style::new().green()),
            add_rect,
        );
        app.hit_map.add_buttons.push((add_rect, date));
    }

    let bucket = app.service.lookup(date);
    let total = bucket.len();
    let capacity = usize::from(inner.height);
    let shown = if total > capacity {
        capacity.saturating_sub(1)
    } else {
        total
    };

    for (idx, entry) in bucket.entries().enumerate().take(shown) {
        let line_rect = Rect::new(inner.x, inner.y + idx as u16, inner.width, 1);
        let mut style = match entry.kind {
            EntryKind::Planned => Style::default().fg(Color::LightBlue),
            EntryKind::Imported => Style::default().fg(Color::LightGreen).italic(),
        };
        if entry.id.is_some() && entry.id == dragged_id {
            style = style.add_modifier(Modifier::DIM);
        }
        if is_selected && idx == app.selected_entry {
            style = style.add_modifier(Modifier::REVERSED);
        }
        let text = entry_text(entry, usize::from(inner.width));
        f.render_widget(Paragraph::new(text).style(style), line_rect);
        app.hit_map.entries.push((line_rect, date, idx));
    }

    if shown < total {
        let more_rect = Rect::new(inner.x, inner.y + shown as u16, inner.width, 1);
        f.render_widget(
            Paragraph::new(format!("+{} more", total - shown)).style(Style::new().dark_gray()),
            more_rect,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempo() -> WorkoutEntry {
        let mut entry = WorkoutEntry::draft(NaiveDate::from_ymd_opt(2024, 6, 5).unwrap());
        entry.description = "Tempo".to_string();
        entry.distance = Some(10.0);
        entry.notes = Some(" hilly ".to_string());
        entry
    }

    #[test]
    fn test_entry_text_appends_distance_and_notes_when_room() {
        assert_eq!(entry_text(&tempo(), 40), "• Tempo · 10.0 km · hilly");
        assert_eq!(entry_text(&tempo(), 18), "• Tempo · 10.0 km");
        assert_eq!(entry_text(&tempo(), 10), "• Tempo");
    }

    #[test]
    fn test_entry_text_skips_missing_details() {
        let mut entry = tempo();
        entry.distance = None;
        entry.notes = Some("   ".to_string());
        assert_eq!(entry_text(&entry, 40), "• Tempo");

        entry.notes = Some("easy".to_string());
        assert_eq!(entry_text(&entry, 40), "• Tempo · easy");
    }
}
