// src/ui/modals.rs
use crate::{
    app::{
        geometry::modal_rect,
        state::{ActiveModal, WorkoutField},
        App, MouseGesture,
    },
    ui::layout::centered_rect,
};
use plancal_lib::{ModalPhase, ModalTarget};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const LABEL_WIDTH: u16 = 14;

const TEXT_FIELDS: [(WorkoutField, &str); 7] = [
    (WorkoutField::Description, "Description:"),
    (WorkoutField::Distance, "Distance (km):"),
    (WorkoutField::Warmup, "Warmup:"),
    (WorkoutField::Main, "Main set:"),
    (WorkoutField::Cooldown, "Cooldown:"),
    (WorkoutField::Terrain, "Terrain:"),
    (WorkoutField::Notes, "Notes:"),
];

pub fn render_modal(f: &mut Frame, app: &mut App) {
    match app.active_modal {
        ActiveModal::Help => render_help_modal(f),
        ActiveModal::GoToDate { .. } => render_goto_modal(f, app),
        ActiveModal::Workout { .. } => render_workout_modal(f, app),
        ActiveModal::None => {}
    }
}

fn render_help_modal(f: &mut Frame) {
    let block = Block::default()
        .title("Help (?)")
        .borders(Borders::ALL)
        .title_style(Style::new().bold())
        .border_style(Style::new().yellow());
    let area = centered_rect(60, 70, f.size());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let help_text = vec![
        Line::from("--- Calendar ---").style(Style::new().bold().underlined()),
        Line::from(" h/l / ←/→: Previous / Next Day"),
        Line::from(" k/j / ↑/↓: Previous / Next Week"),
        Line::from(" PgUp/PgDn, mouse wheel: Scroll (loads more weeks at the edges)"),
        Line::from(" [ / ]: Shift Window One Week"),
        Line::from(" t: Today  g: Go to Date  r: Reload"),
        Line::from(" Tab: Cycle Workouts in Selected Day"),
        Line::from(""),
        Line::from("--- Workouts ---").style(Style::new().bold().underlined()),
        Line::from(" a / + / [+]: Add Planned Workout"),
        Line::from(" e / Enter / click: Edit Selected Workout"),
        Line::from(" m: Move Workout (arrows pick day, Enter drops, Esc cancels)"),
        Line::from(" Drag with mouse: Move Workout to Another Day"),
        Line::from(""),
        Line::from("--- Workout Dialog ---").style(Style::new().bold().underlined()),
        Line::from(" Tab/↑↓: Navigate Fields  Ctrl+S: Save  Esc: Close"),
        Line::from(" Ctrl+Arrows or drag borders: Resize"),
        Line::from(" Drag top row: Move"),
        Line::from(""),
        Line::from(Span::styled(
            " Press Esc, ?, or Enter to close ",
            Style::new().italic().yellow(),
        )),
    ];

    let paragraph = Paragraph::new(help_text).wrap(Wrap { trim: false });
    f.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn render_goto_modal(f: &mut Frame, app: &App) {
    if let ActiveModal::GoToDate {
        date_input,
        error_message,
    } = &app.active_modal
    {
        let block = Block::default()
            .title("Go to Date")
            .borders(Borders::ALL)
            .border_style(Style::new().yellow());
        let area = centered_rect(40, 20, f.size());
        f.render_widget(Clear, area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area.inner(&Margin {
                vertical: 1,
                horizontal: 1,
            }));

        f.render_widget(Paragraph::new("Date (YYYY-MM-DD / today):"), chunks[0]);
        f.render_widget(
            Paragraph::new(date_input.as_str()).style(Style::default().reversed()),
            chunks[1],
        );
        if let Some(err) = error_message {
            f.render_widget(
                Paragraph::new(err.as_str()).style(Style::default().fg(Color::Red)),
                chunks[3],
            );
        }
        f.set_cursor(chunks[1].x + date_input.len() as u16, chunks[1].y);
    }
}

fn workout_area(f: &Frame, app: &App) -> Rect {
    let frame = f.size();
    if app.modal.is_compact() {
        return centered_rect(96, 90, frame);
    }
    let position = match app.gesture {
        MouseGesture::Moving { preview, .. } => Some(preview),
        _ => app.modal.position(),
    };
    match position {
        Some(position) => modal_rect(position, app.modal.size(), frame),
        None => centered_rect(60, 60, frame),
    }
}

fn render_workout_modal(f: &mut Frame, app: &mut App) {
    let ActiveModal::Workout { focused_field } = app.active_modal else {
        return;
    };
    let Some(target) = app.modal.target() else {
        return;
    };
    if app.modal.phase() == ModalPhase::Closed {
        return;
    }

    let is_edit = target.is_edit();
    let mut title = match target {
        ModalTarget::Add { date } => format!(" Add Workout: {} ", date.format("%a %d %b %Y")),
        ModalTarget::Edit { entry } => format!(" Edit Workout: {} ", entry.date.format("%a %d %b %Y")),
    };
    if app.modal.is_saving() {
        title.push_str("(saving...) ");
    }

    let area = workout_area(f, app);
    app.hit_map.modal = Some(area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .title_style(Style::new().bold())
        .border_style(Style::new().yellow());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let inner = area.inner(&Margin {
        vertical: 1,
        horizontal: 1,
    });
    let mut constraints = vec![Constraint::Length(1)]; // Title bar
    constraints.extend(TEXT_FIELDS.iter().map(|_| Constraint::Length(1)));
    constraints.push(Constraint::Length(1)); // Spacer
    constraints.push(Constraint::Length(1)); // Buttons
    constraints.push(Constraint::Min(0)); // Error
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let bar_hint = if app.modal.is_compact() {
        "Esc closes | Ctrl+S saves"
    } else {
        "Drag this row to move | drag borders to resize"
    };
    f.render_widget(
        Paragraph::new(bar_hint)
            .alignment(Alignment::Center)
            .style(Style::new().dark_gray()),
        chunks[0],
    );

    let mut cursor = None;
    for (row, (field, label)) in TEXT_FIELDS.iter().enumerate() {
        let line = chunks[row + 1];
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LABEL_WIDTH + 1), Constraint::Min(1)])
            .split(line);
        f.render_widget(Paragraph::new(*label), cols[0]);

        let value = app.form.input(*field);
        let style = if focused_field == *field {
            Style::default().reversed()
        } else {
            Style::default()
        };
        f.render_widget(Paragraph::new(value).style(style), cols[1]);
        if focused_field == *field {
            let offset = (value.chars().count() as u16).min(cols[1].width.saturating_sub(1));
            cursor = Some((cols[1].x + offset, cols[1].y));
        }
    }

    let mut buttons = vec![(WorkoutField::Save, " Save ")];
    if is_edit {
        buttons.push((WorkoutField::Delete, " Delete "));
    }
    buttons.push((WorkoutField::Cancel, " Cancel "));
    let button_count = buttons.len() as u32;
    let button_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(buttons.iter().map(|_| Constraint::Ratio(1, button_count)))
        .split(chunks[TEXT_FIELDS.len() + 2]);
    for ((field, label), rect) in buttons.iter().zip(button_layout.iter()) {
        let mut style = Style::default();
        if *field == WorkoutField::Delete {
            style = style.fg(Color::LightRed);
        }
        if focused_field == *field {
            style = style.reversed();
        }
        f.render_widget(
            Paragraph::new(*label)
                .alignment(Alignment::Center)
                .style(style),
            *rect,
        );
    }

    if let Some(err) = app.modal.error_message() {
        f.render_widget(
            Paragraph::new(err)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true }),
            chunks[TEXT_FIELDS.len() + 3],
        );
    }

    if let Some((x, y)) = cursor {
        f.set_cursor(x, y);
    }
}
