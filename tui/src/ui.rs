//! Screen Rendering
//!
//! Pure rendering over the [`App`] state: nothing here mutates the core.
//! Each screen gets one `draw_*` function; shared chrome (title bar, status
//! line) is rendered around whichever screen is active.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Row, Table};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use oracle_core::{Action, ChatMessage, DailyStats, MessageRole};

use crate::app::{App, Screen, PERSONAS};
use crate::theme::Palette;

/// Input box height in lines, borders included
const INPUT_HEIGHT: u16 = 3;

/// Render the whole frame
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_title(frame, app, chunks[0]);
    match app.screen {
        Screen::Onboarding => draw_onboarding(frame, app, chunks[1]),
        Screen::Chat => draw_chat(frame, app, chunks[1]),
        Screen::Dashboard => draw_dashboard(frame, app, chunks[1]),
        Screen::Plan => draw_plan(frame, app, chunks[1]),
        Screen::Profile => draw_profile(frame, app, chunks[1]),
    }
    draw_status(frame, app, chunks[2]);
}

fn draw_title(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let label = match app.screen {
        Screen::Onboarding => "Oracle · Welcome",
        Screen::Chat => "Oracle · Chat",
        Screen::Dashboard => "Oracle · Dashboard",
        Screen::Plan => "Oracle · Today's Plan",
        Screen::Profile => "Oracle · Profile",
    };
    let title = Paragraph::new(Line::from(Span::styled(
        label,
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let (text, style) = match &app.status {
        Some(status) => (status.clone(), Style::default().fg(palette.negative)),
        None => (
            match app.screen {
                Screen::Onboarding => "↑/↓ choose · Enter select · Esc quit".to_string(),
                Screen::Chat => {
                    "Enter send · Tab screens · Ctrl+T track · Ctrl+L clear · Ctrl+V voice"
                        .to_string()
                }
                Screen::Dashboard | Screen::Plan => "Tab screens · r refresh · q quit".to_string(),
                Screen::Profile => {
                    "↑/↓ weight · ←/→ height · p plan · t theme · Enter save".to_string()
                }
            },
            Style::default().fg(palette.dim),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), area);
}

// ---- onboarding --------------------------------------------------------

fn draw_onboarding(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Choose a demo persona to get started:",
            Style::default().fg(palette.text),
        )),
        Line::from(""),
    ];
    for (index, (_, description)) in PERSONAS.iter().enumerate() {
        let style = if index == app.persona_index {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.dim)
        };
        let marker = if index == app.persona_index { "▸" } else { " " };
        lines.push(Line::from(Span::styled(
            format!("  {marker} {}. {description}", index + 1),
            style,
        )));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Welcome to Oracle");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ---- chat --------------------------------------------------------------

fn draw_chat(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(INPUT_HEIGHT)])
        .split(area);

    draw_messages(frame, app, chunks[0]);
    draw_input(frame, app, chunks[1]);
}

fn draw_messages(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let wrap_width = usize::from(area.width.saturating_sub(4)).max(20);

    let mut lines: Vec<Line> = Vec::new();
    for message in app.oracle().messages() {
        lines.extend(message_lines(&message, wrap_width, palette));
        lines.push(Line::from(""));
    }
    if app.oracle().is_sending() {
        lines.push(Line::from(Span::styled(
            "Oracle is thinking…",
            Style::default()
                .fg(palette.dim)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    // Anchor to the bottom, offset by the manual scroll.
    let visible = usize::from(area.height.saturating_sub(2));
    let total = lines.len();
    let bottom_start = total.saturating_sub(visible);
    let start = bottom_start.saturating_sub(usize::from(app.scroll));

    let block = Block::default().borders(Borders::ALL).title("Conversation");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((start as u16, 0));
    frame.render_widget(paragraph, area);
}

fn message_lines(message: &ChatMessage, width: usize, palette: &Palette) -> Vec<Line<'static>> {
    let (speaker, speaker_style) = match message.role {
        MessageRole::User => ("You", Style::default().fg(palette.user)),
        MessageRole::Assistant => ("Oracle", Style::default().fg(palette.accent)),
    };

    let mut lines = vec![Line::from(Span::styled(
        speaker.to_string(),
        speaker_style.add_modifier(Modifier::BOLD),
    ))];

    let body_style = if message.pending {
        Style::default()
            .fg(palette.dim)
            .add_modifier(Modifier::ITALIC)
    } else {
        Style::default().fg(palette.text)
    };
    for wrapped in textwrap::wrap(&message.content, width) {
        lines.push(Line::from(Span::styled(wrapped.into_owned(), body_style)));
    }

    if let Some(card) = action_card(&message.action, palette) {
        lines.push(card);
    }
    lines
}

/// One-line card for a structured action, styled by commitment state
fn action_card(action: &Action, palette: &Palette) -> Option<Line<'static>> {
    let (text, style) = match action {
        Action::None => return None,
        Action::LogFood(food) => (
            format!(
                "▸ Logged {} · {} kcal · {:.0}g protein",
                food.name, food.calories, food.protein
            ),
            Style::default().fg(palette.positive),
        ),
        Action::LogExercise(ex) => (
            format!(
                "▸ Logged {} · {}x{} at {:.0}kg",
                ex.name, ex.sets, ex.reps, ex.weight
            ),
            Style::default().fg(palette.positive),
        ),
        Action::ProposeFood(food) => (
            format!(
                "▸ Track {} ({} kcal, {:.0}g protein)? Ctrl+T to confirm",
                food.name, food.calories, food.protein
            ),
            Style::default().fg(palette.pending),
        ),
        Action::ProposeExercise(ex) => (
            format!(
                "▸ Track {} ({}x{} at {:.0}kg)? Ctrl+T to confirm",
                ex.name, ex.sets, ex.reps, ex.weight
            ),
            Style::default().fg(palette.pending),
        ),
        Action::Reset => (
            "▸ Today's logs were reset".to_string(),
            Style::default().fg(palette.negative),
        ),
    };
    Some(Line::from(Span::styled(text, style)))
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let title = if app.oracle().is_sending() {
        "Sending…"
    } else {
        "Message"
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let paragraph = Paragraph::new(Line::from(Span::styled(
        app.input.clone(),
        Style::default().fg(palette.text),
    )))
    .block(block);
    frame.render_widget(paragraph, area);

    // Cursor after the typed text, clamped to the box.
    let max_width = usize::from(area.width.saturating_sub(2));
    let cursor_x = area.x + 1 + app.input.width().min(max_width) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
}

// ---- dashboard ---------------------------------------------------------

fn draw_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let Some(stats) = app.stats else {
        let block = Block::default().borders(Borders::ALL).title("Today");
        frame.render_widget(
            Paragraph::new("Loading today's stats…")
                .style(Style::default().fg(palette.dim))
                .block(block),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    draw_gauge(
        frame,
        chunks[0],
        "Calories",
        format!(
            "{} / {} kcal ({}%)",
            stats.calories_consumed, stats.calories_target,
            stats.calories_pct()
        ),
        f64::from(stats.calories_pct()) / 100.0,
        stats.calories_excess().is_some(),
        palette,
    );
    draw_gauge(
        frame,
        chunks[1],
        "Protein",
        format!(
            "{:.0} / {:.0} g ({}%)",
            stats.protein_consumed, stats.protein_target,
            stats.protein_pct()
        ),
        f64::from(stats.protein_pct()) / 100.0,
        stats.protein_excess().is_some(),
        palette,
    );
    draw_summary_lines(frame, chunks[2], &stats, palette);
}

fn draw_gauge(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    label: String,
    ratio: f64,
    over: bool,
    palette: &Palette,
) {
    let color = if over { palette.negative } else { palette.positive };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .gauge_style(Style::default().fg(color))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, area);
}

fn draw_summary_lines(frame: &mut Frame, area: Rect, stats: &DailyStats, palette: &Palette) {
    let mut lines = vec![Line::from(Span::styled(
        format!("Workouts completed today: {}", stats.workouts_completed),
        Style::default().fg(palette.text),
    ))];

    if let Some(excess) = stats.calories_excess() {
        lines.push(Line::from(Span::styled(
            format!("{excess} kcal over target"),
            Style::default().fg(palette.negative),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("{} kcal remaining", stats.calories_remaining()),
            Style::default().fg(palette.dim),
        )));
    }
    if let Some(excess) = stats.protein_excess() {
        lines.push(Line::from(Span::styled(
            format!("{excess:.0}g protein over target"),
            Style::default().fg(palette.negative),
        )));
    }

    let block = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ---- plans -------------------------------------------------------------

fn draw_plan(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let meal_rows: Vec<Row> = app
        .meal_plan
        .iter()
        .map(|item| {
            Row::new(vec![
                item.meal_type.clone(),
                item.item_name.clone(),
                format!("{} kcal", item.calories),
                format!("{:.0}g protein", item.protein_g),
            ])
        })
        .collect();
    let meal_table = Table::new(
        meal_rows,
        [
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["Meal", "Item", "Energy", "Protein"])
            .style(Style::default().fg(palette.accent)),
    )
    .block(Block::default().borders(Borders::ALL).title("Meals"));
    frame.render_widget(meal_table, chunks[0]);

    let training_rows: Vec<Row> = app
        .training_plan
        .iter()
        .map(|routine| {
            Row::new(vec![
                routine.exercise_name.clone(),
                format!("{}x{}", routine.sets, routine.reps),
                format!("{:.0} kg", routine.target_load_kg),
                routine.machine_hint.clone().unwrap_or_default(),
            ])
        })
        .collect();
    let training_table = Table::new(
        training_rows,
        [
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Min(16),
        ],
    )
    .header(
        Row::new(vec!["Exercise", "Sets", "Load", "Where"])
            .style(Style::default().fg(palette.accent)),
    )
    .block(Block::default().borders(Borders::ALL).title("Training"));
    frame.render_widget(training_table, chunks[1]);
}

// ---- profile -----------------------------------------------------------

fn draw_profile(frame: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let draft = &app.profile_draft;
    let lines = vec![
        Line::from(""),
        profile_line("Weight", format!("{:.1} kg", draft.weight_kg), palette),
        profile_line("Height", format!("{} cm", draft.height_cm), palette),
        profile_line("Plan", draft.plan.label().to_string(), palette),
        profile_line("Theme", format!("{:?}", draft.theme), palette),
        Line::from(""),
        Line::from(Span::styled(
            "Changes apply after saving with Enter.",
            Style::default().fg(palette.dim),
        )),
    ];
    let block = Block::default().borders(Borders::ALL).title("Profile");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn profile_line(label: &str, value: String, palette: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<8}"), Style::default().fg(palette.dim)),
        Span::styled(value, Style::default().fg(palette.text)),
    ])
}
