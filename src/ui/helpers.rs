use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::ExerciseRecord;

/// Two-line body of an exercise card: the name, then weight, rep range and
/// reps done on one row.
pub(crate) fn exercise_card_lines(record: &ExerciseRecord, selected: bool) -> Vec<Line<'static>> {
    let title = if selected {
        format!("▶ {}", record.exercise)
    } else {
        record.exercise.clone()
    };

    let label = Style::default().fg(Color::Gray);
    let reps_style = if record.reps_done > 0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    vec![
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Weight: ", label),
            Span::raw(record.weight_label()),
            Span::styled("   Rep range: ", label),
            Span::raw(record.rep_range_label()),
            Span::styled("   Reps done: ", label),
            Span::styled(record.reps_done.to_string(), reps_style),
        ]),
    ]
}

/// First index of the window of `capacity` cards that keeps `selected`
/// visible.
pub(crate) fn visible_start(selected: usize, capacity: usize, len: usize) -> usize {
    let capacity = capacity.max(1);
    let start = if selected >= capacity {
        selected + 1 - capacity
    } else {
        0
    };
    start.min(len.saturating_sub(capacity))
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Message for the status line: the outermost error, plus the root cause when
/// there is one (for example the SQLite message behind a storage failure).
pub(crate) fn surface_error(err: &Error) -> String {
    let top = err.to_string();
    match err.chain().last().map(|cause| cause.to_string()) {
        Some(root) if root != top => format!("{top}: {root}"),
        _ => top,
    }
}
