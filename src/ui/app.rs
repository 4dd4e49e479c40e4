use std::cmp::min;
use std::mem;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::db::ExerciseStore;
use crate::error::StoreError;
use crate::models::{Day, ExerciseRecord, FieldUpdate};

use super::forms::{
    ConfirmExerciseDelete, EditField, EditForm, ExerciseField, ExerciseForm, ImportForm,
};
use super::helpers::{centered_rect, exercise_card_lines, surface_error, visible_start};

/// Day tabs plus their border.
const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Two lines of content plus the card border.
const CARD_HEIGHT: u16 = 4;

/// What the keyboard currently drives: the card list or one of the popups.
enum Mode {
    Normal,
    AddingExercise(ExerciseForm),
    EditingExercise { id: i64, form: EditForm },
    ConfirmDelete(ConfirmExerciseDelete),
    Importing(ImportForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Application state for the week view. The selected day lives here and is
/// passed to every store call; the card list is always the result of the most
/// recent `query_by_day` for that day.
pub struct App {
    store: ExerciseStore,
    day: Day,
    exercises: Vec<ExerciseRecord>,
    selected: usize,
    units: Vec<String>,
    mode: Mode,
    status: Option<StatusMessage>,
    export_path: PathBuf,
    last_export: Option<PathBuf>,
}

impl App {
    /// Load the first day of the week and the known units.
    pub fn new(store: ExerciseStore, export_path: PathBuf) -> Result<Self> {
        let day = Day::default();
        let exercises = store
            .query_by_day(day)
            .context("failed to load exercises")?;
        let units = store.known_units().context("failed to load units")?;

        Ok(Self {
            store,
            day,
            exercises,
            selected: 0,
            units,
            mode: Mode::Normal,
            status: None,
            export_path,
            last_export: None,
        })
    }

    pub fn day(&self) -> Day {
        self.day
    }

    /// The cards currently on screen.
    pub fn exercises(&self) -> &[ExerciseRecord] {
        &self.exercises
    }

    /// Route a key press to the active mode. Returns true when the user asked
    /// to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingExercise(form) => self.handle_add_exercise(code, form),
            Mode::EditingExercise { id, form } => self.handle_edit_exercise(code, id, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::Importing(form) => self.handle_import(code, form),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Left | KeyCode::Char('h') => self.select_day(self.day.previous()),
            KeyCode::Right | KeyCode::Char('l') => self.select_day(self.day.next()),
            KeyCode::Char(ch @ '1'..='7') => {
                let day = ch
                    .to_digit(10)
                    .and_then(|digit| Day::from_index(digit as usize - 1));
                if let Some(day) = day {
                    self.select_day(day);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.exercises.len().saturating_sub(1),
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Mode::AddingExercise(ExerciseForm::default());
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(record) = self.current_exercise().cloned() {
                    self.clear_status();
                    return Mode::EditingExercise {
                        id: record.id,
                        form: EditForm::from_record(&record),
                    };
                }
                self.set_status("No exercise selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(record) = self.current_exercise().cloned() {
                    self.clear_status();
                    return Mode::ConfirmDelete(ConfirmExerciseDelete::from(&record));
                }
                self.set_status("No exercise selected to delete.", StatusKind::Error);
            }
            KeyCode::Char(']') => self.adjust_reps(true),
            KeyCode::Char('[') => self.adjust_reps(false),
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('o') => self.open_last_export(),
            KeyCode::Char('i') => {
                self.clear_status();
                let path = self.export_path.display().to_string();
                return Mode::Importing(ImportForm::with_path(path));
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_add_exercise(&mut self, code: KeyCode, mut form: ExerciseForm) -> Mode {
        match code {
            KeyCode::Esc => {
                if form.suggestion.take().is_none() {
                    self.set_status("Add exercise cancelled.", StatusKind::Info);
                    return Mode::Normal;
                }
            }
            KeyCode::Tab => {
                if !form.accept_suggestion() {
                    form.cycle_field(true);
                }
                form.update_suggestion(&self.units);
            }
            KeyCode::Down => {
                form.cycle_field(true);
                form.update_suggestion(&self.units);
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.cycle_field(false);
                form.update_suggestion(&self.units);
            }
            KeyCode::Backspace => {
                form.backspace();
                form.update_suggestion(&self.units);
            }
            KeyCode::Enter => match self.save_new_exercise(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                    form.update_suggestion(&self.units);
                }
            }
            _ => {}
        }
        Mode::AddingExercise(form)
    }

    fn handle_edit_exercise(&mut self, code: KeyCode, id: i64, mut form: EditForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.cycle_field(true),
            KeyCode::BackTab | KeyCode::Up => form.cycle_field(false),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_edits(id, &form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EditingExercise { id, form }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmExerciseDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.store.delete(confirm.id) {
                    Ok(deleted) => {
                        self.refresh(None);
                        let message = if deleted {
                            format!("Deleted {}.", confirm.exercise)
                        } else {
                            format!("{} was already removed.", confirm.exercise)
                        };
                        self.set_status(message, StatusKind::Info);
                        Mode::Normal
                    }
                    Err(err) => {
                        self.report_failure("delete exercise", &err.into());
                        Mode::ConfirmDelete(confirm)
                    }
                }
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_import(&mut self, code: KeyCode, mut form: ImportForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Import cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let path = form.path.trim().to_string();
                if path.is_empty() {
                    form.error = Some("Choose a file to import.".to_string());
                    return Mode::Importing(form);
                }
                match self.store.import_from_path(Path::new(&path)) {
                    Ok(summary) => {
                        self.refresh(None);
                        let kind = if summary.rejected.is_empty() {
                            StatusKind::Info
                        } else {
                            StatusKind::Error
                        };
                        self.set_status(summary.to_string(), kind);
                        return Mode::Normal;
                    }
                    Err(err) => {
                        let err = anyhow::Error::from(err);
                        tracing::error!(error = %surface_error(&err), %path, "import failed");
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Importing(form)
    }

    fn save_new_exercise(&mut self, form: &ExerciseForm) -> Result<()> {
        let record = match self.store.add(self.day, &form.to_new_exercise()) {
            Ok(record) => record,
            Err(err @ StoreError::Validation { .. }) => return Err(err.into()),
            Err(err) => {
                let err = anyhow::Error::from(err);
                tracing::error!(error = %surface_error(&err), "failed to add exercise");
                return Err(err);
            }
        };

        tracing::info!(id = record.id, day = %self.day, "exercise added");
        self.refresh(Some(record.id));
        self.set_status(
            format!("Added {} to {}.", record.exercise, self.day),
            StatusKind::Info,
        );
        Ok(())
    }

    fn save_edits(&mut self, id: i64, form: &EditForm) -> Result<()> {
        let record = self.store.get(id).map_err(|err| {
            tracing::warn!(id, error = %err, "exercise to edit is gone");
            anyhow::Error::from(err)
        })?;
        let updates = form.changes(&record)?;
        if updates.is_empty() {
            self.set_status("No changes.", StatusKind::Info);
            return Ok(());
        }

        let applied = updates
            .iter()
            .try_for_each(|update| self.store.update_field(id, update).map(|_| ()));
        self.refresh(Some(id));
        if let Err(err) = applied {
            let err = anyhow::Error::from(err);
            tracing::error!(id, error = %surface_error(&err), "failed to update exercise");
            return Err(err);
        }

        self.set_status(format!("Updated {}.", record.exercise), StatusKind::Info);
        Ok(())
    }

    fn adjust_reps(&mut self, increment: bool) {
        let Some(record) = self.current_exercise().cloned() else {
            self.set_status("No exercise selected.", StatusKind::Error);
            return;
        };

        let reps = if increment {
            record.reps_done.saturating_add(1)
        } else {
            record.reps_done.saturating_sub(1)
        };
        if reps == record.reps_done {
            return;
        }

        let update = FieldUpdate::RepsDone(reps);
        match self.store.update_field(record.id, &update) {
            Ok(_) => {
                self.refresh(Some(record.id));
                self.clear_status();
            }
            Err(err) => {
                self.report_failure("update reps done", &err.into());
                self.refresh(Some(record.id));
            }
        }
    }

    fn export(&mut self) {
        match self.store.export_to_path(&self.export_path) {
            Ok(count) => {
                self.last_export = Some(self.export_path.clone());
                self.set_status(
                    format!(
                        "Exported {count} exercises to {}. Press 'o' to open it.",
                        self.export_path.display()
                    ),
                    StatusKind::Info,
                );
            }
            Err(err) => self.report_failure("export exercises", &err.into()),
        }
    }

    fn open_last_export(&mut self) {
        let Some(path) = self.last_export.clone() else {
            self.set_status("Nothing exported yet. Press 'x' to export.", StatusKind::Error);
            return;
        };
        match open_path(&path) {
            Ok(()) => self.set_status(format!("Opened {}.", path.display()), StatusKind::Info),
            Err(err) => self.set_status(format!("Failed to open export: {err}"), StatusKind::Error),
        }
    }

    fn select_day(&mut self, day: Day) {
        self.clear_status();
        self.day = day;
        self.selected = 0;
        self.refresh(None);
        tracing::debug!(%day, count = self.exercises.len(), "switched day");
    }

    /// Re-query the current day after a mutation has committed. Failures are
    /// logged and shown; the previous cards stay on screen.
    fn refresh(&mut self, focus_id: Option<i64>) {
        if let Err(err) = self.reload(focus_id) {
            self.report_failure("reload exercises", &err);
        }
    }

    fn reload(&mut self, focus_id: Option<i64>) -> Result<()> {
        self.exercises = self.store.query_by_day(self.day)?;
        self.units = self.store.known_units()?;

        if let Some(id) = focus_id {
            if let Some(idx) = self.exercises.iter().position(|record| record.id == id) {
                self.selected = idx;
                return Ok(());
            }
        }

        if self.selected >= self.exercises.len() {
            self.selected = self.exercises.len().saturating_sub(1);
        }
        Ok(())
    }

    fn report_failure(&mut self, action: &str, err: &anyhow::Error) {
        let message = surface_error(err);
        tracing::error!(error = %message, "failed to {}", action);
        self.set_status(format!("Could not {action}: {message}"), StatusKind::Error);
    }

    fn current_exercise(&self) -> Option<&ExerciseRecord> {
        self.exercises.get(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        if self.exercises.is_empty() {
            return;
        }
        let last = self.exercises.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_day_tabs(frame, chunks[0]);
        self.draw_exercises(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingExercise(form) => self.draw_exercise_form(frame, area, form),
            Mode::EditingExercise { form, .. } => self.draw_edit_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Importing(form) => self.draw_import_form(frame, area, form),
            Mode::Normal => {}
        }
    }

    fn draw_day_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Day::ALL
            .iter()
            .enumerate()
            .map(|(idx, day)| Line::from(format!("{} {}", idx + 1, day)))
            .collect();

        let tabs = Tabs::new(titles)
            .select(self.day.index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Weekly Workout Tracker"),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .divider("|");
        frame.render_widget(tabs, area);
    }

    fn draw_exercises(&self, frame: &mut Frame, area: Rect) {
        if self.exercises.is_empty() {
            let message = Paragraph::new(format!(
                "No exercises for {}. Press '+' to add one.",
                self.day
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::NONE));
            frame.render_widget(message, area);
            return;
        }
        if area.height == 0 {
            return;
        }

        let len = self.exercises.len();
        let capacity = ((area.height / CARD_HEIGHT) as usize).max(1);
        let start = visible_start(self.selected, capacity, len);
        let end = min(start + capacity, len);

        let constraints: Vec<Constraint> = (start..end)
            .map(|_| Constraint::Length(CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (chunk, index) in rows.iter().zip(start..end) {
            if chunk.height == 0 {
                continue;
            }
            let record = &self.exercises[index];
            let selected = index == self.selected;

            let mut block = Block::default().borders(Borders::ALL);
            if selected {
                block = block.style(Style::default().fg(Color::Yellow));
            }
            let card = Paragraph::new(exercise_card_lines(record, selected))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(card, *chunk);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let text = match self.mode {
            Mode::Normal => {
                "←/→ day • 1-7 jump • ↑/↓ select • + add • e edit • [/] reps • -/d delete • x export • o open • i import • q quit"
            }
            Mode::AddingExercise(_) | Mode::EditingExercise { .. } => {
                "Enter save • Tab next field • Shift+Tab previous • Esc cancel"
            }
            Mode::ConfirmDelete(_) => "Y confirm • N / Esc cancel",
            Mode::Importing(_) => "Enter import • Esc cancel",
        };
        Line::from(Span::styled(text, Style::default().fg(Color::Gray)))
    }

    fn draw_exercise_form(&self, frame: &mut Frame, area: Rect, form: &ExerciseForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Add Exercise for {}", self.day))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = ExerciseField::ORDER
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        lines.push(form_hint(form.error.as_deref()));

        frame.render_widget(Paragraph::new(lines), inner);

        let row = ExerciseField::ORDER
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = format!("{}: ", form.active.label()).chars().count() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_edit_form(&self, frame: &mut Frame, area: Rect, form: &EditForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Edit {}", form.exercise))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = EditField::ORDER
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        lines.push(form_hint(form.error.as_deref()));

        frame.render_widget(Paragraph::new(lines), inner);

        let row = EditField::ORDER
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = format!("{}: ", form.active.label()).chars().count() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmExerciseDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Delete Exercise")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete '{}' from {}?",
                confirm.exercise, confirm.day
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_import_form(&self, frame: &mut Frame, area: Rect, form: &ImportForm) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Import Exercises")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line(),
            Line::from(""),
            Line::from(Span::styled(
                "Entries with an existing id replace it; the rest are added.",
                Style::default().fg(Color::Gray),
            )),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        let prefix = "File: ".len() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.path.chars().count() as u16,
            inner.y,
        ));
    }
}

/// Error text in red, or the key hint in gray.
fn form_hint(error: Option<&str>) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "Enter to save • Tab to switch • Esc to cancel",
            Style::default().fg(Color::Gray),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app_with_export(path: PathBuf) -> App {
        App::new(ExerciseStore::open_in_memory().unwrap(), path).unwrap()
    }

    fn app() -> App {
        app_with_export(PathBuf::from("exercises.json"))
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn add_squat(app: &mut App) {
        app.handle_key(KeyCode::Char('+'));
        type_text(app, "Squat");
        app.handle_key(KeyCode::Tab);
        type_text(app, "100");
        app.handle_key(KeyCode::Tab);
        type_text(app, "kg");
        app.handle_key(KeyCode::Tab);
        type_text(app, "5");
        app.handle_key(KeyCode::Tab);
        type_text(app, "8");
        app.handle_key(KeyCode::Enter);
    }

    #[test]
    fn adding_through_the_form_renders_the_new_card() {
        let mut app = app();
        add_squat(&mut app);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.exercises().len(), 1);
        let card = &app.exercises()[0];
        assert_eq!(card.exercise, "Squat");
        assert_eq!(card.day, Day::Monday);
        assert_eq!(card.weight_label(), "100 kg");
        assert_eq!(card.reps_done, 0);
    }

    #[test]
    fn blank_required_field_keeps_form_open() {
        let mut app = app();
        app.handle_key(KeyCode::Char('+'));
        type_text(&mut app, "Squat");
        app.handle_key(KeyCode::Enter);

        match &app.mode {
            Mode::AddingExercise(form) => {
                assert!(form.error.as_deref().unwrap().contains("weight"));
            }
            _ => panic!("form should stay open"),
        }
        assert!(app.exercises().is_empty());
        assert!(app.store.export_all().unwrap().is_empty());
    }

    #[test]
    fn days_are_independent_and_wrap() {
        let mut app = app();
        add_squat(&mut app);

        app.handle_key(KeyCode::Right);
        assert_eq!(app.day(), Day::Tuesday);
        assert!(app.exercises().is_empty());

        app.handle_key(KeyCode::Char('7'));
        assert_eq!(app.day(), Day::Sunday);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.day(), Day::Monday);
        assert_eq!(app.exercises().len(), 1);

        app.handle_key(KeyCode::Left);
        assert_eq!(app.day(), Day::Sunday);
    }

    #[test]
    fn reps_adjust_in_place_and_saturate() {
        let mut app = app();
        add_squat(&mut app);

        app.handle_key(KeyCode::Char(']'));
        app.handle_key(KeyCode::Char(']'));
        assert_eq!(app.exercises()[0].reps_done, 2);

        for _ in 0..3 {
            app.handle_key(KeyCode::Char('['));
        }
        assert_eq!(app.exercises()[0].reps_done, 0);
    }

    #[test]
    fn edit_form_updates_changed_fields() {
        let mut app = app();
        add_squat(&mut app);

        app.handle_key(KeyCode::Char('e'));
        for _ in 0..3 {
            app.handle_key(KeyCode::Backspace);
        }
        type_text(&mut app, "110");
        for _ in 0..4 {
            app.handle_key(KeyCode::Tab);
        }
        app.handle_key(KeyCode::Backspace);
        type_text(&mut app, "6");
        app.handle_key(KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        let card = &app.exercises()[0];
        assert_eq!(card.weight, "110");
        assert_eq!(card.reps_done, 6);
        assert_eq!(card.rep_range_label(), "5-8");
    }

    #[test]
    fn confirmed_delete_removes_card() {
        let mut app = app();
        add_squat(&mut app);

        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.exercises().len(), 1);

        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('y'));
        assert!(app.exercises().is_empty());
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn d_key_asks_before_deleting() {
        let mut app = app();
        add_squat(&mut app);

        app.handle_key(KeyCode::Char('d'));
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        app.handle_key(KeyCode::Esc);
        assert_eq!(app.exercises().len(), 1);
    }

    #[test]
    fn footer_lists_every_normal_mode_key() {
        let app = app();
        let help: String = app
            .footer_instructions()
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();
        for key in ["-/d delete", "x export", "o open", "i import", "[/] reps"] {
            assert!(help.contains(key), "missing '{key}' in footer");
        }
    }

    #[test]
    fn export_then_import_restores_deleted_cards() {
        let dir = tempfile::tempdir().unwrap();
        let export = dir.path().join("exercises.json");
        let mut app = app_with_export(export.clone());
        add_squat(&mut app);
        let original = app.exercises().to_vec();

        app.handle_key(KeyCode::Char('x'));
        assert!(export.exists());
        assert_eq!(app.last_export.as_deref(), Some(export.as_path()));

        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('y'));
        assert!(app.exercises().is_empty());

        app.handle_key(KeyCode::Char('i'));
        app.handle_key(KeyCode::Enter);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.exercises(), original.as_slice());
    }

    #[test]
    fn import_of_missing_file_keeps_prompt_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_export(dir.path().join("missing.json"));

        app.handle_key(KeyCode::Char('i'));
        app.handle_key(KeyCode::Enter);
        match &app.mode {
            Mode::Importing(form) => assert!(form.error.is_some()),
            _ => panic!("import prompt should stay open"),
        }
    }

    #[test]
    fn draw_shows_day_and_cards() {
        let mut app = app();
        add_squat(&mut app);

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();

        assert!(screen.contains("Monday"));
        assert!(screen.contains("Squat"));
        assert!(screen.contains("100 kg"));
    }
}
