use anyhow::{Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Day, ExerciseRecord, FieldUpdate, NewExercise};

/// Which characters a text field accepts.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum InputKind {
    Text,
    Decimal,
    Integer,
}

impl InputKind {
    fn accepts(self, ch: char, current: &str) -> bool {
        match self {
            InputKind::Text => !ch.is_control(),
            InputKind::Decimal => ch.is_ascii_digit() || (ch == '.' && !current.contains('.')),
            InputKind::Integer => ch.is_ascii_digit(),
        }
    }
}

/// Render `Label: value` with the active field highlighted and a dim
/// placeholder for empty values.
fn field_line(
    label: &str,
    value: &str,
    placeholder: &str,
    is_active: bool,
    suffix: Option<String>,
) -> Line<'static> {
    let display = if value.is_empty() && suffix.is_none() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let mut spans = vec![Span::raw(format!("{label}: ")), Span::styled(display, style)];
    if let Some(suffix) = suffix {
        spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

/// Fields of the "add exercise" form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum ExerciseField {
    #[default]
    Name,
    Weight,
    Unit,
    RepMin,
    RepMax,
}

impl ExerciseField {
    pub(crate) const ORDER: [ExerciseField; 5] = [
        ExerciseField::Name,
        ExerciseField::Weight,
        ExerciseField::Unit,
        ExerciseField::RepMin,
        ExerciseField::RepMax,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            ExerciseField::Name => "Exercise",
            ExerciseField::Weight => "Weight",
            ExerciseField::Unit => "Unit",
            ExerciseField::RepMin => "Rep range min",
            ExerciseField::RepMax => "Rep range max",
        }
    }

    fn kind(self) -> InputKind {
        match self {
            ExerciseField::Name | ExerciseField::Unit => InputKind::Text,
            ExerciseField::Weight => InputKind::Decimal,
            ExerciseField::RepMin | ExerciseField::RepMax => InputKind::Integer,
        }
    }

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// State of the "add exercise" popup, including unit auto-complete.
#[derive(Default, Clone)]
pub(crate) struct ExerciseForm {
    pub(crate) name: String,
    pub(crate) weight: String,
    pub(crate) unit: String,
    pub(crate) rep_min: String,
    pub(crate) rep_max: String,
    pub(crate) active: ExerciseField,
    pub(crate) error: Option<String>,
    pub(crate) suggestion: Option<String>,
}

impl ExerciseForm {
    fn value(&self, field: ExerciseField) -> &String {
        match field {
            ExerciseField::Name => &self.name,
            ExerciseField::Weight => &self.weight,
            ExerciseField::Unit => &self.unit,
            ExerciseField::RepMin => &self.rep_min,
            ExerciseField::RepMax => &self.rep_max,
        }
    }

    fn value_mut(&mut self, field: ExerciseField) -> &mut String {
        match field {
            ExerciseField::Name => &mut self.name,
            ExerciseField::Weight => &mut self.weight,
            ExerciseField::Unit => &mut self.unit,
            ExerciseField::RepMin => &mut self.rep_min,
            ExerciseField::RepMax => &mut self.rep_max,
        }
    }

    /// Move focus forward (or backward) through the fields, wrapping around.
    pub(crate) fn cycle_field(&mut self, forward: bool) {
        let len = ExerciseField::ORDER.len();
        let pos = self.active.position();
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        self.active = ExerciseField::ORDER[next];
        if self.active != ExerciseField::Unit {
            self.suggestion = None;
        }
    }

    /// Append a character to the active field if the field accepts it.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let field = self.active;
        if !field.kind().accepts(ch, self.value(field)) {
            return false;
        }
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Hand the raw values to the store, which trims and validates them.
    pub(crate) fn to_new_exercise(&self) -> NewExercise {
        NewExercise {
            exercise: self.name.clone(),
            weight: self.weight.clone(),
            unit: self.unit.clone(),
            rep_range_min: self.rep_min.clone(),
            rep_range_max: self.rep_max.clone(),
        }
    }

    /// Suggest a previously used unit that starts with what has been typed.
    pub(crate) fn update_suggestion(&mut self, units: &[String]) {
        if self.active != ExerciseField::Unit || self.unit.is_empty() {
            self.suggestion = None;
            return;
        }
        let typed = self.unit.to_lowercase();
        self.suggestion = units
            .iter()
            .find(|unit| unit.to_lowercase().starts_with(&typed) && unit.len() > self.unit.len())
            .cloned();
    }

    /// Take the suggested unit. Returns false when there was nothing to accept.
    pub(crate) fn accept_suggestion(&mut self) -> bool {
        match self.suggestion.take() {
            Some(unit) if self.active == ExerciseField::Unit => {
                self.unit = unit;
                true
            }
            _ => false,
        }
    }

    fn suggestion_suffix(&self) -> Option<String> {
        let candidate = self.suggestion.as_ref()?;
        let suffix: String = candidate.chars().skip(self.unit.chars().count()).collect();
        (!suffix.is_empty()).then_some(suffix)
    }

    pub(crate) fn build_line(&self, field: ExerciseField) -> Line<'static> {
        let placeholder = if field == ExerciseField::Unit {
            "<optional>"
        } else {
            "<required>"
        };
        let suffix = if field == ExerciseField::Unit {
            self.suggestion_suffix()
        } else {
            None
        };
        field_line(
            field.label(),
            self.value(field),
            placeholder,
            self.active == field,
            suffix,
        )
    }

    pub(crate) fn value_len(&self, field: ExerciseField) -> usize {
        self.value(field).chars().count()
    }
}

/// Fields of the edit popup. Name and day are fixed once created.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum EditField {
    #[default]
    Weight,
    Unit,
    RepMin,
    RepMax,
    RepsDone,
}

impl EditField {
    pub(crate) const ORDER: [EditField; 5] = [
        EditField::Weight,
        EditField::Unit,
        EditField::RepMin,
        EditField::RepMax,
        EditField::RepsDone,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            EditField::Weight => "Weight",
            EditField::Unit => "Unit",
            EditField::RepMin => "Rep range min",
            EditField::RepMax => "Rep range max",
            EditField::RepsDone => "Reps done",
        }
    }

    fn kind(self) -> InputKind {
        match self {
            EditField::Unit => InputKind::Text,
            EditField::Weight => InputKind::Decimal,
            EditField::RepMin | EditField::RepMax | EditField::RepsDone => InputKind::Integer,
        }
    }
}

/// Edit popup prefilled from a stored exercise.
#[derive(Clone)]
pub(crate) struct EditForm {
    pub(crate) exercise: String,
    pub(crate) weight: String,
    pub(crate) unit: String,
    pub(crate) rep_min: String,
    pub(crate) rep_max: String,
    pub(crate) reps_done: String,
    pub(crate) active: EditField,
    pub(crate) error: Option<String>,
}

impl EditForm {
    pub(crate) fn from_record(record: &ExerciseRecord) -> Self {
        Self {
            exercise: record.exercise.clone(),
            weight: record.weight.clone(),
            unit: record.unit.clone(),
            rep_min: record.rep_range_min.clone(),
            rep_max: record.rep_range_max.clone(),
            reps_done: record.reps_done.to_string(),
            active: EditField::default(),
            error: None,
        }
    }

    fn value(&self, field: EditField) -> &String {
        match field {
            EditField::Weight => &self.weight,
            EditField::Unit => &self.unit,
            EditField::RepMin => &self.rep_min,
            EditField::RepMax => &self.rep_max,
            EditField::RepsDone => &self.reps_done,
        }
    }

    fn value_mut(&mut self, field: EditField) -> &mut String {
        match field {
            EditField::Weight => &mut self.weight,
            EditField::Unit => &mut self.unit,
            EditField::RepMin => &mut self.rep_min,
            EditField::RepMax => &mut self.rep_max,
            EditField::RepsDone => &mut self.reps_done,
        }
    }

    pub(crate) fn cycle_field(&mut self, forward: bool) {
        let len = EditField::ORDER.len();
        let pos = EditField::ORDER
            .iter()
            .position(|f| *f == self.active)
            .unwrap_or(0);
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        self.active = EditField::ORDER[next];
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let field = self.active;
        if !field.kind().accepts(ch, self.value(field)) {
            return false;
        }
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// One update per field that differs from the stored record. Text fields
    /// are stored as typed; reps done must be a whole number.
    pub(crate) fn changes(&self, record: &ExerciseRecord) -> Result<Vec<FieldUpdate>> {
        let reps_done = self
            .reps_done
            .trim()
            .parse::<u32>()
            .context("Reps done must be a whole number.")?;

        let mut updates = Vec::new();
        if self.weight != record.weight {
            updates.push(FieldUpdate::Weight(self.weight.clone()));
        }
        if self.unit != record.unit {
            updates.push(FieldUpdate::Unit(self.unit.clone()));
        }
        if self.rep_min != record.rep_range_min {
            updates.push(FieldUpdate::RepRangeMin(self.rep_min.clone()));
        }
        if self.rep_max != record.rep_range_max {
            updates.push(FieldUpdate::RepRangeMax(self.rep_max.clone()));
        }
        if reps_done != record.reps_done {
            updates.push(FieldUpdate::RepsDone(reps_done));
        }
        Ok(updates)
    }

    pub(crate) fn build_line(&self, field: EditField) -> Line<'static> {
        field_line(
            field.label(),
            self.value(field),
            "<empty>",
            self.active == field,
            None,
        )
    }

    pub(crate) fn value_len(&self, field: EditField) -> usize {
        self.value(field).chars().count()
    }
}

/// Single-line path prompt used by import.
#[derive(Clone)]
pub(crate) struct ImportForm {
    pub(crate) path: String,
    pub(crate) error: Option<String>,
}

impl ImportForm {
    pub(crate) fn with_path(path: String) -> Self {
        Self { path, error: None }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.path.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.path.pop();
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        field_line("File", &self.path, "<path to exercises.json>", true, None)
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmExerciseDelete {
    pub(crate) id: i64,
    pub(crate) exercise: String,
    pub(crate) day: Day,
}

impl ConfirmExerciseDelete {
    pub(crate) fn from(record: &ExerciseRecord) -> Self {
        Self {
            id: record.id,
            exercise: record.exercise.clone(),
            day: record.day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ExerciseRecord {
        ExerciseRecord {
            id: 1,
            day: Day::Monday,
            exercise: "Squat".into(),
            weight: "100".into(),
            unit: "kg".into(),
            rep_range_min: "5".into(),
            rep_range_max: "8".into(),
            reps_done: 0,
        }
    }

    #[test]
    fn numeric_fields_filter_characters() {
        let mut form = ExerciseForm::default();
        form.cycle_field(true);
        assert!(form.push_char('6'));
        assert!(form.push_char('.'));
        assert!(!form.push_char('.'));
        assert!(!form.push_char('x'));
        assert!(form.push_char('5'));
        assert_eq!(form.weight, "6.5");

        form.active = ExerciseField::RepMin;
        assert!(!form.push_char('.'));
        assert!(form.push_char('8'));
        assert_eq!(form.rep_min, "8");
    }

    #[test]
    fn cycling_wraps_in_both_directions() {
        let mut form = ExerciseForm::default();
        form.cycle_field(false);
        assert!(form.active == ExerciseField::RepMax);
        form.cycle_field(true);
        assert!(form.active == ExerciseField::Name);
    }

    #[test]
    fn unit_suggestion_completes_known_units() {
        let units = vec!["kg".to_string(), "lb".to_string()];
        let mut form = ExerciseForm {
            active: ExerciseField::Unit,
            ..ExerciseForm::default()
        };
        form.push_char('k');
        form.update_suggestion(&units);
        assert_eq!(form.suggestion.as_deref(), Some("kg"));
        assert_eq!(form.suggestion_suffix().as_deref(), Some("g"));
        assert!(form.accept_suggestion());
        assert_eq!(form.unit, "kg");
        assert!(!form.accept_suggestion());
    }

    #[test]
    fn edit_form_reports_only_changed_fields() {
        let record = record();
        let mut form = EditForm::from_record(&record);
        assert!(form.changes(&record).unwrap().is_empty());

        form.weight = "105".into();
        form.reps_done = "6".into();
        assert_eq!(
            form.changes(&record).unwrap(),
            vec![
                FieldUpdate::Weight("105".into()),
                FieldUpdate::RepsDone(6)
            ]
        );
    }

    #[test]
    fn edit_form_rejects_blank_reps_done() {
        let record = record();
        let mut form = EditForm::from_record(&record);
        form.reps_done.clear();
        assert!(form.changes(&record).is_err());
    }
}
