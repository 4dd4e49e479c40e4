//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. These types stay light-weight data holders so other layers can focus on
//! presentation and persistence logic. The JSON shape of [`ExerciseRecord`] is
//! also the export file format, so field renames here are format changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the seven days an exercise can be scheduled on. Stored and exported
/// as the capitalized English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Day {
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Week order, Monday first.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    /// Position within [`Day::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Day> {
        Day::ALL.get(index).copied()
    }

    /// The following day, wrapping from Sunday back to Monday.
    pub fn next(self) -> Day {
        Day::ALL[(self.index() + 1) % Day::ALL.len()]
    }

    /// The preceding day, wrapping from Monday back to Sunday.
    pub fn previous(self) -> Day {
        Day::ALL[(self.index() + Day::ALL.len() - 1) % Day::ALL.len()]
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when text does not name a weekday.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a day of the week")]
pub struct ParseDayError(pub String);

impl FromStr for Day {
    type Err = ParseDayError;

    /// Case-insensitive so CLI arguments like `monday` work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Day::ALL
            .iter()
            .copied()
            .find(|day| day.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseDayError(s.to_string()))
    }
}

/// A single logged exercise for one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    /// Primary key assigned by the store. Edit and delete flows bubble it back
    /// to the persistence layer.
    pub id: i64,
    pub day: Day,
    /// Exercise name as typed by the user.
    pub exercise: String,
    /// Kept as text and shown verbatim. The forms only type digits and a dot,
    /// but imported files may carry anything.
    pub weight: String,
    /// Optional unit label (`kg`, `lb`, ...). Empty when not provided.
    pub unit: String,
    pub rep_range_min: String,
    pub rep_range_max: String,
    pub reps_done: u32,
}

impl ExerciseRecord {
    /// `100 kg` or just `100` when no unit was entered.
    pub fn weight_label(&self) -> String {
        let unit = self.unit.trim();
        if unit.is_empty() {
            self.weight.clone()
        } else {
            format!("{} {}", self.weight, unit)
        }
    }

    /// `5-8` style range used in cards and CLI listings.
    pub fn rep_range_label(&self) -> String {
        format!("{}-{}", self.rep_range_min, self.rep_range_max)
    }
}

/// Raw form input for creating an exercise. Values are trimmed and validated by
/// the store, not here, so the UI can hand over exactly what the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewExercise {
    pub exercise: String,
    pub weight: String,
    pub unit: String,
    pub rep_range_min: String,
    pub rep_range_max: String,
}

/// The only fields that may change after an exercise is created. Each variant
/// carries a value of the type the column stores, so unknown fields and
/// mistyped counters are rejected before they reach the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Weight(String),
    Unit(String),
    RepRangeMin(String),
    RepRangeMax(String),
    RepsDone(u32),
}

/// Rejection produced by [`FieldUpdate::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldUpdateError {
    #[error("unknown exercise field '{0}'")]
    UnknownField(String),
    #[error("reps done must be a whole number, got '{0}'")]
    InvalidCount(String),
}

impl FieldUpdate {
    /// Build an update from the JSON-style field name used in export files
    /// (`weight`, `unit`, `repRangeMin`, `repRangeMax`, `repsDone`).
    pub fn parse(field: &str, value: &str) -> Result<Self, FieldUpdateError> {
        match field {
            "weight" => Ok(FieldUpdate::Weight(value.to_string())),
            "unit" => Ok(FieldUpdate::Unit(value.to_string())),
            "repRangeMin" => Ok(FieldUpdate::RepRangeMin(value.to_string())),
            "repRangeMax" => Ok(FieldUpdate::RepRangeMax(value.to_string())),
            "repsDone" => value
                .trim()
                .parse::<u32>()
                .map(FieldUpdate::RepsDone)
                .map_err(|_| FieldUpdateError::InvalidCount(value.to_string())),
            other => Err(FieldUpdateError::UnknownField(other.to_string())),
        }
    }

    /// Field name as it appears in the export format. Used for log lines.
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldUpdate::Weight(_) => "weight",
            FieldUpdate::Unit(_) => "unit",
            FieldUpdate::RepRangeMin(_) => "repRangeMin",
            FieldUpdate::RepRangeMax(_) => "repRangeMax",
            FieldUpdate::RepsDone(_) => "repsDone",
        }
    }

    /// Apply the update to an in-memory record.
    pub fn apply(&self, record: &mut ExerciseRecord) {
        match self {
            FieldUpdate::Weight(value) => record.weight = value.clone(),
            FieldUpdate::Unit(value) => record.unit = value.clone(),
            FieldUpdate::RepRangeMin(value) => record.rep_range_min = value.clone(),
            FieldUpdate::RepRangeMax(value) => record.rep_range_max = value.clone(),
            FieldUpdate::RepsDone(value) => record.reps_done = *value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_navigation_wraps_around_the_week() {
        assert_eq!(Day::Sunday.next(), Day::Monday);
        assert_eq!(Day::Monday.previous(), Day::Sunday);
        assert_eq!(Day::Wednesday.next(), Day::Thursday);
        assert_eq!(Day::from_index(6), Some(Day::Sunday));
        assert_eq!(Day::from_index(7), None);
    }

    #[test]
    fn day_parses_case_insensitively() {
        assert_eq!("friday".parse::<Day>(), Ok(Day::Friday));
        assert_eq!(" SATURDAY ".parse::<Day>(), Ok(Day::Saturday));
        assert!("Funday".parse::<Day>().is_err());
    }

    #[test]
    fn record_serializes_with_export_field_names() {
        let record = ExerciseRecord {
            id: 3,
            day: Day::Monday,
            exercise: "Squat".into(),
            weight: "100".into(),
            unit: "kg".into(),
            rep_range_min: "5".into(),
            rep_range_max: "8".into(),
            reps_done: 0,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["day"], "Monday");
        assert_eq!(value["repRangeMin"], "5");
        assert_eq!(value["repRangeMax"], "8");
        assert_eq!(value["repsDone"], 0);
        assert_eq!(record.weight_label(), "100 kg");
        assert_eq!(record.rep_range_label(), "5-8");
    }

    #[test]
    fn field_update_rejects_unknown_fields_and_bad_counts() {
        assert_eq!(
            FieldUpdate::parse("repsDone", "6"),
            Ok(FieldUpdate::RepsDone(6))
        );
        assert_eq!(
            FieldUpdate::parse("day", "Tuesday"),
            Err(FieldUpdateError::UnknownField("day".into()))
        );
        assert_eq!(
            FieldUpdate::parse("repsDone", "six"),
            Err(FieldUpdateError::InvalidCount("six".into()))
        );
    }
}
