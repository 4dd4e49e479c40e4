//! JSON export and import of the whole exercise log.
//!
//! Export writes every record as a pretty-printed JSON array. Import accepts
//! that format as well as hand-edited files where numeric fields may be
//! strings or numbers. Each array element is
//! validated on its own: bad elements are quarantined in
//! [`ImportBatch::rejected`] and the rest are applied in one transaction.

use std::fmt;

use rusqlite::{params, Connection};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, StorageContext, StoreError};
use crate::models::{Day, ExerciseRecord};

use super::exercises::exercise_exists;

/// Default file name for exports.
pub const EXPORT_FILE_NAME: &str = "exercises.json";

/// Largest id an import may carry (2^53 - 1). Anything near `i64::MAX` would
/// exhaust the `AUTOINCREMENT` sequence and make every later `add` fail.
pub const MAX_IMPORT_ID: i64 = (1 << 53) - 1;

/// A validated import element, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// Entries without an id get a fresh one, like a newly added exercise.
    pub id: Option<i64>,
    pub day: Day,
    pub exercise: String,
    pub weight: String,
    pub unit: String,
    pub rep_range_min: String,
    pub rep_range_max: String,
    pub reps_done: u32,
}

/// An element of the import array that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// Zero-based position in the source array.
    pub index: usize,
    pub reason: String,
}

impl fmt::Display for RejectedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry {}: {}", self.index, self.reason)
    }
}

/// Result of parsing an import payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportBatch {
    pub entries: Vec<ImportEntry>,
    pub rejected: Vec<RejectedEntry>,
}

/// What an import changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Entries written under an id that did not exist yet (or a fresh id).
    pub inserted: usize,
    /// Entries that overwrote an existing exercise with the same id.
    pub replaced: usize,
    pub rejected: Vec<RejectedEntry>,
}

impl ImportSummary {
    pub fn applied(&self) -> usize {
        self.inserted + self.replaced
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Imported {} exercises ({} new, {} replaced, {} rejected).",
            self.applied(),
            self.inserted,
            self.replaced,
            self.rejected.len()
        )
    }
}

/// Text or number. Older exports stored form input verbatim, so the same
/// field can show up either way.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Loose {
    Text(String),
    Number(serde_json::Number),
}

impl Loose {
    fn into_text(self) -> String {
        match self {
            Loose::Text(text) => text,
            Loose::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    id: Option<i64>,
    day: Option<String>,
    exercise: Option<Loose>,
    weight: Option<Loose>,
    unit: Option<Loose>,
    rep_range_min: Option<Loose>,
    rep_range_max: Option<Loose>,
    reps_done: Option<Loose>,
}

/// The exercise name is the only text field that can never be blank: `add`
/// rejects it and no update path can change it afterwards.
fn exercise_name(value: Option<Loose>) -> std::result::Result<String, String> {
    let text = value.map(Loose::into_text).unwrap_or_default();
    if text.trim().is_empty() {
        Err("exercise is missing".to_string())
    } else {
        Ok(text)
    }
}

/// Present but possibly empty. `update_field` stores text as given, so an
/// export can hold blank weights and rep bounds that must import unchanged.
fn stored_text(value: Option<Loose>, field: &str) -> std::result::Result<String, String> {
    value
        .map(Loose::into_text)
        .ok_or_else(|| format!("{field} is missing"))
}

fn reps_count(value: Option<Loose>) -> std::result::Result<u32, String> {
    let text = match value {
        None => return Ok(0),
        Some(value) => value.into_text(),
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse::<u32>()
        .map_err(|_| format!("repsDone must be a whole number, got '{text}'"))
}

impl RawEntry {
    fn validate(self) -> std::result::Result<ImportEntry, String> {
        if let Some(id) = self.id.filter(|id| *id <= 0) {
            return Err(format!("id must be positive, got {id}"));
        }
        if let Some(id) = self.id.filter(|id| *id > MAX_IMPORT_ID) {
            return Err(format!("id must be at most {MAX_IMPORT_ID}, got {id}"));
        }
        let day = self
            .day
            .ok_or_else(|| "day is missing".to_string())?
            .parse::<Day>()
            .map_err(|err| err.to_string())?;

        Ok(ImportEntry {
            id: self.id,
            day,
            exercise: exercise_name(self.exercise)?,
            weight: stored_text(self.weight, "weight")?,
            unit: self.unit.map(Loose::into_text).unwrap_or_default(),
            rep_range_min: stored_text(self.rep_range_min, "repRangeMin")?,
            rep_range_max: stored_text(self.rep_range_max, "repRangeMax")?,
            reps_done: reps_count(self.reps_done)?,
        })
    }
}

/// Parse an import payload. Only a payload that is not a JSON array fails as a
/// whole; individual bad elements are collected in `rejected`.
pub fn parse_import(text: &str) -> Result<ImportBatch> {
    let value: Value = serde_json::from_str(text).map_err(|err| StoreError::MalformedImport {
        message: err.to_string(),
    })?;
    let Value::Array(items) = value else {
        return Err(StoreError::MalformedImport {
            message: "expected a JSON array of exercises".to_string(),
        });
    };

    let mut batch = ImportBatch::default();
    for (index, item) in items.into_iter().enumerate() {
        let parsed = serde_json::from_value::<RawEntry>(item)
            .map_err(|err| err.to_string())
            .and_then(RawEntry::validate);
        match parsed {
            Ok(entry) => batch.entries.push(entry),
            Err(reason) => {
                tracing::warn!(index, %reason, "rejected import entry");
                batch.rejected.push(RejectedEntry { index, reason });
            }
        }
    }
    Ok(batch)
}

/// Write every entry of the batch inside a single transaction. Entries with an
/// id replace whatever is stored under it; entries without one are inserted
/// with a store-assigned id.
pub(crate) fn apply_import(conn: &Connection, batch: &ImportBatch) -> Result<ImportSummary> {
    let tx = conn
        .unchecked_transaction()
        .storage("failed to start import transaction")?;

    let mut summary = ImportSummary {
        rejected: batch.rejected.clone(),
        ..ImportSummary::default()
    };

    for entry in &batch.entries {
        let existed = match entry.id {
            Some(id) => exercise_exists(&tx, id)?,
            None => false,
        };

        tx.execute(
            "INSERT OR REPLACE INTO exercises
                 (id, day, exercise, weight, unit, rep_range_min, rep_range_max, reps_done)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.id,
                entry.day,
                entry.exercise,
                entry.weight,
                entry.unit,
                entry.rep_range_min,
                entry.rep_range_max,
                entry.reps_done
            ],
        )
        .storage("failed to store imported exercise")?;

        if existed {
            summary.replaced += 1;
        } else {
            summary.inserted += 1;
        }
    }

    tx.commit().storage("failed to commit import")?;
    Ok(summary)
}

/// Pretty-printed JSON array, two-space indented.
pub(crate) fn render_export(records: &[ExerciseRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}
