//! JSON file of event rows.
//!
//! The file is read row by row: a row that cannot be read is logged and
//! skipped, and is written back untouched when other rows change. Updates
//! are applied on top of the stored row, so columns this crate does not know
//! about survive an edit.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{HearthError, HearthResult};
use crate::event::{Event, EventRecord, load_events, parse_date};

/// Row columns written from an [`Event`]. `id` is never rewritten.
const RECORD_FIELDS: [&str; 14] = [
    "title",
    "description",
    "location",
    "color",
    "is_all_day",
    "is_recurring",
    "start_time",
    "end_time",
    "specific_date",
    "days_of_week",
    "excluded_dates",
    "source",
    "google_event_id",
    "google_html_link",
];

/// A JSON array of [`EventRecord`]s on disk.
#[derive(Debug, Clone)]
pub struct EventFile {
    path: PathBuf,
}

impl EventFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        EventFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows exactly as stored. A missing file is an empty calendar.
    fn load_rows(&self) -> HearthResult<Vec<Value>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Event file not found, starting empty");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            HearthError::Serialization(format!(
                "Failed to parse events from {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save_rows(&self, rows: &[Value]) -> HearthResult<()> {
        let content = serde_json::to_string_pretty(rows)
            .map_err(|e| HearthError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;

        debug!(path = %self.path.display(), count = rows.len(), "Saved events");
        Ok(())
    }

    /// Readable rows; unreadable ones are skipped with a warning.
    pub fn load_records(&self) -> HearthResult<Vec<EventRecord>> {
        let records: Vec<EventRecord> = self
            .load_rows()?
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match serde_json::from_value(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(path = %self.path.display(), index, "Skipping unreadable event row: {}", e);
                    None
                }
            })
            .collect();
        Ok(records)
    }

    /// Typed events; rows that cannot be read or placed on a date are skipped.
    pub fn load_events(&self) -> HearthResult<Vec<Event>> {
        Ok(load_events(self.load_records()?))
    }

    pub fn find(&self, id: &str) -> HearthResult<Event> {
        self.load_events()?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| HearthError::EventNotFound(id.to_string()))
    }

    /// Replace the event with the same id, or append it.
    pub fn upsert(&self, event: &Event) -> HearthResult<()> {
        let mut rows = self.load_rows()?;
        let record = EventRecord::from(event);

        match rows
            .iter_mut()
            .find(|row| row_id(row).as_deref() == Some(event.id.as_str()))
        {
            Some(Value::Object(existing)) => overlay(existing, &record)?,
            Some(other) => *other = record_value(&record)?,
            None => rows.push(record_value(&record)?),
        }

        self.save_rows(&rows)
    }

    pub fn remove(&self, id: &str) -> HearthResult<()> {
        let mut rows = self.load_rows()?;
        let before = rows.len();
        rows.retain(|row| row_id(row).as_deref() != Some(id));

        if rows.len() == before {
            return Err(HearthError::EventNotFound(id.to_string()));
        }

        self.save_rows(&rows)
    }
}

/// Row ids may be stored as strings or numbers.
fn row_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn record_value(record: &EventRecord) -> HearthResult<Value> {
    serde_json::to_value(record).map_err(|e| HearthError::Serialization(e.to_string()))
}

/// Stored exclusions that don't parse as dates, kept so an edit never
/// drops them.
fn unparsed_exclusions(stored: Option<&Value>) -> Vec<Value> {
    let is_unparsed = |v: &Value| v.as_str().and_then(parse_date).is_none();
    match stored {
        Some(Value::Array(items)) => items.iter().filter(|v| is_unparsed(v)).cloned().collect(),
        Some(v @ Value::String(_)) if is_unparsed(v) => vec![v.clone()],
        _ => Vec::new(),
    }
}

/// Write `record` over an existing row. Fields the record leaves out are
/// cleared if the row has them, except `source`.
fn overlay(existing: &mut Map<String, Value>, record: &EventRecord) -> HearthResult<()> {
    let kept = unparsed_exclusions(existing.get("excluded_dates"));

    let Value::Object(fields) = record_value(record)? else {
        return Err(HearthError::Serialization(
            "event record did not serialize to an object".into(),
        ));
    };

    for key in RECORD_FIELDS {
        match fields.get(key) {
            Some(value) => {
                existing.insert(key.to_string(), value.clone());
            }
            None if key != "source" && existing.contains_key(key) => {
                existing.insert(key.to_string(), Value::Null);
            }
            None => {}
        }
    }

    if !kept.is_empty()
        && let Some(Value::Array(dates)) = existing.get_mut("excluded_dates")
    {
        dates.extend(kept);
    }
    Ok(())
}
