//! Todo record and its wire and storage representations.
//!
//! # Design
//! `start_time` and `end_time` travel as `datetime-local` strings
//! (`YYYY-MM-DDTHH:MM`, no seconds, no offset) and are stored in nullable
//! columns. "Not set" is `None` at every layer: `null` on the wire, `NULL`
//! in the table. There is no zero-date sentinel.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Wire format for the optional start and end times.
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// A todo as stored in the `todos` table and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "local_time")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default, with = "local_time")]
    pub end_time: Option<NaiveDateTime>,
    pub progress: f64,
}

/// Request body for create and update.
///
/// Every field is optional in JSON and falls back to its zero value, whether
/// the key is missing or `null`. `id` and `created_at` are owned by storage,
/// so they are ignored if present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoInput {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(with = "local_time")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(with = "local_time")]
    pub end_time: Option<NaiveDateTime>,
    #[serde(deserialize_with = "null_as_default")]
    pub progress: f64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Progress must be between 0 and 100")]
    ProgressOutOfRange(f64),
}

impl TodoInput {
    /// Checks applied before an insert: a title and an in-range progress.
    pub fn validate_create(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        self.validate_update()
    }

    /// Checks applied before an update. An empty title is accepted here.
    pub fn validate_update(&self) -> Result<(), ValidationError> {
        if !(0.0..=100.0).contains(&self.progress) {
            return Err(ValidationError::ProgressOutOfRange(self.progress));
        }
        Ok(())
    }

    pub fn into_todo(self, id: i64, created_at: DateTime<Utc>) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            completed: self.completed,
            created_at,
            start_time: self.start_time,
            end_time: self.end_time,
            progress: self.progress,
        }
    }
}

/// Serde adapter for `Option<NaiveDateTime>` in `datetime-local` form.
///
/// Decoding accepts a matching string, an empty string, `null`, or an
/// absent key (with `#[serde(default)]`). Anything else fails the whole
/// record.
pub mod local_time {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::LOCAL_TIME_FORMAT;

    /// Parses exactly `YYYY-MM-DDTHH:MM`: four-digit year, two-digit
    /// month, day, hour and minute. chrono alone accepts short fields and
    /// signed years, so the layout is checked first.
    pub fn parse(raw: &str) -> Result<NaiveDateTime, String> {
        if !has_layout(raw.as_bytes()) {
            return Err(format!("expected YYYY-MM-DDTHH:MM, got {raw:?}"));
        }
        NaiveDateTime::parse_from_str(raw, LOCAL_TIME_FORMAT)
            .map_err(|e| format!("invalid datetime-local {raw:?}: {e}"))
    }

    fn has_layout(bytes: &[u8]) -> bool {
        bytes.len() == 16
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                10 => *b == b'T',
                13 => *b == b':',
                _ => b.is_ascii_digit(),
            })
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.collect_str(&time.format(LOCAL_TIME_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => parse(s).map(Some).map_err(de::Error::custom),
        }
    }
}
