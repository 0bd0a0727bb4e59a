//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//! `start_time` / `end_time` use the browser `datetime-local` form
//! (`YYYY-MM-DDTHH:MM`) in both directions and `null` when unset.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
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

/// Request payload for both create and update. Updates replace the whole
/// record, so every field is sent every time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TodoInput {
    pub title: String,
    pub description: String,
    pub completed: bool,
    #[serde(with = "local_time")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(with = "local_time")]
    pub end_time: Option<NaiveDateTime>,
    pub progress: f64,
}

impl From<&Todo> for TodoInput {
    fn from(todo: &Todo) -> Self {
        TodoInput {
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: todo.completed,
            start_time: todo.start_time,
            end_time: todo.end_time,
            progress: todo.progress,
        }
    }
}

impl Todo {
    /// Progress to display at wall-clock time `now`.
    ///
    /// Completed items are 100. A stored progress inside [0, 100] wins.
    /// Otherwise progress is the elapsed share of the start..end window,
    /// clamped to 0 before the start and 100 after the end, and 0 when
    /// either time is missing or the window is empty.
    pub fn effective_progress(&self, now: NaiveDateTime) -> f64 {
        if self.completed {
            return 100.0;
        }
        if (0.0..=100.0).contains(&self.progress) {
            return self.progress;
        }
        let (Some(start), Some(end)) = (self.start_time, self.end_time) else {
            return 0.0;
        };
        if now < start {
            return 0.0;
        }
        if now > end {
            return 100.0;
        }
        let total = (end - start).num_milliseconds();
        if total <= 0 {
            return 0.0;
        }
        let elapsed = (now - start).num_milliseconds();
        elapsed as f64 / total as f64 * 100.0
    }
}

mod local_time {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::LOCAL_TIME_FORMAT;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.collect_str(&time.format(LOCAL_TIME_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)?.as_deref() {
            None | Some("") => Ok(None),
            Some(s) if !fixed_width(s.as_bytes()) => Err(de::Error::custom(format!(
                "expected YYYY-MM-DDTHH:MM, got {s:?}"
            ))),
            Some(s) => NaiveDateTime::parse_from_str(s, LOCAL_TIME_FORMAT)
                .map(Some)
                .map_err(de::Error::custom),
        }
    }

    // Zero-padded fields only; chrono would also take "2024-5-1T1:3".
    fn fixed_width(bytes: &[u8]) -> bool {
        bytes.len() == 16
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                10 => *b == b'T',
                13 => *b == b':',
                _ => b.is_ascii_digit(),
            })
    }
}
