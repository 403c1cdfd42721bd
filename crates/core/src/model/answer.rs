use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

//
// ─── ANSWER VALUES ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("invalid date answer: {raw}")]
    InvalidDate { raw: String },
}

/// A selected file handle: name plus size in bytes. The file contents stay
/// with the upload collaborator; the answer store only tracks the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRef {
    pub name: String,
    pub size: u64,
}

impl FileRef {
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Typed answer to a single question.
///
/// Serializes untagged into the step service's wire forms: booleans and
/// strings as-is, dates as zero-padded `YYYY-MM-DD`, file selections as a
/// list of `{name, size}` objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
    Date(NaiveDate),
    Files(Vec<FileRef>),
}

impl AnswerValue {
    /// Parses a `YYYY-MM-DD` string into a date answer.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::InvalidDate` if the string is not a valid
    /// calendar date in that form.
    pub fn parse_date(raw: &str) -> Result<Self, AnswerError> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| AnswerError::InvalidDate {
                raw: raw.to_string(),
            })
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for AnswerValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<FileRef>> for AnswerValue {
    fn from(value: Vec<FileRef>) -> Self {
        Self::Files(value)
    }
}

/// In-progress answers for the active step, keyed by question code.
///
/// Keys are always a subset of the active step's question codes; the store
/// is cleared wholesale on every step transition.
pub type Answers = HashMap<String, AnswerValue>;
