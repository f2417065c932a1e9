//! Job status lifecycle.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Status of a render job.
///
/// `Error` and `Done` are not terminal: a job may be re-submitted from any
/// state, which moves it back to `Rendering`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    New,
    Rendering,
    Error,
    Done,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::New,
        JobStatus::Rendering,
        JobStatus::Error,
        JobStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::New => "new",
            JobStatus::Rendering => "rendering",
            JobStatus::Error => "error",
            JobStatus::Done => "done",
        }
    }

    /// Whether the farm lifecycle allows moving from `self` to `next`.
    ///
    /// Submission moves any state to `Rendering`; only a farm callback moves
    /// `Rendering` on to `Error` or `Done`. Manual status edits bypass this.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match next {
            JobStatus::Rendering => true,
            JobStatus::Error | JobStatus::Done => *self == JobStatus::Rendering,
            JobStatus::New => *self == JobStatus::New,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(JobStatus::New),
            "rendering" => Ok(JobStatus::Rendering),
            "error" => Ok(JobStatus::Error),
            "done" => Ok(JobStatus::Done),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

impl ToSql for JobStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for JobStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: ValidationError| FromSqlError::Other(Box::new(e)))
    }
}
