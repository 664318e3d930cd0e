use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::timer::Phase;

/// A finished session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub session_type: Phase,
    /// Minutes.
    pub duration: u32,
    pub was_completed: bool,
    /// Calendar day the session is grouped under.
    pub date: NaiveDate,
    pub completed_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Completed work: the only kind that counts toward streaks and goals.
    pub fn is_qualifying(&self) -> bool {
        self.session_type.is_work() && self.was_completed
    }
}

/// Payload accepted by a store's `create_session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub session_type: Phase,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_completed: Option<bool>,
    pub date: NaiveDate,
}

impl NewSession {
    /// A session that ran to the end.
    pub fn completed(session_type: Phase, duration: u32, date: NaiveDate) -> Self {
        Self {
            session_type,
            duration: i64::from(duration),
            was_completed: Some(true),
            date,
        }
    }

    /// Checked duration in minutes.
    ///
    /// # Errors
    /// `InvalidDuration` unless `0 < duration <= u32::MAX`.
    pub fn validate(&self) -> Result<u32, ValidationError> {
        match u32::try_from(self.duration) {
            Ok(minutes) if minutes > 0 => Ok(minutes),
            _ => Err(ValidationError::InvalidDuration(self.duration)),
        }
    }

    /// Assign an id and completion time.
    ///
    /// # Errors
    /// Propagates [`NewSession::validate`] failures.
    pub fn into_record(self, completed_at: DateTime<Utc>) -> Result<SessionRecord, ValidationError> {
        let duration = self.validate()?;
        Ok(SessionRecord {
            id: Uuid::new_v4().to_string(),
            session_type: self.session_type,
            duration,
            was_completed: self.was_completed.unwrap_or(true),
            date: self.date,
            completed_at,
        })
    }
}
