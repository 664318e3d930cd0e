//! In-memory session store.
//!
//! Backs tests and `--memory` servers. Keeps insertion order so records
//! completed within the same instant still come back newest first.

use chrono::{NaiveDate, Utc};

use super::{NewSession, ProgressStore, SessionRecord, SessionStore};
use crate::error::Result;
use crate::timer::DailyProgress;

#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Vec<SessionRecord>,
    progress: Option<DailyProgress>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Insert an already-built record as is. Used to seed fixtures with
    /// fixed timestamps.
    pub fn insert(&mut self, record: SessionRecord) {
        self.sessions.push(record);
    }
}

impl SessionStore for MemoryStore {
    fn create_session(&mut self, session: NewSession) -> Result<SessionRecord> {
        let record = session.into_record(Utc::now())?;
        self.sessions.push(record.clone());
        Ok(record)
    }

    fn sessions_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<SessionRecord>> {
        let mut found: Vec<SessionRecord> = self
            .sessions
            .iter()
            .rev()
            .filter(|s| s.date >= start && s.date <= end)
            .cloned()
            .collect();
        // Stable sort: equal timestamps keep newest-inserted first.
        found.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(found)
    }
}

impl ProgressStore for MemoryStore {
    fn load_progress(&self) -> Result<Option<DailyProgress>> {
        Ok(self.progress)
    }

    fn save_progress(&mut self, progress: &DailyProgress) -> Result<()> {
        self.progress = Some(*progress);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use crate::timer::Phase;
    use chrono::{Duration, TimeZone};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn create_then_query_by_date() {
        let mut store = MemoryStore::new();
        let created = store
            .create_session(NewSession::completed(Phase::Work, 25, d(1)))
            .unwrap();
        assert_eq!(store.sessions_by_date(d(1)).unwrap(), vec![created]);
        assert!(store.sessions_by_date(d(2)).unwrap().is_empty());
    }

    #[test]
    fn invalid_duration_is_rejected_and_not_stored() {
        let mut store = MemoryStore::new();
        let err = store
            .create_session(NewSession {
                duration: 0,
                ..NewSession::completed(Phase::Work, 1, d(1))
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::InvalidDuration(0))));
        assert!(store.is_empty());
    }

    #[test]
    fn range_is_inclusive_and_newest_first() {
        let mut store = MemoryStore::new();
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        for (i, day) in [1, 2, 3, 4].into_iter().enumerate() {
            let mut record = NewSession::completed(Phase::Work, 25, d(day))
                .into_record(base + Duration::days(i as i64))
                .unwrap();
            record.id = format!("s{day}");
            store.insert(record);
        }
        let ids: Vec<String> = store
            .sessions_by_date_range(d(2), d(3))
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["s3", "s2"]);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order_reversed() {
        let mut store = MemoryStore::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        for id in ["a", "b", "c"] {
            let mut record = NewSession::completed(Phase::Break, 5, d(1)).into_record(at).unwrap();
            record.id = id.into();
            store.insert(record);
        }
        let ids: Vec<String> = store.sessions_by_date(d(1)).unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn convenience_windows() {
        let mut store = MemoryStore::new();
        // 2024-01-10 is a Wednesday; the week began Sunday 2024-01-07.
        for day in [6, 7, 10] {
            store.create_session(NewSession::completed(Phase::Work, 25, d(day))).unwrap();
        }
        assert_eq!(store.sessions_this_week(d(10)).unwrap().len(), 2);
        assert_eq!(store.sessions_last_30_days(d(10)).unwrap().len(), 3);
    }

    #[test]
    fn progress_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.load_progress().unwrap().is_none());
        let p = DailyProgress {
            date: d(1),
            completed_work_sessions: 2,
            total_completed: 2,
        };
        store.save_progress(&p).unwrap();
        assert_eq!(store.load_progress().unwrap(), Some(p));
    }
}
