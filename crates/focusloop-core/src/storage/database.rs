//! SQLite-based session storage.
//!
//! Provides persistent storage for:
//! - Finished sessions (append-only)
//! - Key-value store for application state (daily counters, CLI timer state)

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

use super::{data_dir, migrations, NewSession, ProgressStore, SessionRecord, SessionStore};
use crate::error::{CoreError, DatabaseError, Result};
use crate::timer::DailyProgress;

const PROGRESS_KEY: &str = "daily_progress";

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/focusloop/focusloop.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("focusloop.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Total number of stored sessions.
    pub fn session_count(&self) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(u64::try_from(n).unwrap_or(0))
    }
}

type RawRow = (String, String, i64, bool, String, String);

fn decode_row(raw: RawRow) -> Result<SessionRecord> {
    let (id, session_type, duration, was_completed, date, completed_at) = raw;
    let corrupt = |message: String| {
        CoreError::Database(DatabaseError::CorruptRow {
            table: "sessions".into(),
            message,
        })
    };
    Ok(SessionRecord {
        session_type: session_type
            .parse()
            .map_err(|e| corrupt(format!("{id}: {e}")))?,
        duration: u32::try_from(duration)
            .map_err(|_| corrupt(format!("{id}: duration {duration}")))?,
        was_completed,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| corrupt(format!("{id}: date {date}: {e}")))?,
        completed_at: DateTime::parse_from_rfc3339(&completed_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| corrupt(format!("{id}: completed_at {completed_at}: {e}")))?,
        id,
    })
}

impl SessionStore for Database {
    fn create_session(&mut self, session: NewSession) -> Result<SessionRecord> {
        let record = session.into_record(Utc::now())?;
        self.conn.execute(
            "INSERT INTO sessions (id, session_type, duration, was_completed, date, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.session_type.as_str(),
                record.duration,
                record.was_completed,
                record.date.format("%Y-%m-%d").to_string(),
                record.completed_at.to_rfc3339(),
            ],
        )?;
        Ok(record)
    }

    fn sessions_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_type, duration, was_completed, date, completed_at
             FROM sessions
             WHERE date >= ?1 AND date <= ?2
             ORDER BY completed_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(
            params![
                start.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string()
            ],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )?;

        let mut records = Vec::new();
        for row in rows {
            records.push(decode_row(row?)?);
        }
        Ok(records)
    }
}

impl ProgressStore for Database {
    fn load_progress(&self) -> Result<Option<DailyProgress>> {
        match self.kv_get(PROGRESS_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_progress(&mut self, progress: &DailyProgress) -> Result<()> {
        let json = serde_json::to_string(progress)?;
        self.kv_set(PROGRESS_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::timer::Phase;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn record_and_query() {
        let mut db = Database::open_memory().unwrap();
        let created = db
            .create_session(NewSession::completed(Phase::Work, 25, d(1)))
            .unwrap();
        let found = db.sessions_by_date_range(d(1), d(1)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, created.id);
        assert_eq!(found[0].duration, 25);
        assert_eq!(found[0].session_type, Phase::Work);
        assert!(found[0].was_completed);
        assert_eq!(db.session_count().unwrap(), 1);
    }

    #[test]
    fn skipped_flag_persists() {
        let mut db = Database::open_memory().unwrap();
        db.create_session(NewSession {
            was_completed: Some(false),
            ..NewSession::completed(Phase::Break, 3, d(2))
        })
        .unwrap();
        let found = db.sessions_by_date(d(2)).unwrap();
        assert!(!found[0].was_completed);
    }

    #[test]
    fn validation_error_leaves_table_untouched() {
        let mut db = Database::open_memory().unwrap();
        let err = db
            .create_session(NewSession {
                duration: -1,
                ..NewSession::completed(Phase::Work, 1, d(1))
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::InvalidDuration(-1))));
        assert_eq!(db.session_count().unwrap(), 0);
    }

    #[test]
    fn range_excludes_outside_days() {
        let mut db = Database::open_memory().unwrap();
        for day in [1, 2, 3, 5] {
            db.create_session(NewSession::completed(Phase::Work, 25, d(day)))
                .unwrap();
        }
        let found = db.sessions_by_date_range(d(2), d(4)).unwrap();
        let days: Vec<NaiveDate> = found.iter().map(|s| s.date).collect();
        assert_eq!(days, vec![d(3), d(2)]);
    }

    #[test]
    fn corrupt_row_is_reported() {
        let db = Database::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO sessions (id, session_type, duration, date, completed_at)
                 VALUES ('bad', 'nap', 5, '2024-01-01', '2024-01-01T00:00:00+00:00')",
                [],
            )
            .unwrap();
        let err = db.sessions_by_date(d(1)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Database(DatabaseError::CorruptRow { .. })
        ));
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn progress_persists_in_kv() {
        let mut db = Database::open_memory().unwrap();
        let p = DailyProgress {
            date: d(9),
            completed_work_sessions: 5,
            total_completed: 5,
        };
        db.save_progress(&p).unwrap();
        assert_eq!(db.load_progress().unwrap(), Some(p));
    }
}
