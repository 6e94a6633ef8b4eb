//! SQLite-backed storage: recorded sessions, user preferences, the sound
//! catalog, and a small key-value store for persisting the countdown
//! engine between CLI invocations.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::session::{Preferences, PreferencesSource, SessionSink, SessionStats, StatsSource};

/// A sound asset from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sound {
    pub id: i64,
    pub name: String,
    /// "bell", "ambience", "nature", ...
    pub category: String,
    pub file_path: String,
    pub is_default: bool,
}

/// SQLite database at `~/.config/mindful/mindful.db`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database, creating file and schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("mindful.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sessions (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    duration_min INTEGER NOT NULL,
                    completed    INTEGER NOT NULL DEFAULT 1,
                    started_at   TEXT NOT NULL,
                    created_at   TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS sounds (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    name       TEXT NOT NULL,
                    category   TEXT NOT NULL,
                    file_path  TEXT NOT NULL,
                    is_default INTEGER NOT NULL DEFAULT 0
                );

                -- Single-user deployment: one row, fixed id.
                CREATE TABLE IF NOT EXISTS preferences (
                    id                    INTEGER PRIMARY KEY CHECK (id = 1),
                    preparation_secs      INTEGER NOT NULL DEFAULT 10,
                    default_duration_secs INTEGER NOT NULL DEFAULT 600,
                    end_sound_id          INTEGER REFERENCES sounds(id),
                    background_image      TEXT NOT NULL DEFAULT 'default',
                    daily_goal_secs       INTEGER NOT NULL DEFAULT 600,
                    weekly_goal_secs      INTEGER NOT NULL DEFAULT 1800
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_created_at ON sessions(created_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        self.seed_sounds()?;
        Ok(())
    }

    /// Seed the catalog with the two stock assets on first run.
    fn seed_sounds(&self) -> Result<(), DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sounds", [], |row| row.get(0))?;
        if count == 0 {
            self.conn.execute_batch(
                "INSERT INTO sounds (name, category, file_path, is_default) VALUES
                    ('Singing Bowl', 'bell', 'sounds/sound-bowl.mp3', 1),
                    ('Ocean Waves', 'ambience', 'sounds/waves-loop.mp3', 1);",
            )?;
        }
        Ok(())
    }

    /// Record a session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn insert_session(
        &self,
        duration_min: u32,
        completed: bool,
        started_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions (duration_min, completed, started_at, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                duration_min,
                completed,
                started_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn session_count(&self) -> Result<u64, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn sounds(&self) -> Result<Vec<Sound>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, category, file_path, is_default FROM sounds ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Sound {
                id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
                file_path: row.get(3)?,
                is_default: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Resolve a catalog sound's file path by id.
    pub fn sound_path(&self, id: i64) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT file_path FROM sounds WHERE id = ?1")?;
        let result = stmt.query_row(params![id], |row| row.get::<_, String>(0));
        match result {
            Ok(path) => Ok(Some(path)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the preferences row, or defaults if none was saved yet.
    pub fn load_preferences(&self) -> Result<Preferences, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT preparation_secs, default_duration_secs, end_sound_id,
                    background_image, daily_goal_secs, weekly_goal_secs
             FROM preferences WHERE id = 1",
        )?;
        let result = stmt.query_row([], |row| {
            Ok(Preferences {
                preparation_secs: row.get(0)?,
                default_duration_secs: row.get(1)?,
                end_sound_id: row.get(2)?,
                background_image: row.get(3)?,
                daily_goal_secs: row.get(4)?,
                weekly_goal_secs: row.get(5)?,
            })
        });
        match result {
            Ok(prefs) => Ok(prefs),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Preferences::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO preferences
                (id, preparation_secs, default_duration_secs, end_sound_id,
                 background_image, daily_goal_secs, weekly_goal_secs)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                prefs.preparation_secs,
                prefs.default_duration_secs,
                prefs.end_sound_id,
                prefs.background_image,
                prefs.daily_goal_secs,
                prefs.weekly_goal_secs,
            ],
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl SessionSink for Database {
    fn record_session(&mut self, duration_min: u32, completed: bool) -> Result<(), CoreError> {
        let started_at = Utc::now() - Duration::minutes(i64::from(duration_min));
        self.insert_session(duration_min, completed, started_at)?;
        Ok(())
    }
}

impl PreferencesSource for Database {
    fn preferences(&self) -> Result<Preferences, CoreError> {
        Ok(self.load_preferences()?)
    }
}

impl StatsSource for Database {
    /// Aggregation is not implemented yet; returns the placeholder
    /// numbers the display surface was built against.
    fn stats(&self) -> Result<SessionStats, CoreError> {
        Ok(SessionStats {
            total_sessions: 5,
            total_minutes: 75,
            current_streak: 3,
            longest_streak: 7,
        })
    }
}
