//! `SQLite` preference store.

use crate::error::{Result, SettingsError};
use crate::settings::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, GET_PREFERENCE_SQL, GET_VERSION_SQL, SCHEMA_SQL,
    SET_PREFERENCE_SQL, SET_VERSION_SQL,
};
use crate::settings::traits::Persistence;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};

/// Preferences persisted in a `SQLite` database.
///
/// # Examples
///
/// ```no_run
/// use chat_overlay::settings::{Persistence, SqlitePersistence};
///
/// let mut store = SqlitePersistence::open(".chat-overlay/prefs.db").unwrap();
/// store.set("chatAvatarsEnabled", "false").unwrap();
/// ```
pub struct SqlitePersistence {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqlitePersistence {
    /// Opens or creates the database at `path` and initializes its schema.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty() && !parent.exists())
        {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Database(e.to_string()))?;
        }

        let conn = Connection::open(&path).map_err(SettingsError::from)?;
        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(SettingsError::from)?;

        let mut store = Self {
            conn,
            path: Some(path),
        };
        store.init()?;
        Ok(store)
    }

    /// Creates an initialized in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(SettingsError::from)?;
        let mut store = Self { conn, path: None };
        store.init()?;
        Ok(store)
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Creates the schema if needed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Migration`] if the database was written by
    /// a newer schema version.
    pub fn init(&mut self) -> Result<()> {
        if !self.is_initialized()? {
            self.conn
                .execute_batch(SCHEMA_SQL)
                .map_err(SettingsError::from)?;
            self.set_schema_version(CURRENT_SCHEMA_VERSION)?;
            return Ok(());
        }

        match self.schema_version()? {
            Some(version) if version > CURRENT_SCHEMA_VERSION => {
                Err(SettingsError::Migration(format!(
                    "database schema v{version} is newer than supported v{CURRENT_SCHEMA_VERSION}"
                ))
                .into())
            }
            Some(_) => Ok(()),
            None => self.set_schema_version(CURRENT_SCHEMA_VERSION),
        }
    }

    /// Checks whether the schema exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    pub fn is_initialized(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(SettingsError::from)?;
        Ok(count > 0)
    }

    /// Gets the stored schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<Option<u32>> {
        let version: Option<String> = self
            .conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()
            .map_err(SettingsError::from)?;
        Ok(version.and_then(|v| v.parse().ok()))
    }

    fn set_schema_version(&self, version: u32) -> Result<()> {
        self.conn
            .execute(SET_VERSION_SQL, params![version.to_string()])
            .map_err(SettingsError::from)?;
        Ok(())
    }
}

impl Persistence for SqlitePersistence {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(GET_PREFERENCE_SQL, params![key], |row| row.get(0))
            .optional()
            .map_err(SettingsError::from)?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        self.conn
            .execute(SET_PREFERENCE_SQL, params![key, value, now])
            .map_err(SettingsError::from)?;
        Ok(())
    }
}
