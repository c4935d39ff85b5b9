//! Preference database schema.

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// SQL schema for initial database setup.
pub const SCHEMA_SQL: &str = r"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_info (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Preference key/value pairs
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// SQL to check if schema is initialized.
pub const CHECK_SCHEMA_SQL: &str = r"
SELECT COUNT(*) FROM sqlite_master
WHERE type='table' AND name='schema_info';
";

/// SQL to get schema version.
pub const GET_VERSION_SQL: &str = r"
SELECT value FROM schema_info WHERE key = 'version';
";

/// SQL to set schema version.
pub const SET_VERSION_SQL: &str = r"
INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?);
";

/// SQL to read one preference.
pub const GET_PREFERENCE_SQL: &str = r"
SELECT value FROM preferences WHERE key = ?;
";

/// SQL to write one preference.
pub const SET_PREFERENCE_SQL: &str = r"
INSERT OR REPLACE INTO preferences (key, value, updated_at) VALUES (?, ?, ?);
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_sql_creates_tables() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS schema_info"));
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS preferences"));
    }
}
