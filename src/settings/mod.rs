//! User preferences and their persistence.
//!
//! [`Preferences`] is the typed view; a [`Persistence`] backend stores it
//! as string pairs. [`SqlitePersistence`] is used by the CLI,
//! [`MemoryPersistence`] by tests and one-off runs.

pub mod memory;
pub mod preferences;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryPersistence;
pub use preferences::{PreferenceKey, Preferences};
pub use schema::CURRENT_SCHEMA_VERSION;
pub use sqlite::SqlitePersistence;
pub use traits::Persistence;

/// Default database path relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".chat-overlay/prefs.db";
