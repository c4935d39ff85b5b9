//! In-memory persistence.

use crate::error::Result;
use crate::settings::traits::Persistence;
use std::collections::BTreeMap;

/// Persistence backed by a map. Nothing survives the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPersistence {
    values: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryPersistence {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls received.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl Persistence for MemoryPersistence {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
