//! Session-scoped key/value storage shared by every page
//!
//! A browsing session owns one store. Each page receives a handle to it at
//! bootstrap; handles are cheap clones of the same underlying map, so a value
//! written on one page is visible to every page loaded afterwards. The store
//! lives exactly as long as the last handle, which is the lifetime of the
//! browsing session.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{KioskError, Result};

/// Minimal storage interface pages depend on
pub trait SessionStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value
    fn remove(&self, key: &str) -> Result<()>;
}

/// Handle to the store shared across pages
pub type SharedStore = Arc<dyn SessionStore>;

/// In-memory store, one per browsing session
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in a shared handle
    pub fn shared(self) -> SharedStore {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<E>(_: E) -> KioskError {
    KioskError::Store("session store lock poisoned".to_string())
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other_page = store.clone();

        store.set("k", "v").unwrap();
        assert_eq!(other_page.get("k").unwrap(), Some("v".to_string()));

        other_page.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_overwrites() {
        let store = MemoryStore::new();
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }
}
