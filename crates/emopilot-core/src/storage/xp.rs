use std::sync::{Arc, Mutex};

use super::database::Database;
use crate::error::StorageError;

/// Storage key for the career experience counter.
pub const XP_KEY: &str = "emotionPilotXP";

/// Where the experience counter survives between sessions.
pub trait XpStore {
    /// Stored value, or `None` when absent or not a number.
    fn load_xp(&self) -> Result<Option<u32>, StorageError>;

    fn save_xp(&self, xp: u32) -> Result<(), StorageError>;

    fn clear_xp(&self) -> Result<(), StorageError>;
}

fn parse_xp(raw: Option<String>) -> Option<u32> {
    let raw = raw?;
    match raw.trim().parse::<u32>() {
        Ok(xp) => Some(xp),
        Err(_) => {
            tracing::debug!(value = %raw, "ignoring non-numeric stored xp");
            None
        }
    }
}

impl XpStore for Database {
    fn load_xp(&self) -> Result<Option<u32>, StorageError> {
        Ok(parse_xp(self.kv_get(XP_KEY)?))
    }

    fn save_xp(&self, xp: u32) -> Result<(), StorageError> {
        self.kv_set(XP_KEY, &xp.to_string())
    }

    fn clear_xp(&self) -> Result<(), StorageError> {
        self.kv_delete(XP_KEY).map(|_| ())
    }
}

/// In-process store. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryXpStore {
    raw: Arc<Mutex<Option<String>>>,
    unavailable: bool,
}

impl MemoryXpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(raw: &str) -> Self {
        Self {
            raw: Arc::new(Mutex::new(Some(raw.to_string()))),
            unavailable: false,
        }
    }

    /// Store whose every operation fails.
    pub fn unavailable() -> Self {
        Self {
            raw: Arc::default(),
            unavailable: true,
        }
    }

    /// Raw stored text, as another reader would see it.
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().ok().and_then(|g| g.clone())
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("memory store disabled".into()));
        }
        self.raw
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))
    }
}

impl XpStore for MemoryXpStore {
    fn load_xp(&self) -> Result<Option<u32>, StorageError> {
        Ok(parse_xp(self.slot()?.clone()))
    }

    fn save_xp(&self, xp: u32) -> Result<(), StorageError> {
        *self.slot()? = Some(xp.to_string());
        Ok(())
    }

    fn clear_xp(&self) -> Result<(), StorageError> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_store_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.load_xp().unwrap(), None);
        db.save_xp(85).unwrap();
        assert_eq!(db.load_xp().unwrap(), Some(85));
        db.clear_xp().unwrap();
        assert_eq!(db.kv_get(XP_KEY).unwrap(), None);
    }

    #[test]
    fn non_numeric_value_reads_as_absent() {
        let db = Database::open_memory().unwrap();
        db.kv_set(XP_KEY, "lots").unwrap();
        assert_eq!(db.load_xp().unwrap(), None);
        assert_eq!(MemoryXpStore::with_value("NaN").load_xp().unwrap(), None);
    }

    #[test]
    fn memory_clones_share_value() {
        let store = MemoryXpStore::new();
        let view = store.clone();
        store.save_xp(12).unwrap();
        assert_eq!(view.raw().as_deref(), Some("12"));
    }

    #[test]
    fn unavailable_store_errors() {
        let store = MemoryXpStore::unavailable();
        assert!(store.load_xp().is_err());
        assert!(store.save_xp(1).is_err());
        assert!(store.clear_xp().is_err());
    }
}
