use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Single-holder lock per string key with atomic lookup-or-create.
/// Backs the processor's per-transaction serialization and the reference
/// gateway's per-id idempotency sections.
#[derive(Default)]
pub struct LockMap {
    inner: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock handle for `key`, creating it on first use.
    /// The caller locks the handle; the table itself is held only for the
    /// lookup.
    pub fn handle(&self, key: &str) -> Arc<Mutex<()>> {
        let mut table = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        table
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the lock for `key` unless some task still holds a handle to it.
    /// While the table guard is held no new handle can be cloned, so a
    /// strong count of one proves the lock is idle.
    pub fn release(&self, key: &str) -> bool {
        let mut table = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(lock) = table.get(key) {
            if Arc::strong_count(lock) == 1 {
                table.remove(key);
                return true;
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
