//! Shared key-value stores (flow and global scope).
//!
//! Nodes only see the `ScopedStore` capability; the host owns the stores and
//! decides their lifetime. Each call locks independently, so a
//! read-modify-write spread over two calls may interleave with other nodes.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Narrow get/set capability over a shared store.
pub trait ScopedStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
}

/// In-memory store used by the pipeline host and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScopedStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        // A poisoned lock still holds consistent data (single inserts only).
        let guard = self.entries.read().unwrap_or_else(|e| e.into_inner());
        guard.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        guard.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn get_set_roundtrip_and_missing() {
        let store = MemoryStore::from_entries([("root", json!("/data"))]);
        assert_eq!(store.get("root"), Some(json!("/data")));
        assert_eq!(store.get("other"), None);
        store.set("other", json!(3));
        assert_eq!(store.get("other"), Some(json!(3)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn concurrent_setters_all_land() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let s = Arc::clone(&store);
                thread::spawn(move || s.set(&format!("k{i}"), json!(i)))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 16);
        assert_eq!(store.get("k7"), Some(json!(7)));
    }
}
