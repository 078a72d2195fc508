use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::model::{Profile, UserRecord};

/// Remote session/profile lookups used while bootstrapping.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange a remembered session token for the identity it belongs to.
    async fn restore_session(&self, token: &str) -> anyhow::Result<Option<UserRecord>>;
    async fn load_profile(&self, user_id: &str) -> anyhow::Result<Option<Profile>>;
}

/// Device-local string store.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

#[cfg(test)]
pub(crate) struct FixedClock(pub(crate) i64);

#[cfg(test)]
impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// In-memory `LocalStore`. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(map)),
        }
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        if let Ok(mut g) = self.entries.lock() {
            g.insert(key.to_string(), value);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut g) = self.entries.lock() {
            g.remove(key);
        }
    }
}
