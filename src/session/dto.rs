use serde::{Deserialize, Serialize};

use super::bootstrap::{REMEMBER_ME_KEY, SESSION_EXPIRES_KEY, SESSION_TOKEN_KEY};
use super::model::Session;
use crate::entitlements::dto::EntitlementStatus;
use super::ports::{LocalStore, MemoryStore};

/// Session keys the client keeps in device storage, as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalSessionSnapshot {
    #[serde(default)]
    pub remember_me: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_expires: Option<String>,
}

impl From<LocalSessionSnapshot> for MemoryStore {
    fn from(s: LocalSessionSnapshot) -> Self {
        let store = MemoryStore::default();
        if s.remember_me {
            store.set(REMEMBER_ME_KEY, "true".to_string());
        }
        if let Some(token) = s.session_token {
            store.set(SESSION_TOKEN_KEY, token);
        }
        if let Some(expires) = s.session_expires {
            store.set(SESSION_EXPIRES_KEY, expires);
        }
        store
    }
}

impl From<&MemoryStore> for LocalSessionSnapshot {
    fn from(store: &MemoryStore) -> Self {
        Self {
            remember_me: store.get(REMEMBER_ME_KEY).as_deref() == Some("true"),
            session_token: store.get(SESSION_TOKEN_KEY),
            session_expires: store.get(SESSION_EXPIRES_KEY),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: Session,
    pub is_valid_user: bool,
    pub is_pro: bool,
    pub entitlement: EntitlementStatus,
    pub dietary_preferences: Vec<String>,
    /// What the client should hold in device storage from now on.
    pub local: LocalSessionSnapshot,
}
