use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::model::{Profile, UserRecord};
use super::ports::AuthBackend;
use crate::auth::repo_types::User;
use crate::auth::services::JwtKeys;

/// Restores sessions from refresh tokens issued by this service.
///
/// Profiles of users already read from `profiles` during this request are
/// kept so adopting them does not query the row again.
pub struct JwtSessionBackend {
    db: PgPool,
    keys: JwtKeys,
    loaded: Mutex<HashMap<String, Profile>>,
}

impl JwtSessionBackend {
    pub fn new(db: PgPool, keys: JwtKeys) -> Self {
        Self {
            db,
            keys,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Record a user loaded elsewhere and hand back its session identity.
    pub fn remember_user(&self, user: User) -> UserRecord {
        let record = UserRecord {
            id: user.id.to_string(),
            email: user.email,
            display_name: user.display_name.clone(),
            created_at: user.created_at,
        };
        let profile = Profile {
            display_name: user.display_name,
            dietary_preferences: user.dietary_preferences,
        };
        if let Ok(mut loaded) = self.loaded.lock() {
            loaded.insert(record.id.clone(), profile);
        }
        record
    }

    fn take_loaded(&self, user_id: &str) -> Option<Profile> {
        self.loaded.lock().ok()?.remove(user_id)
    }
}

#[async_trait]
impl AuthBackend for JwtSessionBackend {
    async fn restore_session(&self, token: &str) -> anyhow::Result<Option<UserRecord>> {
        let claims = match self.keys.verify_refresh(token) {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, "remembered token rejected");
                return Ok(None);
            }
        };
        let user = User::find_by_id(&self.db, claims.sub)
            .await
            .context("load user for remembered session")?;
        Ok(user.map(|u| self.remember_user(u)))
    }

    async fn load_profile(&self, user_id: &str) -> anyhow::Result<Option<Profile>> {
        if let Some(profile) = self.take_loaded(user_id) {
            return Ok(Some(profile));
        }
        let Ok(id) = Uuid::parse_str(user_id) else {
            return Ok(None);
        };
        let user = User::find_by_id(&self.db, id)
            .await
            .context("load profile")?;
        Ok(user.map(|u| Profile {
            display_name: u.display_name,
            dietary_preferences: u.dietary_preferences,
        }))
    }
}
