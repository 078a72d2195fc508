use serde::Serialize;
use tracing::{debug, info, warn};

use super::guest::mint_guest;
use super::model::{Session, UserRecord};
use super::ports::{AuthBackend, Clock, LocalStore};
use crate::entitlements::dto::EntitlementStatus;
use crate::entitlements::services::{entitlement_status, identify_when_ready};
use crate::entitlements::EntitlementSlot;
use crate::retry::RetryPolicy;

pub const REMEMBER_ME_KEY: &str = "remember_me";
pub const SESSION_TOKEN_KEY: &str = "session_token";
pub const SESSION_EXPIRES_KEY: &str = "session_expires";

const SESSION_KEYS: [&str; 3] = [REMEMBER_ME_KEY, SESSION_TOKEN_KEY, SESSION_EXPIRES_KEY];

/// Everything the rest of the app reads about the current identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub session: Session,
    pub entitlement: EntitlementStatus,
    pub dietary_preferences: Vec<String>,
}

/// Decides which identity backs the app session and keeps it current.
///
/// Remote failures never surface: anything that prevents restoring a
/// session ends in a guest identity instead.
pub struct SessionBootstrap<B, S, C> {
    backend: B,
    store: S,
    clock: C,
    entitlements: EntitlementSlot,
    retry: RetryPolicy,
    state: SessionState,
}

impl<B, S, C> SessionBootstrap<B, S, C>
where
    B: AuthBackend,
    S: LocalStore,
    C: Clock,
{
    pub fn new(backend: B, store: S, clock: C, entitlements: EntitlementSlot) -> Self {
        Self {
            backend,
            store,
            clock,
            entitlements,
            retry: RetryPolicy::default(),
            state: SessionState::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.state.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_valid_user(&self) -> bool {
        self.state.session.is_valid_user()
    }

    /// Adopt `initial_user` when one was established upstream, otherwise
    /// restore a remembered session or fall back to a guest.
    pub async fn initialize(&mut self, initial_user: Option<UserRecord>) -> &Session {
        match initial_user {
            Some(user) => {
                debug!(user_id = %user.id, "adopting initial user");
                self.adopt(user).await;
            }
            None => self.restore_or_guest().await,
        }
        &self.state.session
    }

    pub async fn sign_in(&mut self) -> &Session {
        self.restore_or_guest().await;
        &self.state.session
    }

    /// Persist a restorable session token on the device.
    pub fn remember(&self, token: &str, expires_at_millis: i64) {
        self.store.set(REMEMBER_ME_KEY, "true".to_string());
        self.store.set(SESSION_TOKEN_KEY, token.to_string());
        self.store
            .set(SESSION_EXPIRES_KEY, expires_at_millis.to_string());
    }

    /// Clears session keys only; other device-local data stays.
    pub fn sign_out(&mut self) {
        for key in SESSION_KEYS {
            self.store.remove(key);
        }
        if let Some(user) = &self.state.session.user {
            info!(user_id = %user.id(), "signed out");
        }
        self.state = SessionState::default();
    }

    /// Refresh the mirrored premium flag. Always false without a valid user;
    /// `is_loading` stays set while the entitlement client is still coming up.
    pub async fn check_pro_status(&mut self) -> bool {
        let Some(user) = self
            .state
            .session
            .user
            .as_ref()
            .filter(|_| self.state.session.is_valid_user())
        else {
            self.state.entitlement = EntitlementStatus::default();
            return false;
        };

        let user_id = user.id().to_string();
        self.state.entitlement = entitlement_status(&self.entitlements, &user_id).await;
        self.state.entitlement.is_premium
    }

    async fn restore_or_guest(&mut self) {
        let Some(token) = self.remembered_token() else {
            self.adopt_guest();
            return;
        };

        match self.backend.restore_session(&token).await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "remembered session restored");
                self.adopt(user).await;
            }
            Ok(None) => {
                debug!("remembered session not recognised");
                self.adopt_guest();
            }
            Err(e) => {
                warn!(error = %e, "session restore failed; continuing as guest");
                self.adopt_guest();
            }
        }
    }

    /// Token worth trying remotely: flag set, token present, expiry ahead.
    fn remembered_token(&self) -> Option<String> {
        if self.store.get(REMEMBER_ME_KEY).as_deref() != Some("true") {
            return None;
        }
        let token = self.store.get(SESSION_TOKEN_KEY).filter(|t| !t.is_empty())?;
        let expires = self
            .store
            .get(SESSION_EXPIRES_KEY)
            .and_then(|v| v.trim().parse::<i64>().ok())?;
        if expires <= self.clock.now_millis() {
            debug!(expires, "remembered session expired");
            return None;
        }
        Some(token)
    }

    async fn adopt(&mut self, mut user: UserRecord) {
        let dietary_preferences = match self.backend.load_profile(&user.id).await {
            Ok(Some(profile)) => {
                if user.display_name.is_none() {
                    user.display_name = profile.display_name;
                }
                profile.dietary_preferences
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, user_id = %user.id, "profile load failed");
                Vec::new()
            }
        };

        let user_id = user.id.clone();
        self.state = SessionState {
            session: Session::member(user),
            entitlement: EntitlementStatus::default(),
            dietary_preferences,
        };

        // Identification is best effort and may wait on a slow vendor; the
        // adopted session must not.
        let slot = self.entitlements.clone();
        let retry = self.retry;
        tokio::spawn(async move {
            identify_when_ready(&slot, retry, &user_id).await;
        });
    }

    fn adopt_guest(&mut self) {
        let guest = mint_guest(&self.clock);
        debug!(guest_id = %guest.id, "continuing as guest");
        self.state = SessionState {
            session: Session::guest(guest),
            ..SessionState::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlements::client::{EntitlementClient, EntitlementError};
    use crate::session::model::{Profile, SessionUser};
    use crate::session::ports::{FixedClock, MemoryStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use time::OffsetDateTime;

    const NOW: i64 = 1_700_000_000_000;

    #[derive(Clone, Copy)]
    enum Restore {
        Found,
        Unknown,
        Fails,
    }

    struct FakeBackend {
        restore: Restore,
        restore_calls: Arc<AtomicUsize>,
        profile_fails: bool,
    }

    impl FakeBackend {
        fn new(restore: Restore) -> Self {
            Self {
                restore,
                restore_calls: Arc::new(AtomicUsize::new(0)),
                profile_fails: false,
            }
        }
    }

    fn member(id: &str) -> UserRecord {
        UserRecord {
            id: id.into(),
            email: "cook@moodbite.app".into(),
            display_name: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[async_trait]
    impl AuthBackend for FakeBackend {
        async fn restore_session(&self, token: &str) -> anyhow::Result<Option<UserRecord>> {
            self.restore_calls.fetch_add(1, Ordering::SeqCst);
            match self.restore {
                Restore::Found => Ok(Some(member(&format!("user-for-{token}")))),
                Restore::Unknown => Ok(None),
                Restore::Fails => anyhow::bail!("backend offline"),
            }
        }

        async fn load_profile(&self, _user_id: &str) -> anyhow::Result<Option<Profile>> {
            if self.profile_fails {
                anyhow::bail!("profiles offline");
            }
            Ok(Some(Profile {
                display_name: Some("Chef Remy".into()),
                dietary_preferences: vec!["vegetarian".into()],
            }))
        }
    }

    #[derive(Default)]
    struct RecordingEntitlements {
        identified: Mutex<Vec<String>>,
        premium: bool,
    }

    #[async_trait]
    impl EntitlementClient for RecordingEntitlements {
        async fn identify(&self, user_id: &str) -> Result<(), EntitlementError> {
            self.identified
                .lock()
                .expect("identified mutex poisoned")
                .push(user_id.to_string());
            Ok(())
        }
        async fn is_premium(&self, _user_id: &str) -> Result<bool, EntitlementError> {
            Ok(self.premium)
        }
    }

    fn quick() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            interval: Duration::ZERO,
        }
    }

    fn remembered(expires: i64) -> MemoryStore {
        [
            (REMEMBER_ME_KEY, "true".to_string()),
            (SESSION_TOKEN_KEY, "tok".to_string()),
            (SESSION_EXPIRES_KEY, expires.to_string()),
        ]
        .into_iter()
        .collect()
    }

    fn bootstrap(
        backend: FakeBackend,
        store: MemoryStore,
        slot: EntitlementSlot,
    ) -> SessionBootstrap<FakeBackend, MemoryStore, FixedClock> {
        SessionBootstrap::new(backend, store, FixedClock(NOW), slot).with_retry(quick())
    }

    #[tokio::test]
    async fn remembered_valid_session_is_restored() {
        let mut b = bootstrap(
            FakeBackend::new(Restore::Found),
            remembered(NOW + 60_000),
            EntitlementSlot::disabled(),
        );
        let session = b.initialize(None).await.clone();
        assert!(session.is_authenticated);
        assert_eq!(session.user.as_ref().map(|u| u.id()), Some("user-for-tok"));
        assert!(b.is_valid_user());
        assert_eq!(b.state().dietary_preferences, vec!["vegetarian".to_string()]);
    }

    #[tokio::test]
    async fn expired_remembered_session_becomes_guest_without_remote_call() {
        let backend = FakeBackend::new(Restore::Found);
        let calls = backend.restore_calls.clone();
        let mut b = bootstrap(backend, remembered(NOW - 1000), EntitlementSlot::disabled());
        let session = b.initialize(None).await.clone();
        assert!(matches!(session.user, Some(SessionUser::Guest(ref g)) if g.is_guest));
        assert!(!session.is_authenticated);
        assert!(!b.is_valid_user());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn remember_flag_unset_means_guest() {
        let store = remembered(NOW + 60_000);
        store.set(REMEMBER_ME_KEY, "false".into());
        let mut b = bootstrap(FakeBackend::new(Restore::Found), store, EntitlementSlot::disabled());
        assert!(b.initialize(None).await.user.as_ref().is_some_and(|u| u.is_guest()));
    }

    #[tokio::test]
    async fn unparsable_expiry_means_guest() {
        let store = remembered(0);
        store.set(SESSION_EXPIRES_KEY, "tomorrow".into());
        let mut b = bootstrap(FakeBackend::new(Restore::Found), store, EntitlementSlot::disabled());
        assert!(b.initialize(None).await.user.as_ref().is_some_and(|u| u.is_guest()));
    }

    #[tokio::test]
    async fn remote_error_falls_back_to_guest() {
        let mut b = bootstrap(
            FakeBackend::new(Restore::Fails),
            remembered(NOW + 60_000),
            EntitlementSlot::disabled(),
        );
        let session = b.initialize(None).await;
        assert!(session.user.as_ref().is_some_and(|u| u.is_guest()));
    }

    #[tokio::test]
    async fn unknown_token_falls_back_to_guest() {
        let mut b = bootstrap(
            FakeBackend::new(Restore::Unknown),
            remembered(NOW + 60_000),
            EntitlementSlot::disabled(),
        );
        assert!(b.sign_in().await.user.as_ref().is_some_and(|u| u.is_guest()));
    }

    #[tokio::test]
    async fn initial_user_wins_over_remembered_session() {
        let backend = FakeBackend::new(Restore::Found);
        let calls = backend.restore_calls.clone();
        let mut b = bootstrap(backend, remembered(NOW + 60_000), EntitlementSlot::disabled());
        let session = b.initialize(Some(member("initial"))).await.clone();
        assert_eq!(session.user.as_ref().map(|u| u.id()), Some("initial"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        // display name filled from the profile
        match session.user {
            Some(SessionUser::Member(u)) => assert_eq!(u.display_name.as_deref(), Some("Chef Remy")),
            other => panic!("expected member, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn profile_failure_still_adopts_user() {
        let mut backend = FakeBackend::new(Restore::Found);
        backend.profile_fails = true;
        let mut b = bootstrap(backend, MemoryStore::default(), EntitlementSlot::disabled());
        b.initialize(Some(member("initial"))).await;
        assert!(b.is_valid_user());
        assert!(b.state().dietary_preferences.is_empty());
    }

    #[tokio::test]
    async fn adopted_user_is_identified_with_entitlements() {
        let ent = Arc::new(RecordingEntitlements::default());
        let slot = EntitlementSlot::ready(ent.clone());
        let mut b = bootstrap(FakeBackend::new(Restore::Found), remembered(NOW + 1), slot);
        b.initialize(None).await;
        let identified = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let seen = ent.identified.lock().unwrap().clone();
                if !seen.is_empty() {
                    return seen;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("identify runs in the background");
        assert_eq!(identified, vec!["user-for-tok".to_string()]);
    }

    struct Unresponsive;

    #[async_trait]
    impl EntitlementClient for Unresponsive {
        async fn identify(&self, _user_id: &str) -> Result<(), EntitlementError> {
            std::future::pending().await
        }
        async fn is_premium(&self, _user_id: &str) -> Result<bool, EntitlementError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn stalled_identify_does_not_hold_up_adoption() {
        let mut b = bootstrap(
            FakeBackend::new(Restore::Found),
            MemoryStore::default(),
            EntitlementSlot::ready(Arc::new(Unresponsive)),
        );
        let adopted = tokio::time::timeout(Duration::from_secs(2), b.initialize(Some(member("u1"))))
            .await
            .map(|s| s.is_authenticated);
        assert_eq!(adopted, Ok(true));
    }

    #[tokio::test]
    async fn loading_entitlement_client_does_not_hold_up_adoption() {
        let slot = EntitlementSlot::default();
        let mut b = SessionBootstrap::new(
            FakeBackend::new(Restore::Found),
            MemoryStore::default(),
            FixedClock(NOW),
            slot,
        )
        .with_retry(RetryPolicy {
            attempts: 1_000,
            interval: Duration::from_millis(100),
        });
        let adopted = tokio::time::timeout(Duration::from_secs(2), b.initialize(Some(member("u1")))).await;
        assert!(adopted.is_ok());
        assert!(!b.check_pro_status().await);
        assert_eq!(
            b.state().entitlement,
            EntitlementStatus {
                is_premium: false,
                is_loading: true
            }
        );
    }

    #[tokio::test]
    async fn guests_are_never_identified_or_premium() {
        let ent = Arc::new(RecordingEntitlements {
            premium: true,
            ..Default::default()
        });
        let slot = EntitlementSlot::ready(ent.clone());
        let mut b = bootstrap(FakeBackend::new(Restore::Found), MemoryStore::default(), slot);
        b.initialize(None).await;
        assert!(!b.check_pro_status().await);
        assert!(ent.identified.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn check_pro_status_mirrors_entitlement() {
        let ent = Arc::new(RecordingEntitlements {
            premium: true,
            ..Default::default()
        });
        let mut b = bootstrap(
            FakeBackend::new(Restore::Found),
            MemoryStore::default(),
            EntitlementSlot::ready(ent),
        );
        b.initialize(Some(member("u1"))).await;
        assert!(b.check_pro_status().await);
        assert_eq!(
            b.state().entitlement,
            EntitlementStatus {
                is_premium: true,
                is_loading: false
            }
        );
    }

    #[tokio::test]
    async fn sign_out_clears_session_keys_only() {
        let store = remembered(NOW + 60_000);
        store.set("recent_mood", "cozy".into());
        let mut b = bootstrap(FakeBackend::new(Restore::Found), store.clone(), EntitlementSlot::disabled());
        b.initialize(None).await;
        assert!(b.is_valid_user());

        b.sign_out();
        assert_eq!(b.state(), &SessionState::default());
        assert!(!b.is_valid_user());
        for key in SESSION_KEYS {
            assert!(store.get(key).is_none(), "{key} should be cleared");
        }
        assert_eq!(store.get("recent_mood").as_deref(), Some("cozy"));
    }

    #[tokio::test]
    async fn remember_then_sign_in_restores() {
        let store = MemoryStore::default();
        let mut b = bootstrap(FakeBackend::new(Restore::Found), store, EntitlementSlot::disabled());
        b.initialize(None).await;
        assert!(!b.is_valid_user());

        b.remember("fresh", NOW + 5_000);
        let session = b.sign_in().await;
        assert_eq!(session.user.as_ref().map(|u| u.id()), Some("user-for-fresh"));
    }
}
