use std::sync::{Arc, RwLock};

use tracing::warn;

use super::client::EntitlementClient;
use crate::retry::{wait_until_ready, Poll, Readiness, RetryPolicy};

#[derive(Clone, Default)]
enum SlotState {
    #[default]
    Loading,
    Ready(Arc<dyn EntitlementClient>),
    Disabled,
}

/// Shared handle to an entitlement client that is configured after startup.
#[derive(Clone, Default)]
pub struct EntitlementSlot {
    inner: Arc<RwLock<SlotState>>,
}

impl EntitlementSlot {
    pub fn ready(client: Arc<dyn EntitlementClient>) -> Self {
        let slot = Self::default();
        slot.install(client);
        slot
    }

    pub fn disabled() -> Self {
        let slot = Self::default();
        slot.disable();
        slot
    }

    pub fn install(&self, client: Arc<dyn EntitlementClient>) {
        self.set(SlotState::Ready(client));
    }

    pub fn disable(&self) {
        self.set(SlotState::Disabled);
    }

    /// Non-blocking look at the current state.
    pub fn peek(&self) -> Poll<Arc<dyn EntitlementClient>> {
        match self.inner.read() {
            Ok(guard) => match &*guard {
                SlotState::Ready(c) => Poll::Ready(c.clone()),
                SlotState::Loading => Poll::Pending,
                SlotState::Disabled => Poll::Gone,
            },
            Err(_) => Poll::Gone,
        }
    }

    pub fn current(&self) -> Option<Arc<dyn EntitlementClient>> {
        match self.peek() {
            Poll::Ready(c) => Some(c),
            _ => None,
        }
    }

    pub async fn wait(&self, policy: RetryPolicy) -> Readiness<Arc<dyn EntitlementClient>> {
        wait_until_ready(policy, || self.peek()).await
    }

    fn set(&self, state: SlotState) {
        match self.inner.write() {
            Ok(mut guard) => *guard = state,
            Err(_) => warn!("entitlement slot lock poisoned"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlements::client::EntitlementError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct AlwaysPremium;

    #[async_trait]
    impl EntitlementClient for AlwaysPremium {
        async fn identify(&self, _user_id: &str) -> Result<(), EntitlementError> {
            Ok(())
        }
        async fn is_premium(&self, _user_id: &str) -> Result<bool, EntitlementError> {
            Ok(true)
        }
    }

    fn quick() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            interval: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn loading_slot_times_out() {
        let slot = EntitlementSlot::default();
        assert!(slot.wait(quick()).await.ready().is_none());
    }

    #[tokio::test]
    async fn installed_client_is_returned() {
        let slot = EntitlementSlot::default();
        slot.install(Arc::new(AlwaysPremium));
        let client = slot.wait(quick()).await.ready().expect("ready");
        assert!(client.is_premium("u1").await.unwrap());
    }

    #[tokio::test]
    async fn install_after_wait_started_is_observed() {
        let slot = EntitlementSlot::default();
        let installer = slot.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            installer.install(Arc::new(AlwaysPremium));
        });
        let policy = RetryPolicy {
            attempts: 50,
            interval: Duration::from_millis(10),
        };
        assert!(slot.wait(policy).await.ready().is_some());
    }

    #[test]
    fn disabled_slot_is_gone() {
        let slot = EntitlementSlot::disabled();
        assert!(matches!(slot.peek(), Poll::Gone));
        assert!(slot.current().is_none());
    }
}
