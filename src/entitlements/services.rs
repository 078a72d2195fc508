use std::sync::Arc;

use tracing::{debug, info, warn};

use super::client::{EntitlementClient, RevenueCatClient};
use super::dto::EntitlementStatus;
use super::slot::EntitlementSlot;
use crate::config::EntitlementConfig;
use crate::retry::{Poll, Readiness, RetryPolicy};

/// Fill a loading slot from configuration. Without an API key the slot is
/// disabled so waiters give up at once.
pub fn configure_slot(slot: &EntitlementSlot, cfg: &EntitlementConfig) {
    match cfg.api_key.as_deref() {
        Some(key) => {
            let client = RevenueCatClient::new(&cfg.base_url, key, &cfg.entitlement_id);
            slot.install(Arc::new(client));
            info!(entitlement = %cfg.entitlement_id, "entitlement client configured");
        }
        None => {
            slot.disable();
            warn!("no entitlement API key; premium features disabled");
        }
    }
}

/// Premium lookup that never fails: errors and a missing client read as
/// "not premium".
pub async fn premium_or_default(client: Option<Arc<dyn EntitlementClient>>, user_id: &str) -> bool {
    let Some(client) = client else {
        debug!(%user_id, "entitlement client not ready; treating as free tier");
        return false;
    };
    match client.is_premium(user_id).await {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, %user_id, "premium lookup failed");
            false
        }
    }
}

/// Current status for `user_id` without waiting: loading while the client is
/// still coming up, free tier when it is disabled.
pub async fn entitlement_status(slot: &EntitlementSlot, user_id: &str) -> EntitlementStatus {
    match slot.peek() {
        Poll::Ready(client) => EntitlementStatus {
            is_premium: premium_or_default(Some(client), user_id).await,
            is_loading: false,
        },
        Poll::Pending => EntitlementStatus {
            is_premium: false,
            is_loading: true,
        },
        Poll::Gone => EntitlementStatus::default(),
    }
}

/// Best-effort identification once the client becomes available.
/// Returns whether the identify call went through.
pub async fn identify_when_ready(slot: &EntitlementSlot, policy: RetryPolicy, user_id: &str) -> bool {
    match slot.wait(policy).await {
        Readiness::Ready(client) => match client.identify(user_id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, %user_id, "entitlement identify failed");
                false
            }
        },
        Readiness::Unavailable => {
            debug!(%user_id, "entitlement client unavailable; skipping identify");
            false
        }
    }
}
