use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum EntitlementError {
    #[error("entitlement transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("entitlement upstream error {status}")]
    Upstream { status: StatusCode },
    #[error("entitlement response decode error: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Premium-access lookups against the subscription backend.
#[async_trait]
pub trait EntitlementClient: Send + Sync {
    /// Associate subsequent lookups and purchases with `user_id`.
    async fn identify(&self, user_id: &str) -> Result<(), EntitlementError>;
    async fn is_premium(&self, user_id: &str) -> Result<bool, EntitlementError>;
}

#[derive(Debug, Deserialize)]
pub struct CustomerInfoResponse {
    pub subscriber: Subscriber,
}

#[derive(Debug, Deserialize)]
pub struct Subscriber {
    #[serde(default)]
    pub entitlements: HashMap<String, EntitlementInfo>,
}

#[derive(Debug, Deserialize)]
pub struct EntitlementInfo {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_date: Option<OffsetDateTime>,
}

/// Lifetime grants carry no expiry.
pub fn entitlement_active(sub: &Subscriber, entitlement_id: &str, now: OffsetDateTime) -> bool {
    match sub.entitlements.get(entitlement_id) {
        Some(info) => info.expires_date.map_or(true, |exp| exp > now),
        None => false,
    }
}

/// REST client for the subscription vendor's subscriber endpoint.
#[derive(Clone)]
pub struct RevenueCatClient {
    http: Client,
    base_url: String,
    api_key: String,
    entitlement_id: String,
}

impl RevenueCatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        entitlement_id: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            entitlement_id: entitlement_id.into(),
        }
    }

    async fn fetch_subscriber(&self, user_id: &str) -> Result<Subscriber, EntitlementError> {
        let url = format!("{}/v1/subscribers/{}", self.base_url, user_id);
        let res = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(EntitlementError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(EntitlementError::Upstream { status });
        }

        let body = res
            .json::<CustomerInfoResponse>()
            .await
            .map_err(EntitlementError::Decode)?;
        Ok(body.subscriber)
    }
}

#[async_trait]
impl EntitlementClient for RevenueCatClient {
    async fn identify(&self, user_id: &str) -> Result<(), EntitlementError> {
        // A subscriber GET creates the record on first sight.
        self.fetch_subscriber(user_id).await?;
        debug!(%user_id, "entitlement subscriber identified");
        Ok(())
    }

    async fn is_premium(&self, user_id: &str) -> Result<bool, EntitlementError> {
        let sub = self.fetch_subscriber(user_id).await?;
        Ok(entitlement_active(
            &sub,
            &self.entitlement_id,
            OffsetDateTime::now_utc(),
        ))
    }
}
