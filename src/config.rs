use std::time::Duration;

use serde::Deserialize;

use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// How long a "remember me" login stays restorable on the device.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub remember_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesConfig {
    pub api_key: String,
    pub base_url: String,
    pub radius_m: u32,
    pub max_results: usize,
    pub photo_max_width: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntitlementConfig {
    /// `None` leaves the entitlement slot disabled.
    pub api_key: Option<String>,
    pub base_url: String,
    pub entitlement_id: String,
    pub ready_attempts: u32,
    pub ready_interval_ms: u64,
}

impl EntitlementConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.ready_attempts,
            interval: Duration::from_millis(self.ready_interval_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub places: PlacesConfig,
    pub entitlements: EntitlementConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "moodbite".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "moodbite-users".into()),
            ttl_minutes: parse_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: parse_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 30),
        };
        let session = SessionConfig {
            remember_days: parse_or("SESSION_REMEMBER_DAYS", 30),
        };
        let places = PlacesConfig {
            api_key: std::env::var("PLACES_API_KEY").unwrap_or_default(),
            base_url: std::env::var("PLACES_BASE_URL")
                .unwrap_or_else(|_| "https://maps.googleapis.com/maps/api/place".into()),
            radius_m: parse_or("PLACES_RADIUS_M", 10_000),
            max_results: parse_or("PLACES_MAX_RESULTS", 20),
            photo_max_width: parse_or("PLACES_PHOTO_MAX_WIDTH", 400),
        };
        let entitlements = EntitlementConfig {
            api_key: std::env::var("ENTITLEMENTS_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            base_url: std::env::var("ENTITLEMENTS_BASE_URL")
                .unwrap_or_else(|_| "https://api.revenuecat.com".into()),
            entitlement_id: std::env::var("ENTITLEMENTS_ID").unwrap_or_else(|_| "pro".into()),
            ready_attempts: parse_or("ENTITLEMENTS_READY_ATTEMPTS", 30),
            ready_interval_ms: parse_or("ENTITLEMENTS_READY_INTERVAL_MS", 100),
        };
        Ok(Self {
            database_url,
            jwt,
            session,
            places,
            entitlements,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
