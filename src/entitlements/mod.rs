pub mod client;
pub mod dto;
pub mod handlers;
pub mod services;
pub mod slot;

use crate::state::AppState;
use axum::Router;

pub use client::{EntitlementClient, RevenueCatClient};
pub use slot::EntitlementSlot;

pub fn router() -> Router<AppState> {
    handlers::entitlement_routes()
}
