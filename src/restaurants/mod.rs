pub mod cuisine;
pub mod dto;
pub mod fallback;
pub mod geo;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use fallback::{FallbackSource, RandomFallback};

pub fn router() -> Router<AppState> {
    handlers::restaurant_routes()
}
