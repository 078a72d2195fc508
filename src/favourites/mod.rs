pub mod content_key;
pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use content_key::{ContentKey, ContentSource};

pub fn router() -> Router<AppState> {
    handlers::favourite_routes()
}
