pub mod backend;
pub mod bootstrap;
pub mod dto;
pub mod guest;
pub mod handlers;
pub mod model;
pub mod ports;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::session_routes()
}
