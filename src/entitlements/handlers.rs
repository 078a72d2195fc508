use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use super::dto::EntitlementStatus;
use super::services::entitlement_status;
use crate::{auth::services::AuthUser, state::AppState};

pub fn entitlement_routes() -> Router<AppState> {
    Router::new().route("/entitlements/me", get(get_my_entitlements))
}

#[instrument(skip(state))]
pub async fn get_my_entitlements(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<EntitlementStatus>, (StatusCode, String)> {
    Ok(Json(
        entitlement_status(&state.entitlements, &user_id.to_string()).await,
    ))
}
