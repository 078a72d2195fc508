use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::content_key::ContentKey;
use super::dto::{LastBiteRequest, UpsertFavouriteRequest};
use super::repo_types::Favourite;
use crate::{auth::services::AuthUser, state::AppState};

pub fn favourite_routes() -> Router<AppState> {
    Router::new()
        .route("/favourites", get(list_favourites).post(upsert_favourite))
        .route("/favourites/:key", axum::routing::delete(delete_favourite))
        .route("/favourites/:key/last-bite", put(set_last_bite))
}

fn parse_key(raw: &str) -> Result<ContentKey, (StatusCode, String)> {
    ContentKey::parse_path(raw).map_err(|e| {
        warn!(key = %raw, error = %e, "bad content key");
        (StatusCode::BAD_REQUEST, e.to_string())
    })
}

#[instrument(skip(state))]
pub async fn list_favourites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Favourite>>, (StatusCode, String)> {
    let items = Favourite::list_by_user(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "list favourites failed");
            internal(e)
        })?;
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn upsert_favourite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut payload): Json<UpsertFavouriteRequest>,
) -> Result<Json<Favourite>, (StatusCode, String)> {
    payload.name = payload.name.trim().to_string();
    if payload.name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Name is required".into()));
    }

    let fav = Favourite::upsert(&state.db, user_id, &payload)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "upsert favourite failed");
            internal(e)
        })?;
    info!(%user_id, key = %fav.key, "favourite saved");
    Ok(Json(fav))
}

#[instrument(skip(state))]
pub async fn delete_favourite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(raw_key): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let key = parse_key(&raw_key)?;
    let removed = Favourite::delete(&state.db, user_id, key)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "delete favourite failed");
            internal(e)
        })?;
    if removed {
        info!(%user_id, %key, "favourite removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Favourite not found".into()))
    }
}

#[instrument(skip(state, payload))]
pub async fn set_last_bite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(raw_key): Path<String>,
    Json(payload): Json<LastBiteRequest>,
) -> Result<Json<Favourite>, (StatusCode, String)> {
    let key = parse_key(&raw_key)?;
    let location = payload
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    Favourite::set_last_bite(&state.db, user_id, key, payload.date, location)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "set last bite failed");
            internal(e)
        })?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Favourite not found".into()))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
