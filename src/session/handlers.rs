use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use super::backend::JwtSessionBackend;
use super::bootstrap::SessionBootstrap;
use super::dto::{LocalSessionSnapshot, SessionResponse};
use super::ports::{MemoryStore, SystemClock};
use crate::{
    auth::{
        repo_types::User,
        services::{AuthUser, JwtKeys},
    },
    state::AppState,
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/session/bootstrap", post(bootstrap_session))
        .route("/session/sign-out", post(sign_out))
}

type Bootstrap = SessionBootstrap<JwtSessionBackend, MemoryStore, SystemClock>;

fn session_backend(state: &AppState) -> JwtSessionBackend {
    JwtSessionBackend::new(state.db.clone(), JwtKeys::from_ref(state))
}

fn make_bootstrap(state: &AppState, backend: JwtSessionBackend, store: MemoryStore) -> Bootstrap {
    SessionBootstrap::new(backend, store, SystemClock, state.entitlements.clone())
        .with_retry(state.config.entitlements.retry_policy())
}

fn respond(bootstrap: &Bootstrap, is_pro: bool) -> SessionResponse {
    let st = bootstrap.state();
    SessionResponse {
        session: st.session.clone(),
        is_valid_user: bootstrap.is_valid_user(),
        is_pro,
        entitlement: st.entitlement,
        dietary_preferences: st.dietary_preferences.clone(),
        local: LocalSessionSnapshot::from(bootstrap.store()),
    }
}

/// A bearer access token, when present and valid, is the initial user.
#[instrument(skip_all, fields(has_bearer = initial.is_some()))]
pub async fn bootstrap_session(
    State(state): State<AppState>,
    initial: Option<AuthUser>,
    Json(snapshot): Json<LocalSessionSnapshot>,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    let backend = session_backend(&state);
    let initial_user = match initial {
        Some(AuthUser(user_id)) => match User::find_by_id(&state.db, user_id).await {
            Ok(user) => user.map(|u| backend.remember_user(u)),
            Err(e) => {
                warn!(error = %e, %user_id, "initial user lookup failed");
                None
            }
        },
        None => None,
    };

    let mut bootstrap = make_bootstrap(&state, backend, snapshot.into());
    bootstrap.initialize(initial_user).await;
    let is_pro = bootstrap.check_pro_status().await;

    Ok(Json(respond(&bootstrap, is_pro)))
}

#[instrument(skip_all)]
pub async fn sign_out(
    State(state): State<AppState>,
    Json(snapshot): Json<LocalSessionSnapshot>,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    let mut bootstrap = make_bootstrap(&state, session_backend(&state), snapshot.into());
    bootstrap.sign_out();
    Ok(Json(respond(&bootstrap, false)))
}

#[cfg(test)]
mod tests {
    use crate::{app::build_app, state::AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn empty_device_bootstraps_a_guest() {
        let (status, body) = post_json("/api/v1/session/bootstrap", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["kind"], "guest");
        assert!(body["user"]["id"].as_str().unwrap().starts_with("guest-"));
        assert_eq!(body["is_authenticated"], false);
        assert_eq!(body["is_valid_user"], false);
        assert_eq!(body["is_pro"], false);
    }

    #[tokio::test]
    async fn expired_remembered_session_bootstraps_a_guest() {
        let expired = (time::OffsetDateTime::now_utc().unix_timestamp() - 1) * 1000;
        let (status, body) = post_json(
            "/api/v1/session/bootstrap",
            json!({
                "remember_me": true,
                "session_token": "whatever",
                "session_expires": expired.to_string(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["is_guest"], true);
        // Snapshot is echoed back untouched; only sign-out clears it.
        assert_eq!(body["local"]["remember_me"], true);
    }

    #[tokio::test]
    async fn garbage_token_bootstraps_a_guest() {
        let future = (time::OffsetDateTime::now_utc().unix_timestamp() + 3600) * 1000;
        let (_, body) = post_json(
            "/api/v1/session/bootstrap",
            json!({
                "remember_me": true,
                "session_token": "not-a-jwt",
                "session_expires": future.to_string(),
            }),
        )
        .await;
        assert_eq!(body["user"]["kind"], "guest");
    }

    #[tokio::test]
    async fn sign_out_clears_local_session() {
        let (status, body) = post_json(
            "/api/v1/session/sign-out",
            json!({
                "remember_me": true,
                "session_token": "tok",
                "session_expires": "99999999999999",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["user"].is_null());
        assert_eq!(body["local"], json!({ "remember_me": false }));
    }
}
