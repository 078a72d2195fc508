use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        repo_types::User,
        services::{hash_password, normalize_email, remember_until, verify_password, AuthUser, JwtKeys},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = normalize_email(&payload.email).ok_or_else(|| {
        warn!(email = %payload.email, "invalid email");
        (StatusCode::BAD_REQUEST, "Invalid email".to_string())
    })?;

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    let display_name = payload
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    // Ensure email is not taken
    if let Ok(Some(_)) = User::find_by_email(&state.db, &payload.email).await {
        warn!(email = %payload.email, "email already registered");
        return Err((StatusCode::CONFLICT, "Email already registered".into()));
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        internal(e)
    })?;

    let user = User::create(&state.db, &payload.email, &hash, display_name)
        .await
        .map_err(|e| {
            error!(error = %e, "create user failed");
            internal(e)
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    issue_tokens(&state, user, None)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = normalize_email(&payload.email).ok_or_else(|| {
        warn!(email = %payload.email, "invalid email");
        (StatusCode::BAD_REQUEST, "Invalid email".to_string())
    })?;

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal(e));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        internal(e)
    })?;

    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    let session_expires = payload.remember_me.then(|| {
        remember_until(OffsetDateTime::now_utc(), state.config.session.remember_days)
    });

    info!(user_id = %user.id, remember_me = payload.remember_me, "user logged in");
    issue_tokens(&state, user, session_expires)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, format!("{}", e)))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    issue_tokens(&state, user, None)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "load user failed");
            internal(e)
        })?
        .ok_or_else(|| {
            warn!(user_id = %user_id, "user not found");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;

    Ok(Json(user.into()))
}

fn issue_tokens(
    state: &AppState,
    user: User,
    session_expires: Option<i64>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        internal(e.into())
    })?;
    let refresh_token = keys.sign_refresh(user.id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        internal(e.into())
    })?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        session_expires,
        user: user.into(),
    }))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod me_tests {
    use super::*;

    #[test]
    fn test_me_response_serialization() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            email: "test@example.com".to_string(),
            display_name: Some("Tester".into()),
            dietary_preferences: vec!["vegan".into()],
            created_at: OffsetDateTime::UNIX_EPOCH,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("vegan"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn auth_response_omits_session_expires_unless_remembered() {
        let user = PublicUser {
            id: uuid::Uuid::new_v4(),
            email: "a@b.co".into(),
            display_name: None,
            dietary_preferences: vec![],
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let res = AuthResponse {
            access_token: "a".into(),
            refresh_token: "r".into(),
            session_expires: None,
            user,
        };
        let json = serde_json::to_value(&res).unwrap();
        assert!(json.get("session_expires").is_none());
    }
}
