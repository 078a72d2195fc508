pub(crate) use crate::auth::dto::{Claims, JwtKeys, TokenKind};
use crate::config::JwtConfig;
use crate::state::AppState;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, warn};
use uuid::Uuid;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Trimmed, lowercased address, or `None` when it does not look like one.
pub(crate) fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    EMAIL_RE.is_match(&email).then_some(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash failed");
            anyhow::anyhow!("password hashing failed: {e}")
        })
}

/// `Ok(false)` on mismatch; errors only when the stored hash is unreadable.
pub fn verify_password(plain: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("stored password hash is malformed: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("expected {expected:?} token, got {found:?}")]
    WrongKind { expected: TokenKind, found: TokenKind },
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes),
            refresh_ttl: Duration::minutes(cfg.refresh_ttl_minutes),
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Sign a token of `kind` as if issued at `now`.
    pub fn issue(&self, user_id: Uuid, kind: TokenKind, now: OffsetDateTime) -> Result<String, TokenError> {
        let exp = now + self.ttl(kind);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%user_id, ?kind, "jwt issued");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, TokenKind::Access, OffsetDateTime::now_utc())
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, TokenKind::Refresh, OffsetDateTime::now_utc())
    }

    fn decode_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let claims = decode::<Claims>(token, &self.decoding, &validation)?.claims;
        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                found: claims.kind,
            });
        }
        Ok(claims)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_kind(token, TokenKind::Access)
    }

    /// Refresh tokens double as the remembered session token on devices.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_kind(token, TokenKind::Refresh)
    }
}

/// Epoch millis at which a remembered login stops being restorable.
pub fn remember_until(now: OffsetDateTime, remember_days: i64) -> i64 {
    let until = now + Duration::days(remember_days);
    (until.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Token from an `Authorization: Bearer <token>` header. Scheme is
/// case-insensitive.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authenticated caller, taken from a `Bearer` access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing bearer token".to_string(),
        ))?;

        match JwtKeys::from_ref(state).verify_access(token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(e) => {
                warn!(error = %e, "access token rejected");
                Err((StatusCode::UNAUTHORIZED, e.to_string()))
            }
        }
    }
}
