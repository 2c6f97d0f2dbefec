use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{request::Parts, HeaderMap};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::constants::ADMIN_KEY_HEADER;
use crate::response::AppError;
use crate::state::AppState;
use crate::store::operations::sessions::Session;

/// Random bytes behind a session token (hex-encoded on the wire).
const SESSION_TOKEN_BYTES: usize = 32;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|v| v.to_string())
        .map_err(|e| AppError::internal(&format!("password hash failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(&format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Verified against when the login email is unknown, so both paths cost one
/// argon2 verification.
pub fn dummy_password_hash() -> &'static str {
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0ZHVtbXk$YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY"
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Create and persist a session for `user_id`. Only the token hash is
/// stored; the plain token is returned to the caller once.
pub fn open_session(state: &AppState, user_id: &str) -> Result<(String, Session), AppError> {
    let token = generate_session_token();
    let now = Utc::now();
    let session = Session {
        token_hash: hash_token(&token),
        user_id: user_id.to_string(),
        created_at: now,
        expires_at: now + Duration::hours(state.config().session_ttl_hours as i64),
    };
    state.store().create_session(&session)?;
    Ok((token, session))
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Missing bearer token"))
}

/// Caller authenticated by a live session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub token_hash: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = extract_bearer_token(&parts.headers)?;
        let token_hash = hash_token(&token);

        let session = app_state
            .store()
            .get_session(&token_hash)?
            .ok_or_else(|| AppError::unauthorized("Session not found or expired"))?;

        if app_state.store().get_user_by_id(&session.user_id)?.is_none() {
            return Err(AppError::unauthorized("User not found"));
        }

        Ok(AuthUser {
            user_id: session.user_id,
            token_hash,
        })
    }
}

/// Operator authenticated by the `x-admin-key` header.
#[derive(Debug, Clone, Copy)]
pub struct AdminKey;

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminKey
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let expected = &app_state.config().admin_api_key;
        if expected.is_empty() {
            return Err(AppError::forbidden("Admin API is disabled"));
        }

        let provided = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing admin key"))?;

        // Compare digests so the comparison length does not depend on the input.
        if hash_token(provided) != hash_token(expected) {
            return Err(AppError::unauthorized("Invalid admin key"));
        }

        Ok(AdminKey)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn password_hash_and_verify() {
        let hash = hash_password("Passw0rd!").unwrap();
        assert!(verify_password("Passw0rd!", &hash).unwrap());
        assert!(!verify_password("bad", &hash).unwrap());
    }

    #[test]
    fn dummy_hash_parses_and_never_matches() {
        assert!(!verify_password("Passw0rd!", dummy_password_hash()).unwrap());
    }

    #[test]
    fn session_tokens_are_random_hex() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), SESSION_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn token_hash_is_stable() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc123");

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic abc123"),
        );
        assert!(extract_bearer_token(&headers).is_err());
    }
}
