use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{dummy_password_hash, hash_password, open_session, verify_password, AuthUser};
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::services::starter_content::StarterGrant;
use crate::state::AppState;
use crate::store::operations::users::User;
use crate::store::StoreError;
use crate::validation::{is_valid_email, validate_password, validate_username};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl RegisterRequest {
    /// Normalized `(email, username)`, or the first rule the input breaks.
    fn normalize(&self) -> Result<(String, String), AppError> {
        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::bad_request("AUTH_INVALID_EMAIL", "Invalid email format"));
        }
        let username = self.username.trim();
        validate_username(username)
            .map_err(|msg| AppError::bad_request("AUTH_INVALID_USERNAME", msg))?;
        validate_password(&self.password)
            .map_err(|msg| AppError::bad_request("AUTH_WEAK_PASSWORD", msg))?;
        Ok((email, username.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub pack_balance: u32,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(value: &User) -> Self {
        Self {
            id: value.id.clone(),
            email: value.email.clone(),
            username: value.username.clone(),
            pack_balance: value.pack_balance,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: chrono::DateTime<Utc>,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[serde(flatten)]
    pub auth: AuthResponse,
    /// `None` when the grant failed; the account exists either way.
    pub starter_content: Option<StarterGrant>,
}

async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Response, AppError> {
    let (email, username) = req.normalize()?;

    let now = Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        username,
        password_hash: hash_password(&req.password)?,
        pack_balance: 0,
        created_at: now,
        updated_at: now,
    };

    state.store().create_user(&user).map_err(|e| match e {
        StoreError::Conflict { .. } => {
            AppError::conflict("AUTH_EMAIL_EXISTS", "Email already registered")
        }
        other => other.into(),
    })?;
    tracing::info!(user_id = %user.id, "User registered");

    let starter_content = state
        .starter()
        .grant(&user.id)
        .inspect_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Starter content grant failed");
        })
        .ok();

    // Re-read so the profile carries the credited pack balance.
    let user = state.store().get_user_by_id(&user.id)?.unwrap_or(user);
    let (token, session) = open_session(&state, &user.id)?;

    Ok(created(RegisterResponse {
        auth: AuthResponse {
            token,
            expires_at: session.expires_at,
            user: UserProfile::from(&user),
        },
        starter_content,
    })
    .into_response())
}

async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Response, AppError> {
    let email = req.email.trim().to_lowercase();
    let user = state.store().get_user_by_email(&email)?;

    let password_hash = user
        .as_ref()
        .map(|u| u.password_hash.as_str())
        .unwrap_or(dummy_password_hash());
    let verified = verify_password(&req.password, password_hash)?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::warn!("Login rejected");
            return Err(AppError::unauthorized("Invalid email or password"));
        }
    };

    let (token, session) = open_session(&state, &user.id)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(ok(AuthResponse {
        token,
        expires_at: session.expires_at,
        user: UserProfile::from(&user),
    })
    .into_response())
}

async fn logout(State(state): State<AppState>, auth: AuthUser) -> Result<Response, AppError> {
    let removed = state.store().delete_session(&auth.token_hash)?;
    tracing::info!(user_id = %auth.user_id, removed, "User logged out");
    Ok(ok(serde_json::json!({ "loggedOut": true })).into_response())
}
