//! Authentication route handlers.
//!
//! Email and password accounts. Signing in (or registering) moves the guest
//! cart and favorites from the session into the account.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{instrument, warn};

use essence_core::AppRole;

use crate::db::UserRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, Profile};
use crate::services::auth::AuthService;
use crate::services::sync::{self, MergeReport};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// Result of signing in.
#[derive(Debug, Serialize)]
pub struct SignedIn {
    pub user: Profile,
    /// What was carried over from the anonymous session.
    pub merged: MergeReport,
}

/// The signed-in user with their role.
#[derive(Debug, Serialize)]
pub struct Me {
    pub user: Profile,
    pub role: AppRole,
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account and sign in.
#[instrument(skip(state, session, body))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SignedIn>)> {
    let profile = AuthService::new(state.pool())
        .register_with_password(&body.email, &body.password, body.full_name.as_deref())
        .await?;

    let signed_in = sign_in(&state, &session, profile).await?;
    Ok((StatusCode::CREATED, Json(signed_in)))
}

/// Sign in with email and password.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SignedIn>> {
    let profile = AuthService::new(state.pool())
        .login_with_password(&body.email, &body.password)
        .await
        .inspect_err(|_| warn!("Failed login attempt"))?;

    Ok(Json(sign_in(&state, &session, profile).await?))
}

/// End the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in user's profile and role.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Me>> {
    let users = UserRepository::new(state.pool());
    let profile = users
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("You need to be logged in".to_string()))?;
    let role = users.role(user.id).await?;

    Ok(Json(Me {
        user: profile,
        role,
    }))
}

/// Store the user in the session and merge their guest state.
async fn sign_in(state: &AppState, session: &Session, profile: Profile) -> Result<SignedIn> {
    let current = CurrentUser::from(&profile);
    set_current_user(session, &current).await?;

    let merged = sync::merge_guest_state(state.pool(), session, current.id).await?;

    set_sentry_user(&current.id, Some(current.email.as_str()));
    tracing::info!(user_id = %current.id, "User signed in");

    Ok(SignedIn {
        user: profile,
        merged,
    })
}
