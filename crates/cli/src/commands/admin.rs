//! Admin role management commands.
//!
//! The account must already exist; register it through the storefront first.

use essence_core::{AppRole, Email, EmailError};
use essence_storefront::db::{RepositoryError, UserRepository};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during role changes.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No account with this email.
    #[error("No account found for email: {0}")]
    UserNotFound(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Give an account the admin role.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if nobody registered with `email`.
pub async fn grant(email: &str) -> Result<(), AdminError> {
    set_role(email, AppRole::Admin).await
}

/// Return an account to the user role.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if nobody registered with `email`.
pub async fn revoke(email: &str) -> Result<(), AdminError> {
    set_role(email, AppRole::User).await
}

async fn set_role(email: &str, role: AppRole) -> Result<(), AdminError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let profile = users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(email.to_string()))?;

    users.set_role(profile.id, role).await?;

    tracing::info!("Role updated! Email: {}, Role: {}", email, role);
    Ok(())
}
