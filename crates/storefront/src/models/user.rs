//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use essence_core::{AppRole, Email, UserId};

/// A registered customer's profile.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile plus role, as listed in the admin panel.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRole {
    #[serde(flatten)]
    pub profile: Profile,
    pub role: AppRole,
}
