//! Session-related types.
//!
//! Types stored in the session for authentication state and guest shopping.

use serde::{Deserialize, Serialize};

use essence_core::{Email, UserId};

use super::Profile;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. Roles
/// are not cached here; admin checks always read the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name, if the user gave one.
    pub full_name: Option<String>,
}

impl From<&Profile> for CurrentUser {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for an anonymous visitor's cart (`CartState`).
    pub const GUEST_CART: &str = "guest_cart";

    /// Key for an anonymous visitor's favorites (`FavoriteSet`).
    pub const GUEST_FAVORITES: &str = "guest_favorites";
}
