//! Favorites (wishlist) operations for users and guests.

use serde::Serialize;
use sqlx::PgPool;
use tower_sessions::Session;
use tracing::instrument;

use essence_core::{ProductId, UserId};

use super::catalog::CatalogCache;
use super::{ServiceError, sync};
use crate::db::WishlistRepository;
use crate::models::{Notice, ProductView};
use crate::state::AppState;

/// Result of a favorite toggle.
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteToggle {
    pub product_id: ProductId,
    /// Whether the product is a favorite after the toggle.
    pub favorite: bool,
    pub notice: Notice,
}

/// Favorites service for the current visitor.
pub struct FavoritesService<'a> {
    pool: &'a PgPool,
    catalog: &'a CatalogCache,
    session: &'a Session,
    user: Option<UserId>,
}

impl<'a> FavoritesService<'a> {
    #[must_use]
    pub fn new(state: &'a AppState, session: &'a Session, user: Option<UserId>) -> Self {
        Self {
            pool: state.pool(),
            catalog: state.catalog(),
            session,
            user,
        }
    }

    /// Favorited products. Users see newest first; guests in the order added.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if favorites or the catalog cannot be read.
    pub async fn list(&self) -> Result<Vec<ProductView>, ServiceError> {
        let catalog = self.catalog.load(self.pool).await?;

        let views = match self.user {
            Some(user_id) => WishlistRepository::new(self.pool)
                .list(user_id)
                .await?
                .iter()
                .map(|product| catalog.view(product))
                .collect(),
            None => sync::guest_favorites(self.session)
                .await?
                .iter()
                .filter_map(|id| catalog.get(id))
                .map(|product| catalog.view(product))
                .collect(),
        };

        Ok(views)
    }

    /// Flip a product's favorite state.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ProductNotFound` for an unknown product.
    #[instrument(skip(self), fields(user_id = ?self.user))]
    pub async fn toggle(&self, product_id: ProductId) -> Result<FavoriteToggle, ServiceError> {
        let catalog = self.catalog.load(self.pool).await?;
        if catalog.get(product_id).is_none() {
            return Err(ServiceError::ProductNotFound);
        }

        let favorite = match self.user {
            Some(user_id) => match WishlistRepository::new(self.pool)
                .toggle(user_id, product_id)
                .await
            {
                Ok(favorite) => favorite,
                Err(err) => return Err(self.catalog.product_write_error(err).await),
            },
            None => {
                let mut favorites = sync::guest_favorites(self.session).await?;
                let favorite = favorites.toggle(product_id);
                sync::save_guest_favorites(self.session, &favorites).await?;
                favorite
            }
        };

        let notice = if favorite {
            Notice::added_to_favorites()
        } else {
            Notice::removed_from_favorites()
        };

        Ok(FavoriteToggle {
            product_id,
            favorite,
            notice,
        })
    }

    /// Whether a product is a favorite.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if favorites cannot be read.
    pub async fn is_favorite(&self, product_id: ProductId) -> Result<bool, ServiceError> {
        match self.user {
            Some(user_id) => Ok(WishlistRepository::new(self.pool)
                .contains(user_id, product_id)
                .await?),
            None => Ok(sync::guest_favorites(self.session)
                .await?
                .contains(product_id)),
        }
    }
}
