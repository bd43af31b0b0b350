//! Favorites: a (user, product) membership pair.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, UserId};

/// Presence of the pair means the user favorited the product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: UserId,
    pub product_id: ProductId,
}

impl Favorite {
    /// Build a favorite pair.
    #[must_use]
    pub const fn new(user_id: UserId, product_id: ProductId) -> Self {
        Self {
            user_id,
            product_id,
        }
    }
}
