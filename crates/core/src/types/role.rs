//! Role claims issued by the authentication collaborator.

use serde::{Deserialize, Serialize};

/// Back-office role attached to a user profile.
///
/// Users without a role are plain storefront customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access: products, brands, categories and contact information.
    Admin,
    /// Sales staff: may manage products only.
    Vendeur,
}

impl UserRole {
    /// Whether this role may create, edit and delete products.
    #[must_use]
    pub const fn can_manage_products(self) -> bool {
        matches!(self, Self::Admin | Self::Vendeur)
    }

    /// Whether this role may manage brands, categories and contact info.
    #[must_use]
    pub const fn can_manage_catalog(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Vendeur => write!(f, "vendeur"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "vendeur" => Ok(Self::Vendeur),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
