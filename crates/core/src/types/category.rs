//! Utility categories ("Cuisine", "Sols", "Vitres", ...).

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::id::CategoryId;
use super::validation::{Validate, ValidationError, require_name};

/// A product category with a display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityCategory {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
}

/// Creation payload for a [`UtilityCategory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUtilityCategory {
    pub name: String,
    pub color: String,
}

/// Accept `#rgb` and `#rrggbb` CSS colors.
fn validate_color(color: &str) -> Result<(), ValidationError> {
    if color.trim().is_empty() {
        return Err(ValidationError::Required("color"));
    }
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::Invalid {
            field: "color",
            reason: format!("expected #rgb or #rrggbb, got {color:?}"),
        })
    }
}

impl Validate for NewUtilityCategory {
    fn validate(&self) -> Result<(), ValidationError> {
        require_name("name", &self.name)?;
        validate_color(&self.color)
    }
}

impl Entity for UtilityCategory {
    type Id = CategoryId;
    type Draft = NewUtilityCategory;

    const COLLECTION: &'static str = "categories";

    fn id(&self) -> &CategoryId {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn from_draft(id: CategoryId, draft: NewUtilityCategory) -> Self {
        Self {
            id,
            name: draft.name,
            color: draft.color,
        }
    }

    fn validate_record(&self) -> Result<(), ValidationError> {
        require_name("id", self.id.as_str())?;
        require_name("name", &self.name)?;
        validate_color(&self.color)
    }
}
