//! Product brands.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::id::BrandId;
use super::validation::{Validate, ValidationError, require_name};

/// A brand. Names are unique by convention only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
}

/// Creation payload for a [`Brand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBrand {
    pub name: String,
}

impl Validate for NewBrand {
    fn validate(&self) -> Result<(), ValidationError> {
        require_name("name", &self.name)
    }
}

impl Entity for Brand {
    type Id = BrandId;
    type Draft = NewBrand;

    const COLLECTION: &'static str = "brands";

    fn id(&self) -> &BrandId {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn from_draft(id: BrandId, draft: NewBrand) -> Self {
        Self {
            id,
            name: draft.name,
        }
    }

    fn validate_record(&self) -> Result<(), ValidationError> {
        require_name("id", self.id.as_str())?;
        require_name("name", &self.name)
    }
}
