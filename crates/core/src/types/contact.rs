//! Distributor contact information (a singleton record).

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::entity::Entity;
use super::id::ContactInfoId;
use super::validation::{Validate, ValidationError, require_name};

/// Contact details shown on the storefront. At most one record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub id: ContactInfoId,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
}

/// Identifier of the one contact-info record.
pub const CONTACT_INFO_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Creation (and replacement) payload for [`ContactInfo`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContactInfo {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
}

/// Phone numbers: digits plus `+`, spaces, dots, dashes and parentheses.
fn validate_phone(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    let Some(value) = value else {
        return Ok(());
    };
    let digits = value.chars().filter(char::is_ascii_digit).count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '.' | '-' | '(' | ')'));
    if allowed && digits >= 6 {
        Ok(())
    } else {
        Err(ValidationError::Invalid {
            field,
            reason: "expected a phone number".to_string(),
        })
    }
}

impl Validate for NewContactInfo {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_phone("phone", self.phone.as_deref())?;
        validate_phone("whatsapp", self.whatsapp.as_deref())
    }
}

impl Entity for ContactInfo {
    type Id = ContactInfoId;
    type Draft = NewContactInfo;

    const COLLECTION: &'static str = "contact_info";
    const ORDERED_BY_NAME: bool = false;

    fn id(&self) -> &ContactInfoId {
        &self.id
    }

    fn singleton_id() -> Option<ContactInfoId> {
        Some(ContactInfoId::new(CONTACT_INFO_ID))
    }

    fn name(&self) -> Option<&str> {
        None
    }

    fn from_draft(id: ContactInfoId, draft: NewContactInfo) -> Self {
        Self {
            id,
            phone: draft.phone,
            email: draft.email,
            address: draft.address,
            whatsapp: draft.whatsapp,
            opening_hours: draft.opening_hours,
        }
    }

    fn validate_record(&self) -> Result<(), ValidationError> {
        require_name("id", self.id.as_str())?;
        validate_phone("phone", self.phone.as_deref())?;
        validate_phone("whatsapp", self.whatsapp.as_deref())
    }
}

impl ContactInfo {
    /// Replace every field with the payload's values, keeping the identifier.
    #[must_use]
    pub fn replaced_with(&self, draft: NewContactInfo) -> Self {
        Self::from_draft(self.id.clone(), draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert!(validate_phone("phone", Some("+213 (0)21 55-12.34")).is_ok());
        assert!(validate_phone("phone", None).is_ok());
        assert!(validate_phone("phone", Some("call me")).is_err());
        assert!(validate_phone("phone", Some("12")).is_err());
    }

    #[test]
    fn test_empty_contact_is_valid() {
        assert!(NewContactInfo::default().validate().is_ok());
    }
}
