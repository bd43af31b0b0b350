//! Payload validation shared by every backing store.

/// Maximum length accepted for entity names.
pub const MAX_NAME_LENGTH: usize = 200;

/// A payload was rejected before reaching a backing store.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("{0} is required")]
    Required(&'static str),
    /// A field is present but malformed.
    #[error("{field}: {reason}")]
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

/// Types that can check their own invariants.
pub trait Validate {
    /// Check the value.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Require a non-blank name of reasonable length.
pub(crate) fn require_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::Invalid {
            field,
            reason: format!("must be at most {MAX_NAME_LENGTH} characters"),
        });
    }
    Ok(())
}

/// Reject optional references that are present but blank.
pub(crate) fn non_blank_ref(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ValidationError::Invalid {
            field,
            reason: "must not be blank when set".to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_name() {
        assert_eq!(require_name("name", "  "), Err(ValidationError::Required("name")));
        assert!(require_name("name", "Javel").is_ok());
        assert!(require_name("name", &"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_non_blank_ref() {
        assert!(non_blank_ref("brand_id", None).is_ok());
        assert!(non_blank_ref("brand_id", Some("b1")).is_ok());
        assert!(non_blank_ref("brand_id", Some(" ")).is_err());
    }

    #[test]
    fn test_display() {
        let err = ValidationError::Invalid {
            field: "color",
            reason: "must be a hex color".to_string(),
        };
        assert_eq!(err.to_string(), "color: must be a hex color");
    }
}
