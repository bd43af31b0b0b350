//! Backing-store mode selection.
//!
//! The mode is decided once, from configuration, when the
//! [`CatalogContext`](crate::CatalogContext) is built. There is no way to
//! switch a running process between modes.

use std::fmt;

/// Which backing store the catalog talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendMode {
    /// Hosted table API, object storage and auth service.
    #[default]
    Remote,
    /// Local persistent key-value storage ("offline" mode).
    Local,
}

impl BackendMode {
    /// Whether the catalog runs without the remote service.
    #[must_use]
    pub const fn is_offline(self) -> bool {
        matches!(self, Self::Local)
    }

    /// Parse the offline flag (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`).
    ///
    /// # Errors
    ///
    /// Returns the unrecognized value.
    pub fn from_offline_flag(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Self::Local),
            "false" | "0" | "no" | "off" | "" => Ok(Self::Remote),
            other => Err(format!("expected a boolean, got {other:?}")),
        }
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "online"),
            Self::Local => write!(f, "offline"),
        }
    }
}
