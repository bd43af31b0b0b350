//! Resolution of weak references (product -> brand / category).
//!
//! References carry no integrity guarantee, so display code must cope with a
//! referent that has been deleted.

use super::entity::Entity;

/// Label shown when a reference cannot be resolved.
pub const UNKNOWN_LABEL: &str = "Inconnu";

/// Look up the name of the referenced entity, if it still exists.
#[must_use]
pub fn resolve_name<'a, T: Entity>(items: &'a [T], id: Option<&T::Id>) -> Option<&'a str> {
    let id = id?;
    items.iter().find(|item| item.id() == id).and_then(Entity::name)
}

/// Name of the referenced entity, falling back to [`UNKNOWN_LABEL`].
///
/// Returns `None` only when there is no reference at all.
#[must_use]
pub fn display_name<'a, T: Entity>(items: &'a [T], id: Option<&T::Id>) -> Option<&'a str> {
    id.map(|id| resolve_name(items, Some(id)).unwrap_or(UNKNOWN_LABEL))
}
