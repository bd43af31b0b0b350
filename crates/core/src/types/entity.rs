//! The shape every catalog entity shares.

use serde::Serialize;
use serde::de::DeserializeOwned;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::id::EntityId;
use super::validation::{Validate, ValidationError};

/// A catalog entity persisted by a backing store.
///
/// `Draft` is the creation payload: the entity minus its identifier, which the
/// store assigns. Both stores use [`Entity::COLLECTION`] to name where the
/// records live (remote table name, local storage key suffix).
pub trait Entity:
    Clone + core::fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Identifier type.
    type Id: EntityId;
    /// Creation payload.
    type Draft: Validate + Clone + core::fmt::Debug + Serialize + Send + Sync + 'static;

    /// Collection name shared by both backing stores.
    const COLLECTION: &'static str;

    /// Whether the collection has a `name` column to order by.
    const ORDERED_BY_NAME: bool = true;

    /// The record's identifier.
    fn id(&self) -> &Self::Id;

    /// Fixed identifier for collections that hold at most one record.
    ///
    /// Creating such a record writes under this id, so concurrent first
    /// writes land on the same row.
    fn singleton_id() -> Option<Self::Id> {
        None
    }

    /// Display name used for ordering, if the entity has one.
    fn name(&self) -> Option<&str>;

    /// Attach an identifier to a draft.
    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self;

    /// Validate a full record before an update.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    fn validate_record(&self) -> Result<(), ValidationError>;
}

/// Ordering key for display names.
///
/// Names compare with accents folded first (`"Éclat"` sorts with the `E`s),
/// then on the raw text, so the order stays case-sensitive and total.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    folded: String,
    raw: String,
}

impl CollationKey {
    #[must_use]
    pub fn new(name: &str) -> Self {
        let folded = name
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(expand_ligature)
            .collect();
        Self {
            folded,
            raw: name.to_string(),
        }
    }
}

fn expand_ligature(c: char) -> impl Iterator<Item = char> {
    let expanded: &'static [char] = match c {
        'œ' => &['o', 'e'],
        'Œ' => &['O', 'E'],
        'æ' => &['a', 'e'],
        'Æ' => &['A', 'E'],
        'ß' => &['s', 's'],
        _ => &[],
    };
    let single = expanded.is_empty().then_some(c);
    expanded.iter().copied().chain(single)
}

/// Sort records by name ascending, in catalog order.
///
/// Entities without a name keep their relative order.
pub fn sort_by_name<T: Entity>(records: &mut [T]) {
    records.sort_by_cached_key(|record| record.name().map(CollationKey::new));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Brand, BrandId};

    #[test]
    fn test_sort_by_name_is_case_sensitive() {
        let mut brands = vec![
            Brand { id: BrandId::new("1"), name: "javel".to_string() },
            Brand { id: BrandId::new("2"), name: "Ajax".to_string() },
            Brand { id: BrandId::new("3"), name: "Extra Clean".to_string() },
        ];
        sort_by_name(&mut brands);
        let names: Vec<_> = brands.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Ajax", "Extra Clean", "javel"]);
    }

    #[test]
    fn test_sort_by_name_folds_accents() {
        let mut brands = vec![
            Brand { id: BrandId::new("1"), name: "Zeste".to_string() },
            Brand { id: BrandId::new("2"), name: "Éclat".to_string() },
            Brand { id: BrandId::new("3"), name: "Ajax".to_string() },
            Brand { id: BrandId::new("4"), name: "Eclat".to_string() },
            Brand { id: BrandId::new("5"), name: "Œuf Net".to_string() },
        ];
        sort_by_name(&mut brands);
        let names: Vec<_> = brands.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Ajax", "Eclat", "Éclat", "Œuf Net", "Zeste"]);
    }

    #[test]
    fn test_collation_key_order() {
        assert!(CollationKey::new("Éclat") < CollationKey::new("Zeste"));
        assert!(CollationKey::new("crème") > CollationKey::new("Crème"));
        assert_eq!(CollationKey::new("Javel"), CollationKey::new("Javel"));
    }
}
