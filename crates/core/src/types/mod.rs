//! Core types for the Éclat catalog.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! entity shapes persisted by the backing stores.

pub mod brand;
pub mod category;
pub mod contact;
pub mod email;
pub mod entity;
pub mod favorite;
pub mod id;
pub mod price;
pub mod product;
pub mod reference;
pub mod role;
pub mod validation;

pub use brand::{Brand, NewBrand};
pub use category::{NewUtilityCategory, UtilityCategory};
pub use contact::{CONTACT_INFO_ID, ContactInfo, NewContactInfo};
pub use email::{Email, EmailError};
pub use entity::{CollationKey, Entity, sort_by_name};
pub use favorite::Favorite;
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use product::{NewProduct, PLACEHOLDER_IMAGE_URL, Product};
pub use reference::{UNKNOWN_LABEL, display_name, resolve_name};
pub use role::UserRole;
pub use validation::{Validate, ValidationError};
