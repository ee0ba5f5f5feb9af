//! Entity models and request payloads for the tree-backed records.
//!
//! Wire names are camelCase to match the tree layout the storefront
//! already uses.

pub mod campaign;
pub mod informations;
pub mod product;

use quitanda_core::types::EntityId;
use serde::{Deserialize, Serialize};

/// A record paired with the tree key it lives under. Records do not store
/// their own id; the key is the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyed<T> {
    pub id: EntityId,
    #[serde(flatten)]
    pub record: T,
}
