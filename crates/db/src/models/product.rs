//! Product models and request payloads.

use quitanda_core::campaign::CampaignSummary;
use serde::{Deserialize, Serialize};
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity structs (tree records)
// ---------------------------------------------------------------------------

/// A record under `products/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    /// Normalized name used for prefix search.
    pub name_lower_case: String,
    pub quantity: i64,
    pub price: f64,
    pub category: String,
    pub description: String,
    /// Download URL into the blob store.
    pub photo: String,
    pub created_at: String,
    pub updated_at: String,
    /// Denormalized summary of the campaign this product belongs to.
    /// Cleared whenever that campaign stops designating the product as a
    /// member (or is deleted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<CampaignSummary>,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Payload for creating or editing a product (the multipart `payload`
/// part; the photo travels as a separate binary part).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(range(min = 0))]
    pub quantity: i64,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
}

/// Query parameters for `GET /api/v1/products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    /// Filter by category.
    pub category: Option<String>,
    /// Filter by member campaign id.
    pub campaign: Option<String>,
    /// Case-insensitive name prefix.
    pub search: Option<String>,
    /// One of `updatedAt` (default), `createdAt`, `name`.
    pub order_by: Option<String>,
    /// Maximum results.
    pub limit: Option<usize>,
}
