//! Campaign models and request payloads.

use quitanda_core::campaign::CampaignSummary;
use quitanda_core::timefmt::parse_timestamp;
use quitanda_core::types::EntityId;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// ---------------------------------------------------------------------------
// Entity structs (tree records)
// ---------------------------------------------------------------------------

/// A record under `campaigns/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    pub title: String,
    pub description: String,
    /// Site-wide fallback promotion flag; at most one campaign holds it.
    pub r#default: bool,
    /// Pinned-banner flag; only ever recorded together with `default`.
    pub fixed: bool,
    /// String-encoded discount percentage. All of `reduction`,
    /// `start_date` and `finish_date` must be present for a discount to
    /// ever apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_date: Option<String>,
    /// Member product ids, in the order the admin picked them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<EntityId>>,
    /// Download URL into the blob store.
    pub photo: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CampaignRecord {
    /// The denormalized summary written onto member products.
    pub fn summary(&self, id: &str) -> CampaignSummary {
        CampaignSummary {
            id: id.to_string(),
            title: self.title.clone(),
            reduction: self.reduction.clone(),
            start_date: self.start_date.clone(),
            finish_date: self.finish_date.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Payload for creating or editing a campaign (the multipart `payload`
/// part; the photo travels as a separate binary part).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInput {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    #[serde(default)]
    pub r#default: bool,
    #[serde(default)]
    pub fixed: bool,
    #[validate(custom(function = validate_reduction))]
    pub reduction: Option<String>,
    #[validate(custom(function = validate_date))]
    pub start_date: Option<String>,
    #[validate(custom(function = validate_date))]
    pub finish_date: Option<String>,
    pub products: Option<Vec<EntityId>>,
}

impl CampaignInput {
    /// Map the empty values web forms submit (`""`, `[]`) to absent, the
    /// shape the records store. Run before validation.
    pub fn normalize(mut self) -> Self {
        self.reduction = self.reduction.filter(|value| !value.trim().is_empty());
        self.start_date = self.start_date.filter(|value| !value.is_empty());
        self.finish_date = self.finish_date.filter(|value| !value.is_empty());
        self.products = self.products.filter(|ids| !ids.is_empty());
        self
    }
}

/// A reduction must be a percentage in `[0, 100]`.
fn validate_reduction(reduction: &str) -> Result<(), ValidationError> {
    match reduction.trim().parse::<f64>() {
        Ok(percent) if (0.0..=100.0).contains(&percent) => Ok(()),
        _ => Err(ValidationError::new("reduction")
            .with_message("reduction must be a percentage between 0 and 100".into())),
    }
}

/// Validity dates must parse; malformed dates are rejected before any
/// write (reads stay lenient).
fn validate_date(value: &str) -> Result<(), ValidationError> {
    parse_timestamp(value).map(|_| ()).map_err(|_| {
        ValidationError::new("date").with_message("must be an ISO-8601 timestamp".into())
    })
}

/// Query parameters for `GET /api/v1/campaigns`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignListParams {
    /// One of `updatedAt` (default), `createdAt`, `title`.
    pub order_by: Option<String>,
}
