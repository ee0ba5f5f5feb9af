//! Handlers for promotion campaigns.
//!
//! Mutations run the consistency maintenance in `CampaignRepo`: member
//! product snapshots and the settings singleton are repaired as part of
//! each operation. All mutations require the admin role.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use quitanda_core::error::CoreError;
use quitanda_db::models::campaign::{CampaignInput, CampaignListParams};
use quitanda_db::models::Keyed;
use quitanda_db::repositories::CampaignRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload::read_payload_with_photo;

/// GET /api/v1/campaigns
///
/// List campaigns, newest first within the chosen ordering.
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(params): Query<CampaignListParams>,
) -> AppResult<impl IntoResponse> {
    let campaigns = CampaignRepo::list(state.tree.as_ref(), params.order_by.as_deref()).await?;

    Ok(Json(DataResponse { data: campaigns }))
}

/// GET /api/v1/campaigns/{id}
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = CampaignRepo::find_by_id(state.tree.as_ref(), &id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id: id.clone(),
        }))?;

    Ok(Json(DataResponse {
        data: Keyed { id, record },
    }))
}

/// POST /api/v1/campaigns
///
/// Multipart: `payload` (JSON) + `photo` (binary, required). Admin only.
pub async fn create_campaign(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let parts = read_payload_with_photo::<CampaignInput>(multipart).await?;
    let input = parts.payload.normalize();
    input.validate()?;
    let photo = parts
        .photo
        .ok_or_else(|| AppError::BadRequest("missing 'photo' part".to_string()))?;

    let campaign =
        CampaignRepo::create(state.tree.as_ref(), state.blobs.as_ref(), &input, &photo).await?;

    tracing::info!(
        campaign_id = %campaign.id,
        user_id = %admin.user_id,
        default = input.r#default,
        fixed = input.fixed,
        "Campaign created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: campaign })))
}

/// PUT /api/v1/campaigns/{id}
///
/// Multipart: `payload` (JSON) + optional `photo` replacement. Admin only.
pub async fn update_campaign(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let parts = read_payload_with_photo::<CampaignInput>(multipart).await?;
    let input = parts.payload.normalize();
    input.validate()?;

    let previous = CampaignRepo::find_by_id(state.tree.as_ref(), &id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id: id.clone(),
        }))?;

    let record = CampaignRepo::edit(
        state.tree.as_ref(),
        state.blobs.as_ref(),
        &id,
        &input,
        Some(&previous),
        parts.photo.as_ref(),
    )
    .await?;

    tracing::info!(campaign_id = %id, user_id = %admin.user_id, "Campaign updated");

    Ok(Json(DataResponse {
        data: Keyed { id, record },
    }))
}

/// DELETE /api/v1/campaigns/{id}
///
/// Removes the record and photo, then sweeps dangling product references.
/// Deleting an absent campaign is a no-op. Admin only.
pub async fn delete_campaign(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    CampaignRepo::delete(state.tree.as_ref(), state.blobs.as_ref(), &id).await?;

    tracing::info!(campaign_id = %id, user_id = %admin.user_id, "Campaign deleted");

    Ok(StatusCode::NO_CONTENT)
}
