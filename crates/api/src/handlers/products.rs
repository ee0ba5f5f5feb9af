//! Handlers for the product catalog.
//!
//! Reads are public (the storefront browses anonymously); mutations
//! require the admin role via [`RequireAdmin`].

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use quitanda_core::error::CoreError;
use quitanda_db::models::product::{ProductInput, ProductListParams};
use quitanda_db::models::Keyed;
use quitanda_db::repositories::ProductRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload::read_payload_with_photo;

/// GET /api/v1/products
///
/// List products with the storefront filters (category, campaign
/// membership, name search), newest first.
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> AppResult<impl IntoResponse> {
    let products = ProductRepo::list(state.tree.as_ref(), &params).await?;

    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = ProductRepo::find_by_id(state.tree.as_ref(), &id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: id.clone(),
        }))?;

    Ok(Json(DataResponse {
        data: Keyed { id, record },
    }))
}

/// POST /api/v1/products
///
/// Multipart: `payload` (JSON) + `photo` (binary, required). Admin only.
pub async fn create_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let parts = read_payload_with_photo::<ProductInput>(multipart).await?;
    let input = parts.payload;
    input.validate()?;
    let photo = parts
        .photo
        .ok_or_else(|| AppError::BadRequest("missing 'photo' part".to_string()))?;

    let product =
        ProductRepo::create(state.tree.as_ref(), state.blobs.as_ref(), &input, &photo).await?;

    tracing::info!(product_id = %product.id, user_id = %admin.user_id, "Product created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// PUT /api/v1/products/{id}
///
/// Multipart: `payload` (JSON) + optional `photo` replacement. Admin only.
pub async fn update_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let parts = read_payload_with_photo::<ProductInput>(multipart).await?;
    let input = parts.payload;
    input.validate()?;

    let previous = ProductRepo::find_by_id(state.tree.as_ref(), &id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: id.clone(),
        }))?;

    let record = ProductRepo::edit(
        state.tree.as_ref(),
        state.blobs.as_ref(),
        &id,
        &input,
        Some(&previous),
        parts.photo.as_ref(),
    )
    .await?;

    tracing::info!(product_id = %id, user_id = %admin.user_id, "Product updated");

    Ok(Json(DataResponse {
        data: Keyed { id, record },
    }))
}

/// DELETE /api/v1/products/{id}
///
/// Removes the record and photo, then prunes the id from the owning
/// campaign's member list. Admin only.
pub async fn delete_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let previous = ProductRepo::find_by_id(state.tree.as_ref(), &id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: id.clone(),
        }))?;

    ProductRepo::delete(
        state.tree.as_ref(),
        state.blobs.as_ref(),
        &id,
        previous.campaign.as_ref(),
    )
    .await?;

    tracing::info!(product_id = %id, user_id = %admin.user_id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}
