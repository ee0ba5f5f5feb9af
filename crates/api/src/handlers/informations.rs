//! Handler for the settings singleton.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use quitanda_db::repositories::SettingsRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/informations
///
/// The settings singleton naming the current default/fixed campaigns.
/// Public: the storefront header needs it on every page.
pub async fn get_informations(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let informations = SettingsRepo::get(state.tree.as_ref()).await?;

    Ok(Json(DataResponse { data: informations }))
}
