//! Route tree for the API.

pub mod campaigns;
pub mod health;
pub mod informations;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/campaigns", campaigns::router())
        .nest("/informations", informations::router())
}
