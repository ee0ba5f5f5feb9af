//! Route definitions for promotion campaigns.
//!
//! ```text
//! GET    /        -> list_campaigns
//! POST   /        -> create_campaign (admin)
//! GET    /{id}    -> get_campaign
//! PUT    /{id}    -> update_campaign (admin)
//! DELETE /{id}    -> delete_campaign (admin)
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route(
            "/{id}",
            get(campaigns::get_campaign)
                .put(campaigns::update_campaign)
                .delete(campaigns::delete_campaign),
        )
}
