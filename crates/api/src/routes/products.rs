//! Route definitions for the product catalog.
//!
//! ```text
//! GET    /        -> list_products
//! POST   /        -> create_product (admin)
//! GET    /{id}    -> get_product
//! PUT    /{id}    -> update_product (admin)
//! DELETE /{id}    -> delete_product (admin)
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::products;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
}
