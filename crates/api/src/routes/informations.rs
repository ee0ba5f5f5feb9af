//! Route definition for the settings singleton.
//!
//! ```text
//! GET / -> get_informations
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::informations;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(informations::get_informations))
}
