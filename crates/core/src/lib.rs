//! Pure domain logic for the Quitanda storefront.
//!
//! This crate has zero internal dependencies so it can be used by the data
//! access layer, the API, and any future CLI tooling.

pub mod campaign;
pub mod error;
pub mod ids;
pub mod roles;
pub mod timefmt;
pub mod types;
