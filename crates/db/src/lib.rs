//! Data access for the Quitanda storefront.
//!
//! The external realtime tree is the sole persistent owner of all records;
//! anything held in memory is a cache invalidated by the next notification.
//! This crate defines the store interfaces ([`tree::TreeStore`],
//! [`blob::BlobStore`]), the backends (in-memory and REST), the entity
//! models, and the repositories that keep denormalized campaign data
//! consistent across writes.

pub mod blob;
pub mod memory;
pub mod models;
pub mod paths;
pub mod repositories;
pub mod rest;
pub mod tree;

pub use blob::BlobStore;
pub use tree::{StoreError, TreeStore};
