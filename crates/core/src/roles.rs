//! Well-known role name constants.
//!
//! Roles are assigned by the external identity provider; the API only ever
//! checks them.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CLIENT: &str = "client";
