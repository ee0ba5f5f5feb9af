//! Repositories over the external tree.
//!
//! The campaign operations double as the consistency maintainer: every
//! campaign lifecycle write repairs the denormalized snapshots on member
//! products and the `informations/` singleton, in a documented order,
//! without transactions and without rollback. A partially applied
//! operation leaves the tree in an intermediate but individually valid
//! state.

mod campaign_repo;
mod product_repo;
mod settings_repo;

pub use campaign_repo::CampaignRepo;
pub use product_repo::ProductRepo;
pub use settings_repo::SettingsRepo;

/// Server-assigned timestamp in the record format (RFC 3339 with
/// millisecond precision, `Z` suffix).
pub(crate) fn now_iso() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
