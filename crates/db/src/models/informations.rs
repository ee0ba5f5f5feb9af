//! The settings singleton stored at `informations/`.

use quitanda_core::types::EntityId;
use serde::{Deserialize, Serialize};

/// Global pointers naming the campaigns currently holding the `default`
/// and `fixed` facets. At most one campaign holds each facet at a time,
/// and `fixed_campaign` only ever names a campaign that is also the
/// default.
///
/// Created implicitly on the first facet write; both fields stay absent
/// until a campaign claims them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Informations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_campaign: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_campaign: Option<EntityId>,
}
