//! Repository for the `informations/` settings singleton.

use serde_json::{Map, Value};

use crate::models::informations::Informations;
use crate::paths;
use crate::tree::{StoreError, TreeStore};

/// Reads and maintains the global default/fixed campaign pointers.
pub struct SettingsRepo;

impl SettingsRepo {
    /// Read the settings singleton; an absent record is the default.
    pub async fn get(tree: &dyn TreeStore) -> Result<Informations, StoreError> {
        match tree.get(paths::INFORMATIONS).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Informations::default()),
        }
    }

    /// Record a campaign's default/fixed facets on the settings singleton.
    ///
    /// The two pointer fields are always decided together: a facet the
    /// campaign claims is pointed at it, a facet it previously held and no
    /// longer claims is cleared, and `fixed` is only ever recorded when
    /// `default` is also claimed, whatever the caller sent. Facets held by
    /// other campaigns are left untouched.
    pub async fn apply_campaign_facets(
        tree: &dyn TreeStore,
        campaign_id: &str,
        default: bool,
        fixed: bool,
        current: &Informations,
    ) -> Result<(), StoreError> {
        let mut partial = Map::new();

        if default {
            partial.insert(
                "defaultCampaign".into(),
                Value::String(campaign_id.to_string()),
            );
        } else if current.default_campaign.as_deref() == Some(campaign_id) {
            partial.insert("defaultCampaign".into(), Value::Null);
        }

        if fixed && default {
            partial.insert(
                "fixedCampaign".into(),
                Value::String(campaign_id.to_string()),
            );
        } else if current.fixed_campaign.as_deref() == Some(campaign_id) {
            partial.insert("fixedCampaign".into(), Value::Null);
        }

        if partial.is_empty() {
            return Ok(());
        }
        tree.update(paths::INFORMATIONS, partial).await
    }
}
