//! Repository for `campaigns/{id}` records.
//!
//! These operations are the consistency maintainer for the denormalized
//! campaign data. Member products carry a campaign summary that is
//! repaired on every campaign mutation, and the `informations/` singleton
//! tracks the default/fixed facets. Writes follow the documented order and
//! are never rolled back; member fan-out writes run concurrently, each one
//! failing independently.

use futures::future::join_all;
use quitanda_core::campaign::CampaignSummary;
use quitanda_core::ids::new_entity_id;
use quitanda_core::types::EntityId;
use serde_json::{Map, Value};

use crate::blob::{BlobStore, PhotoUpload};
use crate::models::campaign::{CampaignInput, CampaignRecord};
use crate::models::Keyed;
use crate::paths;
use crate::repositories::{now_iso, ProductRepo, SettingsRepo};
use crate::tree::{order_entries, StoreError, TreeStore};

/// Default ordering key for campaign listings.
const DEFAULT_ORDER: &str = "updatedAt";

/// Campaign CRUD plus the snapshot/settings repair that goes with it.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Find a campaign by its key.
    pub async fn find_by_id(
        tree: &dyn TreeStore,
        id: &str,
    ) -> Result<Option<CampaignRecord>, StoreError> {
        match tree.get(&paths::campaign(id)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// List campaigns, newest first within the chosen ordering.
    pub async fn list(
        tree: &dyn TreeStore,
        order_by: Option<&str>,
    ) -> Result<Vec<Keyed<CampaignRecord>>, StoreError> {
        let Some(value) = tree.get(paths::CAMPAIGNS).await? else {
            return Ok(Vec::new());
        };
        let Some(object) = value.as_object() else {
            return Ok(Vec::new());
        };

        let mut entries = order_entries(object, Some(order_by.unwrap_or(DEFAULT_ORDER)));
        entries.reverse();

        let mut items = Vec::new();
        for (id, value) in entries {
            match serde_json::from_value::<CampaignRecord>(value) {
                Ok(record) => items.push(Keyed { id, record }),
                Err(err) => {
                    tracing::warn!(campaign_id = %id, error = %err, "skipping malformed campaign record");
                }
            }
        }
        Ok(items)
    }

    /// Create a campaign.
    ///
    /// Order of effects: photo upload, record write (awaited, so the
    /// record exists before anything references it), member snapshot
    /// fan-out, settings facets. Later-step failures leave earlier steps
    /// in place.
    pub async fn create(
        tree: &dyn TreeStore,
        blobs: &dyn BlobStore,
        input: &CampaignInput,
        photo: &PhotoUpload,
    ) -> Result<Keyed<CampaignRecord>, StoreError> {
        let id = new_entity_id();
        let url = blobs.put(&paths::campaign_photo(&id), photo).await?;
        let now = now_iso();
        let record = CampaignRecord {
            title: input.title.clone(),
            description: input.description.clone(),
            r#default: input.r#default,
            fixed: input.fixed,
            reduction: input.reduction.clone(),
            start_date: input.start_date.clone(),
            finish_date: input.finish_date.clone(),
            products: input.products.clone(),
            photo: url,
            created_at: now.clone(),
            updated_at: now,
        };
        tree.set(&paths::campaign(&id), serde_json::to_value(&record)?)
            .await?;

        if let Some(members) = &record.products {
            let summary = record.summary(&id);
            Self::write_snapshots(tree, members, &summary).await;
        }

        let settings = SettingsRepo::get(tree).await?;
        SettingsRepo::apply_campaign_facets(tree, &id, input.r#default, input.fixed, &settings)
            .await?;

        tracing::info!(
            campaign_id = %id,
            default = input.r#default,
            fixed = input.fixed,
            members = record.products.as_ref().map_or(0, Vec::len),
            "campaign created",
        );
        Ok(Keyed { id, record })
    }

    /// Edit a campaign.
    ///
    /// `previous` is the caller's last known record; the maintainer never
    /// re-reads it before writing. Order of effects: optional photo
    /// replace, record update (photo URL and creation time preserved),
    /// default-promotion sweep, membership repair, settings facets.
    pub async fn edit(
        tree: &dyn TreeStore,
        blobs: &dyn BlobStore,
        id: &str,
        input: &CampaignInput,
        previous: Option<&CampaignRecord>,
        photo: Option<&PhotoUpload>,
    ) -> Result<CampaignRecord, StoreError> {
        let previous = previous.ok_or(StoreError::MissingTarget("campaign"))?;
        if id.is_empty() {
            return Err(StoreError::MissingTarget("campaign id"));
        }

        if let Some(photo) = photo {
            // same blob path, so the stored download URL keeps working
            blobs.put(&paths::campaign_photo(id), photo).await?;
        }

        let record = CampaignRecord {
            title: input.title.clone(),
            description: input.description.clone(),
            r#default: input.r#default,
            fixed: input.fixed,
            reduction: input.reduction.clone(),
            start_date: input.start_date.clone(),
            finish_date: input.finish_date.clone(),
            products: input.products.clone(),
            photo: previous.photo.clone(),
            created_at: previous.created_at.clone(),
            updated_at: now_iso(),
        };

        let mut partial = Map::new();
        partial.insert("title".into(), Value::String(record.title.clone()));
        partial.insert(
            "description".into(),
            Value::String(record.description.clone()),
        );
        partial.insert("default".into(), Value::Bool(record.r#default));
        partial.insert("fixed".into(), Value::Bool(record.fixed));
        partial.insert("reduction".into(), opt_string(&record.reduction));
        partial.insert("startDate".into(), opt_string(&record.start_date));
        partial.insert("finishDate".into(), opt_string(&record.finish_date));
        partial.insert(
            "products".into(),
            match &record.products {
                Some(ids) => serde_json::to_value(ids)?,
                None => Value::Null,
            },
        );
        partial.insert("photo".into(), Value::String(record.photo.clone()));
        partial.insert("updatedAt".into(), Value::String(record.updated_at.clone()));
        tree.update(&paths::campaign(id), partial).await?;

        // A campaign promoted to site-wide default stops applying through
        // membership: every product still pointing at it is cleared.
        if !previous.r#default && input.r#default {
            let members = ProductRepo::find_by_campaign(tree, id).await?;
            Self::clear_snapshots(tree, &members).await;
        }

        // Membership repair: removed ids lose their snapshot; the current
        // member list is refreshed (or cleared wholesale under a default
        // campaign, which does not use member snapshots).
        let old_ids = previous.products.clone().unwrap_or_default();
        let new_ids = record.products.clone().unwrap_or_default();
        let removed: Vec<EntityId> = old_ids
            .iter()
            .filter(|member| !new_ids.contains(*member))
            .cloned()
            .collect();
        Self::clear_snapshots(tree, &removed).await;
        if input.r#default {
            Self::clear_snapshots(tree, &new_ids).await;
        } else {
            let summary = record.summary(id);
            Self::write_snapshots(tree, &new_ids, &summary).await;
        }

        let settings = SettingsRepo::get(tree).await?;
        SettingsRepo::apply_campaign_facets(tree, id, input.r#default, input.fixed, &settings)
            .await?;

        tracing::info!(campaign_id = %id, "campaign updated");
        Ok(record)
    }

    /// Delete a campaign.
    ///
    /// The record goes first so no new reads can resolve it, then the
    /// photo, then the sweep clearing products that still reference the
    /// campaign. A failure before the sweep aborts it, so valid
    /// references are never cleared for a delete that did not happen.
    /// Deleting an absent campaign is a no-op. The settings singleton is
    /// left untouched even when the deleted campaign held a facet (see
    /// DESIGN.md).
    pub async fn delete(
        tree: &dyn TreeStore,
        blobs: &dyn BlobStore,
        id: &str,
    ) -> Result<(), StoreError> {
        tree.remove(&paths::campaign(id)).await?;
        blobs.remove(&paths::campaign_photo(id)).await?;

        let members = ProductRepo::find_by_campaign(tree, id).await?;
        Self::clear_snapshots(tree, &members).await;

        tracing::info!(campaign_id = %id, swept = members.len(), "campaign deleted");
        Ok(())
    }

    /// Write the denormalized summary onto every member product,
    /// concurrently. Failures are logged per product and not surfaced;
    /// the operation result stays coarse.
    async fn write_snapshots(
        tree: &dyn TreeStore,
        members: &[EntityId],
        summary: &CampaignSummary,
    ) {
        let writes = members.iter().map(|product_id| async move {
            let mut partial = Map::new();
            partial.insert("campaign".into(), serde_json::to_value(summary)?);
            tree.update(&paths::product(product_id), partial).await
        });
        for (product_id, result) in members.iter().zip(join_all(writes).await) {
            if let Err(err) = result {
                tracing::warn!(product_id = %product_id, error = %err, "campaign snapshot write failed");
            }
        }
    }

    /// Clear the campaign snapshot on each given product, concurrently.
    /// Failures are logged per product and not surfaced.
    async fn clear_snapshots(tree: &dyn TreeStore, members: &[EntityId]) {
        let writes = members.iter().map(|product_id| async move {
            let mut partial = Map::new();
            partial.insert("campaign".into(), Value::Null);
            tree.update(&paths::product(product_id), partial).await
        });
        for (product_id, result) in members.iter().zip(join_all(writes).await) {
            if let Err(err) = result {
                tracing::warn!(product_id = %product_id, error = %err, "campaign snapshot clear failed");
            }
        }
    }
}

fn opt_string(value: &Option<String>) -> Value {
    match value {
        Some(value) => Value::String(value.clone()),
        None => Value::Null,
    }
}
