//! Repository for `products/{id}` records.

use quitanda_core::campaign::CampaignSummary;
use quitanda_core::ids::new_entity_id;
use quitanda_core::types::EntityId;
use serde_json::{Map, Value};

use crate::blob::{BlobStore, PhotoUpload};
use crate::models::campaign::CampaignRecord;
use crate::models::product::{ProductInput, ProductListParams, ProductRecord};
use crate::models::Keyed;
use crate::paths;
use crate::repositories::now_iso;
use crate::tree::{order_entries, StoreError, TreeStore};

/// Default ordering key for product listings.
const DEFAULT_ORDER: &str = "updatedAt";

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Create a product.
    ///
    /// The photo is uploaded first and the record written with the
    /// resulting download URL, so a stored record always has a
    /// retrievable photo.
    pub async fn create(
        tree: &dyn TreeStore,
        blobs: &dyn BlobStore,
        input: &ProductInput,
        photo: &PhotoUpload,
    ) -> Result<Keyed<ProductRecord>, StoreError> {
        let id = new_entity_id();
        let url = blobs.put(&paths::product_photo(&id), photo).await?;
        let now = now_iso();
        let record = ProductRecord {
            name: input.name.clone(),
            name_lower_case: input.name.to_lowercase(),
            quantity: input.quantity,
            price: input.price,
            category: input.category.clone(),
            description: input.description.clone(),
            photo: url,
            created_at: now.clone(),
            updated_at: now,
            campaign: None,
        };
        tree.set(&paths::product(&id), serde_json::to_value(&record)?)
            .await?;

        tracing::info!(product_id = %id, name = %record.name, "product created");
        Ok(Keyed { id, record })
    }

    /// Find a product by its key.
    pub async fn find_by_id(
        tree: &dyn TreeStore,
        id: &str,
    ) -> Result<Option<ProductRecord>, StoreError> {
        match tree.get(&paths::product(id)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// List products with the storefront filters, newest first within the
    /// chosen ordering. Malformed records are skipped, not fatal.
    pub async fn list(
        tree: &dyn TreeStore,
        params: &ProductListParams,
    ) -> Result<Vec<Keyed<ProductRecord>>, StoreError> {
        let Some(value) = tree.get(paths::PRODUCTS).await? else {
            return Ok(Vec::new());
        };
        let Some(object) = value.as_object() else {
            return Ok(Vec::new());
        };

        let order_key = params.order_by.as_deref().unwrap_or(DEFAULT_ORDER);
        let mut entries = order_entries(object, Some(order_key));
        entries.reverse(); // newest first, like the admin tables

        let search = params.search.as_ref().map(|term| term.to_lowercase());
        let mut items = Vec::new();
        for (id, value) in entries {
            let record: ProductRecord = match serde_json::from_value(value) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(product_id = %id, error = %err, "skipping malformed product record");
                    continue;
                }
            };
            if let Some(category) = &params.category {
                if &record.category != category {
                    continue;
                }
            }
            if let Some(campaign_id) = &params.campaign {
                if record.campaign.as_ref().map(|c| &c.id) != Some(campaign_id) {
                    continue;
                }
            }
            if let Some(term) = &search {
                if !record.name_lower_case.starts_with(term.as_str()) {
                    continue;
                }
            }
            items.push(Keyed { id, record });
            if params.limit.is_some_and(|limit| items.len() >= limit) {
                break;
            }
        }
        Ok(items)
    }

    /// Ids of products currently carrying `campaign_id` as their
    /// denormalized campaign reference.
    pub async fn find_by_campaign(
        tree: &dyn TreeStore,
        campaign_id: &str,
    ) -> Result<Vec<EntityId>, StoreError> {
        let params = ProductListParams {
            campaign: Some(campaign_id.to_string()),
            ..Default::default()
        };
        let items = Self::list(tree, &params).await?;
        Ok(items.into_iter().map(|item| item.id).collect())
    }

    /// Edit a product.
    ///
    /// `previous` is the caller's last known record; the repository never
    /// re-reads it before writing. The photo is optionally replaced in
    /// place (the stored URL stays valid either way) and the denormalized
    /// campaign snapshot is not touched by product edits.
    pub async fn edit(
        tree: &dyn TreeStore,
        blobs: &dyn BlobStore,
        id: &str,
        input: &ProductInput,
        previous: Option<&ProductRecord>,
        photo: Option<&PhotoUpload>,
    ) -> Result<ProductRecord, StoreError> {
        let previous = previous.ok_or(StoreError::MissingTarget("product"))?;
        if id.is_empty() {
            return Err(StoreError::MissingTarget("product id"));
        }

        if let Some(photo) = photo {
            blobs.put(&paths::product_photo(id), photo).await?;
        }

        let record = ProductRecord {
            name: input.name.clone(),
            name_lower_case: input.name.to_lowercase(),
            quantity: input.quantity,
            price: input.price,
            category: input.category.clone(),
            description: input.description.clone(),
            photo: previous.photo.clone(),
            created_at: previous.created_at.clone(),
            updated_at: now_iso(),
            campaign: previous.campaign.clone(),
        };

        let mut partial = Map::new();
        partial.insert("name".into(), Value::String(record.name.clone()));
        partial.insert(
            "nameLowerCase".into(),
            Value::String(record.name_lower_case.clone()),
        );
        partial.insert("quantity".into(), Value::from(record.quantity));
        partial.insert("price".into(), Value::from(record.price));
        partial.insert("category".into(), Value::String(record.category.clone()));
        partial.insert(
            "description".into(),
            Value::String(record.description.clone()),
        );
        partial.insert("photo".into(), Value::String(record.photo.clone()));
        partial.insert("updatedAt".into(), Value::String(record.updated_at.clone()));
        tree.update(&paths::product(id), partial).await?;

        tracing::info!(product_id = %id, "product updated");
        Ok(record)
    }

    /// Delete a product and its photo, then drop its id from the owning
    /// campaign's member list.
    ///
    /// A record or photo removal failure aborts the membership rewrite; a
    /// campaign that no longer exists is silently left alone (dangling
    /// references are swept, never errors).
    pub async fn delete(
        tree: &dyn TreeStore,
        blobs: &dyn BlobStore,
        id: &str,
        campaign: Option<&CampaignSummary>,
    ) -> Result<(), StoreError> {
        tree.remove(&paths::product(id)).await?;
        blobs.remove(&paths::product_photo(id)).await?;

        let Some(campaign) = campaign else {
            tracing::info!(product_id = %id, "product deleted");
            return Ok(());
        };
        let Some(value) = tree.get(&paths::campaign(&campaign.id)).await? else {
            // campaign vanished since the product was loaded
            tracing::info!(product_id = %id, campaign_id = %campaign.id, "product deleted; campaign already gone");
            return Ok(());
        };

        let record: CampaignRecord = serde_json::from_value(value)?;
        let members: Vec<EntityId> = record
            .products
            .unwrap_or_default()
            .into_iter()
            .filter(|member| member != id)
            .collect();
        let mut partial = Map::new();
        partial.insert("products".into(), serde_json::to_value(&members)?);
        tree.update(&paths::campaign(&campaign.id), partial).await?;

        tracing::info!(product_id = %id, campaign_id = %campaign.id, "product deleted and membership pruned");
        Ok(())
    }
}
