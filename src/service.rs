//! CRUD composition over the store, valuation, and preview resolution

use crate::config::ItemDefaults;
use crate::core::item::{Item, derive_name_from_url};
use crate::core::preview::PreviewResolver;
use crate::core::store::ItemStore;
use crate::core::valuation::{ValuationError, future_value};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Item not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<ValuationError> for ServiceError {
    fn from(err: ValuationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

/// Fields accepted when creating an item. Absent values fall back to the
/// configured [`ItemDefaults`].
#[derive(Debug, Default)]
pub struct NewItem {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub url: String,
    pub price: f64,
    pub sales_tax_rate: Option<f64>,
    pub target_years: Option<u32>,
    pub expected_return: Option<f64>,
}

/// Partial update; absent fields keep the stored values. An empty name or
/// url also keeps the stored value, matching the original API behavior.
#[derive(Debug, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub price: Option<f64>,
    pub target_years: Option<u32>,
    pub expected_return: Option<f64>,
}

pub struct ItemService {
    store: Arc<dyn ItemStore>,
    resolver: Arc<dyn PreviewResolver>,
    defaults: ItemDefaults,
}

impl ItemService {
    pub fn new(
        store: Arc<dyn ItemStore>,
        resolver: Arc<dyn PreviewResolver>,
        defaults: ItemDefaults,
    ) -> Self {
        Self {
            store,
            resolver,
            defaults,
        }
    }

    pub fn resolve_user(&self, user_id: Option<String>) -> String {
        user_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.defaults.user_id.clone())
    }

    pub async fn create(&self, new_item: NewItem) -> Result<Item, ServiceError> {
        if new_item.url.is_empty() {
            return Err(ServiceError::Validation("Missing required field: url".to_string()));
        }
        if Url::parse(&new_item.url).is_err() {
            return Err(ServiceError::Validation("Invalid url".to_string()));
        }

        let sales_tax_rate = new_item.sales_tax_rate.unwrap_or(self.defaults.sales_tax_rate);
        if !sales_tax_rate.is_finite() || sales_tax_rate < 0.0 {
            return Err(ServiceError::Validation(
                "salesTaxRate must be a non-negative percentage".to_string(),
            ));
        }

        let target_years = new_item.target_years.unwrap_or(self.defaults.target_years);
        let expected_return = new_item
            .expected_return
            .unwrap_or(self.defaults.expected_return);
        let fv = future_value(new_item.price, expected_return, target_years)?;

        let name = match new_item.name.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => derive_name_from_url(&new_item.url),
        };

        // Cosmetic enrichment: any resolution failure degrades to None.
        let image_url = self.resolver.resolve(&new_item.url).await;
        debug!(url = %new_item.url, found = image_url.is_some(), "Preview resolution finished");

        let item = Item {
            user_id: self.resolve_user(new_item.user_id),
            item_id: Uuid::new_v4().to_string(),
            name,
            url: new_item.url,
            image_url,
            price: new_item.price,
            sales_tax_rate,
            target_years,
            expected_return,
            fv,
            created_at: Utc::now(),
        };

        self.store.put(&item).await?;
        info!(user_id = %item.user_id, item_id = %item.item_id, "Created item");
        Ok(item)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Item>, ServiceError> {
        Ok(self.store.list_for_user(user_id).await?)
    }

    pub async fn update(
        &self,
        user_id: &str,
        item_id: &str,
        patch: ItemPatch,
    ) -> Result<Item, ServiceError> {
        let mut item = self
            .store
            .get(user_id, item_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if let Some(name) = patch.name.filter(|n| !n.is_empty()) {
            item.name = name;
        }
        if let Some(url) = patch.url.filter(|u| !u.is_empty()) {
            if Url::parse(&url).is_err() {
                return Err(ServiceError::Validation("Invalid url".to_string()));
            }
            item.url = url;
        }
        if let Some(price) = patch.price {
            item.price = price;
        }
        if let Some(target_years) = patch.target_years {
            item.target_years = target_years;
        }
        if let Some(expected_return) = patch.expected_return {
            item.expected_return = expected_return;
        }

        // imageUrl, salesTaxRate and createdAt are never touched on update.
        item.fv = future_value(item.price, item.expected_return, item.target_years)?;

        self.store.put(&item).await?;
        info!(user_id, item_id, "Updated item");
        Ok(item)
    }

    pub async fn delete(&self, user_id: &str, item_id: &str) -> Result<(), ServiceError> {
        let existed = self.store.delete(user_id, item_id).await?;
        if !existed {
            return Err(ServiceError::NotFound);
        }
        info!(user_id, item_id, "Deleted item");
        Ok(())
    }
}
