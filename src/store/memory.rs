use crate::core::item::Item;
use crate::core::store::ItemStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory store implementation using HashMap, for tests and local dev
#[derive(Default)]
pub struct MemoryItemStore {
    // userId -> (itemId -> item)
    inner: Mutex<HashMap<String, HashMap<String, Item>>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn put(&self, item: &Item) -> Result<()> {
        let mut store = self.inner.lock().await;
        debug!(user_id = %item.user_id, item_id = %item.item_id, "Store PUT");
        store
            .entry(item.user_id.clone())
            .or_default()
            .insert(item.item_id.clone(), item.clone());
        Ok(())
    }

    async fn get(&self, user_id: &str, item_id: &str) -> Result<Option<Item>> {
        let store = self.inner.lock().await;
        Ok(store
            .get(user_id)
            .and_then(|items| items.get(item_id))
            .cloned())
    }

    async fn delete(&self, user_id: &str, item_id: &str) -> Result<bool> {
        let mut store = self.inner.lock().await;
        let removed = store
            .get_mut(user_id)
            .and_then(|items| items.remove(item_id))
            .is_some();
        debug!(user_id, item_id, removed, "Store DELETE");
        Ok(removed)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Item>> {
        let store = self.inner.lock().await;
        let mut items: Vec<Item> = store
            .get(user_id)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }
}
