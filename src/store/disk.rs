use crate::core::item::Item;
use crate::core::store::ItemStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use tracing::debug;

const ITEMS_PARTITION: &str = "items";
// Separates userId from itemId in composite keys; also terminates the
// partition prefix so "user1" never matches "user12".
const KEY_SEPARATOR: u8 = 0;

/// Persistent store implementation backed by a fjall keyspace partition.
///
/// Records are stored under `userId \0 itemId` composite keys with JSON
/// values, so a user's collection is a single prefix scan.
pub struct FjallItemStore {
    _keyspace: Keyspace,
    items: PartitionHandle,
}

impl FjallItemStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let keyspace = fjall::Config::new(data_dir)
            .open()
            .with_context(|| format!("Failed to open keyspace at {}", data_dir.display()))?;
        let items = keyspace
            .open_partition(ITEMS_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open items partition")?;

        Ok(Self {
            _keyspace: keyspace,
            items,
        })
    }

    fn key(user_id: &str, item_id: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(user_id.len() + item_id.len() + 1);
        key.extend_from_slice(user_id.as_bytes());
        key.push(KEY_SEPARATOR);
        key.extend_from_slice(item_id.as_bytes());
        key
    }

    fn prefix(user_id: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(user_id.len() + 1);
        prefix.extend_from_slice(user_id.as_bytes());
        prefix.push(KEY_SEPARATOR);
        prefix
    }
}

#[async_trait]
impl ItemStore for FjallItemStore {
    async fn put(&self, item: &Item) -> Result<()> {
        let key = Self::key(&item.user_id, &item.item_id);
        let value = serde_json::to_vec(item).context("Failed to serialize item")?;
        debug!(user_id = %item.user_id, item_id = %item.item_id, "Store PUT");
        self.items.insert(key, value).context("Store write failed")?;
        Ok(())
    }

    async fn get(&self, user_id: &str, item_id: &str) -> Result<Option<Item>> {
        let value = self
            .items
            .get(Self::key(user_id, item_id))
            .context("Store read failed")?;
        match value {
            Some(bytes) => {
                let item = serde_json::from_slice(&bytes).context("Failed to deserialize item")?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, user_id: &str, item_id: &str) -> Result<bool> {
        let key = Self::key(user_id, item_id);
        let existed = self
            .items
            .contains_key(&key)
            .context("Store read failed")?;
        if existed {
            self.items.remove(key).context("Store delete failed")?;
        }
        debug!(user_id, item_id, existed, "Store DELETE");
        Ok(existed)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        for entry in self.items.prefix(Self::prefix(user_id)) {
            let (_key, value) = entry.context("Store scan failed")?;
            let item: Item =
                serde_json::from_slice(&value).context("Failed to deserialize item")?;
            items.push(item);
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }
}
