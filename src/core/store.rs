//! Storage abstraction for wishlist items

use crate::core::item::Item;
use anyhow::Result;
use async_trait::async_trait;

/// A key-value store of items keyed by `(userId, itemId)`.
///
/// Writes are last-writer-wins per key; there is no cross-key transaction
/// and callers must not assume isolation beyond a single-key write.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Inserts or overwrites the record at `(item.user_id, item.item_id)`.
    async fn put(&self, item: &Item) -> Result<()>;

    async fn get(&self, user_id: &str, item_id: &str) -> Result<Option<Item>>;

    /// Removes the record; returns whether it existed.
    async fn delete(&self, user_id: &str, item_id: &str) -> Result<bool>;

    /// All records for a user, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Item>>;
}
