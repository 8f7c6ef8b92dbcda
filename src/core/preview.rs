//! Preview image resolution abstraction

use async_trait::async_trait;

/// Resolves a representative preview image for a product URL.
///
/// Preview images are cosmetic: implementations must never fail loudly.
/// Every failure path (malformed URL, network error, timeout, missing
/// metadata) degrades to `None`.
#[async_trait]
pub trait PreviewResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Option<String>;
}
