//! The wishlist item record and its display-name fallback

use chrono::{DateTime, Utc};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use url::Url;

const PAGE_EXTENSIONS: [&str; 5] = [".html", ".htm", ".php", ".asp", ".aspx"];
const MAX_DERIVED_NAME_LEN: usize = 50;

/// A single wishlist entry, keyed by `(userId, itemId)`.
///
/// `fv` is derived from `(price, expectedReturn, targetYears)` and is
/// recomputed on every write; it is never stored stale.
#[derive(Debug, Clone, Serialize, Deserialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct Item {
    pub user_id: String,
    pub item_id: String,
    pub name: String,
    pub url: String,
    /// Absolute preview image URL; absent when resolution failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[oai(skip_serializing_if_is_none)]
    pub image_url: Option<String>,
    /// Tax-inclusive price at time of entry.
    pub price: f64,
    /// Percentage (14 means 14%), stored for display only.
    pub sales_tax_rate: f64,
    pub target_years: u32,
    /// Fractional annual rate (0.07 means 7%).
    pub expected_return: f64,
    pub fv: f64,
    pub created_at: DateTime<Utc>,
}

/// Derives a display name from the last path segment of a product URL.
///
/// Falls back to `"Product"` when the URL is unparsable or has no path
/// segments.
pub fn derive_name_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return "Product".to_string();
    };

    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last());

    let Some(segment) = segment else {
        return "Product".to_string();
    };

    let mut name = segment.to_string();
    let lowered = name.to_lowercase();
    for ext in PAGE_EXTENSIONS {
        if lowered.ends_with(ext) {
            name.truncate(name.len() - ext.len());
            break;
        }
    }

    let name: String = name
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .take(MAX_DERIVED_NAME_LEN)
        .collect();

    let name = name.trim().to_string();
    if name.is_empty() {
        "Product".to_string()
    } else {
        name
    }
}
