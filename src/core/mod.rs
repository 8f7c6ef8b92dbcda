//! Core business logic abstractions

pub mod item;
pub mod preview;
pub mod store;
pub mod valuation;

// Re-export main types for cleaner imports
pub use item::{Item, derive_name_from_url};
pub use preview::PreviewResolver;
pub use store::ItemStore;
pub use valuation::{ValuationError, future_value};
