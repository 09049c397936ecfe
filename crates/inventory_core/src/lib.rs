//! Content-access core for the inventory tracker.
//! This crate is the single source of truth for product data invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod provider;
pub mod router;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::product::{Column, Product, ProductId, ProductValidationError, ProductValues};
pub use provider::cursor::ProductCursor;
pub use provider::observer::{ChangeObserver, ObserverRegistry};
pub use provider::{
    ProductProvider, Projection, ProviderError, ProviderResult, ResourceType, Selection, SortOrder,
};
pub use router::{ResourceMatch, ResourceRouter, ResourceUri, UriParseError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
