//! Farmers Markets - interactive console for browsing farmers markets
//!
//! The core of the crate is the market query engine: filtering, distance
//! annotation, live rating aggregation, multi-key sorting and pagination.
//! Around it sit the CSV/JSON data services, user accounts, reviews and the
//! console command layer.

pub mod commands;
pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{aggregate, distance_km, enrich, MarketQuery, QueryEngine, QueryError, SortKey, SortOrder};
pub use models::{Center, EnrichedMarket, Market, Review};
