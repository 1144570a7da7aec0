// Core query engine exports
pub mod distance;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod filters;
pub mod pagination;
pub mod rating;
pub mod sorting;

pub use distance::{distance_km, distance_between, round2};
pub use engine::{MarketQuery, QueryEngine};
pub use enrich::enrich;
pub use error::QueryError;
pub use filters::{matches_fields, parse_radius, within_radius, MarketFilter};
pub use pagination::{paginate, Page, PageRequest, DEFAULT_PAGE_SIZE};
pub use rating::{aggregate, RatingIndex};
pub use sorting::{sort_markets, SortKey, SortOrder};
