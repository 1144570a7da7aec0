use crate::core::{
    enrich::enrich,
    error::QueryError,
    filters::{matches_fields, within_radius, MarketFilter},
    pagination::{paginate, Page, PageRequest},
    rating::aggregate,
    sorting::{sort_markets, SortKey, SortOrder},
};
use crate::models::{Center, EnrichedMarket, Market, Review};

/// Fully typed market query, validated before it reaches the pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketQuery {
    pub filter: MarketFilter,
    pub center: Option<Center>,
    pub sort_by: SortKey,
    pub order: SortOrder,
    pub page: PageRequest,
}

impl MarketQuery {
    /// Reject parameter combinations that need a center but lack one
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.filter.radius.is_some() && self.center.is_none() {
            return Err(QueryError::Precondition(
                "radius работает только если задан center=lat,lon".to_string(),
            ));
        }

        if self.sort_by == SortKey::Distance && self.center.is_none() {
            return Err(QueryError::Precondition(
                "sort=distance требует center=lat,lon".to_string(),
            ));
        }

        Ok(())
    }
}

/// Query pipeline over a read-only market catalog
///
/// # Pipeline Stages
/// 1. Text predicates (city, state, zip, name)
/// 2. Enrichment with live ratings and distance from the center
/// 3. Radius predicate
/// 4. Sorting
/// 5. Pagination
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    markets: &'a [Market],
}

impl<'a> QueryEngine<'a> {
    pub fn new(markets: &'a [Market]) -> Self {
        Self { markets }
    }

    /// Run a query against the catalog
    ///
    /// Ratings are recomputed from `reviews` on every call.
    pub fn execute(&self, reviews: &[Review], query: &MarketQuery) -> Result<Page<EnrichedMarket<'a>>, QueryError> {
        query.validate()?;

        let ratings = aggregate(reviews);
        let filter = &query.filter;

        let mut items: Vec<EnrichedMarket<'a>> = self
            .markets
            .iter()
            // Stage 1: text predicates
            .filter(|market| matches_fields(market, filter))
            // Stage 2: enrichment
            .map(|market| enrich(market, &ratings, query.center))
            // Stage 3: radius
            .filter(|item| filter.radius.map_or(true, |radius| within_radius(item, radius)))
            .collect();

        // Stage 4
        sort_markets(&mut items, query.sort_by, query.order);

        tracing::debug!(
            "Query matched {} of {} markets (sort={}, order={:?})",
            items.len(),
            self.markets.len(),
            query.sort_by.as_str(),
            query.order
        );

        // Stage 5
        Ok(paginate(items, query.page))
    }
}
