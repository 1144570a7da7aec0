use crate::core::distance::{distance_between, round2};
use crate::core::rating::RatingIndex;
use crate::models::{Center, EnrichedMarket, Market};

/// Attach rating aggregate and, when a center is given, the distance to it
///
/// Distance is only present when `center` is supplied and the market has
/// both coordinates. The market itself is never modified.
pub fn enrich<'a>(market: &'a Market, ratings: &RatingIndex, center: Option<Center>) -> EnrichedMarket<'a> {
    let stats = ratings.get(market.id);

    let distance = center
        .zip(market.coordinates())
        .map(|(from, to)| round2(distance_between(from, to)));

    EnrichedMarket {
        market,
        rating_count: stats.count,
        rating_avg: stats.avg,
        distance,
    }
}
