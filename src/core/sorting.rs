use std::cmp::Ordering;

use crate::models::EnrichedMarket;

/// Field a result list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    City,
    State,
    Rating,
    Distance,
}

impl SortKey {
    /// Parse user input; anything unrecognized falls back to [`SortKey::Name`]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("city") => Self::City,
            Some("state") => Self::State,
            Some("rating") => Self::Rating,
            Some("distance") => Self::Distance,
            _ => Self::Name,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::City => "city",
            Self::State => "state",
            Self::Rating => "rating",
            Self::Distance => "distance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only `desc` selects descending order; everything else is ascending
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    #[inline]
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Sort enriched markets in place
///
/// Every key ends with the market id, so the order is total and does not
/// depend on input order. For `rating` and `distance` the items lacking a
/// value always go last; `order` only flips the rest of the key.
pub fn sort_markets(items: &mut [EnrichedMarket<'_>], key: SortKey, order: SortOrder) {
    items.sort_by(|a, b| compare(a, b, key, order));
}

/// Composite comparison used by [`sort_markets`]
pub fn compare(a: &EnrichedMarket<'_>, b: &EnrichedMarket<'_>, key: SortKey, order: SortOrder) -> Ordering {
    let (ma, mb) = (a.market, b.market);

    let by_name = || ma.name_norm.cmp(&mb.name_norm).then_with(|| ma.id.cmp(&mb.id));

    match key {
        SortKey::Name => order.apply(by_name()),
        SortKey::City => order.apply(ma.city_norm.cmp(&mb.city_norm).then_with(by_name)),
        SortKey::State => order.apply(
            ma.state_norm
                .cmp(&mb.state_norm)
                .then_with(|| ma.city_norm.cmp(&mb.city_norm))
                .then_with(by_name),
        ),
        // Ascending rating means best-rated first
        SortKey::Rating => presence(a.rating_avg, b.rating_avg).then_with(|| {
            order.apply(magnitude(b.rating_avg, a.rating_avg).then_with(by_name))
        }),
        SortKey::Distance => presence(a.distance, b.distance).then_with(|| {
            order.apply(magnitude(a.distance, b.distance).then_with(by_name))
        }),
    }
}

/// Items with a value sort before items without one
#[inline]
fn presence(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.is_none().cmp(&b.is_none())
}

#[inline]
fn magnitude(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => Ordering::Equal,
    }
}
