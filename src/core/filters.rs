use crate::core::error::QueryError;
use crate::models::{normalize, EnrichedMarket, Market};

/// Optional search predicates, combined with logical AND
///
/// Text fields are stored pre-normalized; an empty value is no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketFilter {
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub name: Option<String>,
    pub radius: Option<f64>,
}

impl MarketFilter {
    /// Build a filter from raw user input, normalizing the text predicates
    pub fn new(city: Option<&str>, state: Option<&str>, zip: Option<&str>, name: Option<&str>) -> Self {
        Self {
            city: city.map(normalize).filter(|s| !s.is_empty()),
            state: state.map(normalize).filter(|s| !s.is_empty()),
            zip: zip.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
            name: name.map(normalize).filter(|s| !s.is_empty()),
            radius: None,
        }
    }

    pub fn with_radius(mut self, radius: Option<f64>) -> Self {
        self.radius = radius;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
            && self.name.is_none()
            && self.radius.is_none()
    }
}

/// Check the text predicates: exact city/state/zip, substring name
#[inline]
pub fn matches_fields(market: &Market, filter: &MarketFilter) -> bool {
    if let Some(city) = &filter.city {
        if &market.city_norm != city {
            return false;
        }
    }

    if let Some(state) = &filter.state {
        if &market.state_norm != state {
            return false;
        }
    }

    // ZIP codes are compared as-is
    if let Some(zip) = &filter.zip {
        if &market.zip != zip {
            return false;
        }
    }

    if let Some(name) = &filter.name {
        if !market.name_norm.contains(name.as_str()) {
            return false;
        }
    }

    true
}

/// Check the radius predicate against an enriched market
///
/// Markets without a distance (no coordinates) never fall inside a radius.
#[inline]
pub fn within_radius(item: &EnrichedMarket<'_>, radius: f64) -> bool {
    matches!(item.distance, Some(distance) if distance <= radius)
}

/// Parse a radius in kilometers; must be a finite, non-negative number
pub fn parse_radius(raw: Option<&str>) -> Result<Option<f64>, QueryError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.trim().parse::<f64>() {
        Ok(radius) if radius.is_finite() && radius >= 0.0 => Ok(Some(radius)),
        _ => Err(QueryError::Validation(
            "radius должен быть неотрицательным числом.".to_string(),
        )),
    }
}
