use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Normalize free text for comparison: trim, collapse inner whitespace, lowercase.
///
/// Plain Unicode lowercasing, not full case folding: `Straße` stays `straße`
/// and does not match `strasse`.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Farmers market record, immutable once the catalog is loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub id: u64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub name_norm: String,
    pub city_norm: String,
    pub state_norm: String,
}

impl Market {
    pub fn new(
        id: u64,
        name: &str,
        city: &str,
        state: &str,
        zip: &str,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Self {
        Self {
            id,
            name: name.trim().to_string(),
            city: city.trim().to_string(),
            state: state.trim().to_string(),
            zip: zip.trim().to_string(),
            lat,
            lon,
            name_norm: normalize(name),
            city_norm: normalize(city),
            state_norm: normalize(state),
        }
    }

    /// Both coordinates, when the source row had them
    pub fn coordinates(&self) -> Option<Center> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Center { lat, lon }),
            _ => None,
        }
    }
}

/// Reference point for distance calculations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

/// User-authored market review as stored in `reviews.json`
///
/// `market_id` and `rating` are read leniently: integer-like strings are
/// accepted and anything else becomes `None`, which the rating aggregator
/// counts as skipped instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient_int")]
    pub market_id: Option<u64>,
    pub user_id: u64,
    #[serde(default)]
    pub login: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub rating: Option<i64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: String,
}

/// Registered account as stored in `users.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub login: String,
    pub password_hash: String,
    #[serde(default)]
    pub first: String,
    #[serde(default)]
    pub last: String,
    #[serde(default)]
    pub created_at: String,
}

/// The authenticated user of the current console session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: u64,
    pub login: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            login: user.login.clone(),
        }
    }
}

/// Per-market rating summary
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingStats {
    pub count: usize,
    pub avg: Option<f64>,
}

/// Market annotated with its live rating and optional distance from a center
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedMarket<'a> {
    pub market: &'a Market,
    pub rating_count: usize,
    pub rating_avg: Option<f64>,
    pub distance: Option<f64>,
}

/// Coerce a JSON scalar into an integer: numbers (truncated), numeric strings, booleans.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn lenient_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_int(&value).and_then(|n| T::try_from(n).ok()))
}
