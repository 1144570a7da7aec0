use std::collections::HashMap;

use validator::Validate;

use crate::core::{parse_radius, MarketFilter, MarketQuery, PageRequest, QueryError, SortKey, SortOrder};
use crate::models::Center;

/// `key=value` arguments of one console command; keys are lowercased
pub type CommandArgs = HashMap<String, String>;

fn arg<'a>(args: &'a CommandArgs, key: &str) -> Option<&'a str> {
    args.get(key).map(String::as_str)
}

fn required_text(args: &CommandArgs, key: &str) -> String {
    arg(args, key).map(str::trim).unwrap_or_default().to_string()
}

/// Parse an optional integer argument; present but malformed is an error
fn parse_int(args: &CommandArgs, key: &str, message: &str) -> Result<Option<i64>, QueryError> {
    arg(args, key)
        .map(|raw| raw.trim().parse::<i64>())
        .transpose()
        .map_err(|_| QueryError::Validation(message.to_string()))
}

/// Parse a `lat,lon` pair
///
/// An absent or empty value means no center. Anything else must be two
/// finite numbers within the valid latitude/longitude ranges.
pub fn parse_center(raw: Option<&str>) -> Result<Option<Center>, QueryError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    let invalid = || QueryError::Validation("center должен быть в формате lat,lon (например, 41.88,-87.63).".to_string());

    let (lat, lon) = raw.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(invalid());
    }

    Ok(Some(Center { lat, lon }))
}

/// Build the query for `list`: whole catalog, no filters
pub fn parse_list_query(args: &CommandArgs, default_page_size: usize) -> Result<MarketQuery, QueryError> {
    let query = MarketQuery {
        filter: MarketFilter::default(),
        center: parse_center(arg(args, "center"))?,
        sort_by: SortKey::parse(arg(args, "sort")),
        order: SortOrder::parse(arg(args, "order")),
        page: PageRequest::parse(arg(args, "page"), arg(args, "size"), default_page_size),
    };

    query.validate()?;
    Ok(query)
}

/// Build the query for `search`
pub fn parse_search_query(args: &CommandArgs, default_page_size: usize) -> Result<MarketQuery, QueryError> {
    let center = parse_center(arg(args, "center"))?;
    let radius = parse_radius(arg(args, "radius"))?;

    let filter = MarketFilter::new(
        arg(args, "city"),
        arg(args, "state"),
        arg(args, "zip"),
        arg(args, "name"),
    )
    .with_radius(radius);

    let query = MarketQuery {
        filter,
        center,
        sort_by: SortKey::parse(arg(args, "sort")),
        order: SortOrder::parse(arg(args, "order")),
        page: PageRequest::parse(arg(args, "page"), arg(args, "size"), default_page_size),
    };

    query.validate()?;
    Ok(query)
}

/// `show id=...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowRequest {
    pub market_id: i64,
}

impl ShowRequest {
    pub fn from_args(args: &CommandArgs) -> Result<Self, QueryError> {
        let market_id = parse_int(args, "id", "id должен быть целым числом.")?
            .ok_or_else(|| QueryError::Validation("show требует id=...".to_string()))?;
        Ok(Self { market_id })
    }
}

/// `reviews market=...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewsRequest {
    pub market_id: i64,
}

impl ReviewsRequest {
    pub fn from_args(args: &CommandArgs) -> Result<Self, QueryError> {
        let market_id = parse_int(args, "market", "market должен быть целым числом.")?
            .ok_or_else(|| QueryError::Validation("reviews требует market=...".to_string()))?;
        Ok(Self { market_id })
    }
}

/// `review_add market=... rating=... [text=...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewAddRequest {
    pub market_id: i64,
    pub rating: i64,
    pub text: String,
}

impl ReviewAddRequest {
    pub fn from_args(args: &CommandArgs) -> Result<Self, QueryError> {
        let market_id = parse_int(args, "market", "market должен быть целым числом.")?;
        let rating = parse_int(args, "rating", "rating должен быть целым числом от 1 до 5.")?;

        match (market_id, rating) {
            (Some(market_id), Some(rating)) => Ok(Self {
                market_id,
                rating,
                text: required_text(args, "text"),
            }),
            _ => Err(QueryError::Validation("review_add требует market=... rating=1..5".to_string())),
        }
    }
}

/// `review_delete id=...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewDeleteRequest {
    pub review_id: i64,
}

impl ReviewDeleteRequest {
    pub fn from_args(args: &CommandArgs) -> Result<Self, QueryError> {
        let review_id = parse_int(args, "id", "id должен быть целым числом.")?
            .ok_or_else(|| QueryError::Validation("review_delete требует id=...".to_string()))?;
        Ok(Self { review_id })
    }
}

/// `register email=... login=... password=... [first=...] [last=...]`
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    pub login: String,
    pub password: String,
    pub first: String,
    pub last: String,
}

impl RegisterRequest {
    pub fn from_args(args: &CommandArgs) -> Result<Self, QueryError> {
        let request = Self {
            email: required_text(args, "email"),
            login: required_text(args, "login"),
            // Passwords are taken verbatim
            password: arg(args, "password").unwrap_or_default().to_string(),
            first: required_text(args, "first"),
            last: required_text(args, "last"),
        };

        if request.email.is_empty() || request.login.is_empty() || request.password.is_empty() {
            return Err(QueryError::Validation(
                "register требует email=... login=... password=...".to_string(),
            ));
        }

        Ok(request)
    }
}

/// `login login=... password=...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_args(args: &CommandArgs) -> Result<Self, QueryError> {
        let login = required_text(args, "login");
        let password = arg(args, "password").unwrap_or_default().to_string();

        if login.is_empty() || password.is_empty() {
            return Err(QueryError::Validation("login требует login=... password=...".to_string()));
        }

        Ok(Self { login, password })
    }
}
