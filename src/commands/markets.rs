use crate::commands::table::{format_decimal, render_markets};
use crate::commands::{AppState, CommandError};
use crate::core::{aggregate, enrich, MarketQuery, Page, QueryEngine, QueryError};
use crate::models::{parse_list_query, parse_search_query, CommandArgs, EnrichedMarket, ShowRequest};

fn run<'a>(state: &'a AppState, query: &MarketQuery) -> Result<Page<EnrichedMarket<'a>>, QueryError> {
    QueryEngine::new(state.catalog.markets()).execute(state.reviews.reviews(), query)
}

/// `list`: the whole catalog, sorted and paginated
pub fn list(state: &mut AppState, args: &CommandArgs) -> Result<String, CommandError> {
    let query = parse_list_query(args, state.default_page_size)?;
    let page = run(state, &query)?;

    Ok(format!(
        "Всего рынков: {}. Страница {}, размер {}.\n{}",
        page.total,
        page.page,
        page.size,
        render_markets(&page.items)
    ))
}

/// `search`: filtered catalog, sorted and paginated
pub fn search(state: &mut AppState, args: &CommandArgs) -> Result<String, CommandError> {
    let query = parse_search_query(args, state.default_page_size)?;
    let page = run(state, &query)?;

    Ok(format!(
        "Найдено рынков: {}. Страница {}, размер {}.\n{}",
        page.total,
        page.page,
        page.size,
        render_markets(&page.items)
    ))
}

/// `show`: details of a single market
pub fn show(state: &mut AppState, args: &CommandArgs) -> Result<String, CommandError> {
    let request = ShowRequest::from_args(args)?;
    let market = state
        .catalog
        .get(request.market_id)
        .ok_or_else(|| QueryError::NotFound("Рынок не найден.".to_string()))?;

    let item = enrich(market, &aggregate(state.reviews.reviews()), None);
    let coordinate = |value: Option<f64>| value.map_or_else(|| "-".to_string(), format_decimal);
    let rating = match item.rating_avg {
        Some(avg) => format!("{} ({} отзывов)", format_decimal(avg), item.rating_count),
        None => "нет отзывов".to_string(),
    };

    Ok([
        format!("ID: {}", market.id),
        format!("Название: {}", market.name),
        format!("Город: {}", market.city),
        format!("Штат: {}", market.state),
        format!("ZIP: {}", market.zip),
        format!("Координаты: {}, {}", coordinate(market.lat), coordinate(market.lon)),
        format!("Рейтинг: {rating}"),
    ]
    .join("\n"))
}
