use crate::commands::table::format_decimal;
use crate::commands::{AppState, CommandError};
use crate::core::QueryError;
use crate::models::{CommandArgs, Review, ReviewAddRequest, ReviewDeleteRequest, ReviewsRequest};

fn market_not_found() -> QueryError {
    QueryError::NotFound("Рынок не найден.".to_string())
}

/// Author shown for a review: its login snapshot, else the current user record
fn author(state: &AppState, review: &Review) -> String {
    if !review.login.is_empty() {
        return review.login.clone();
    }

    state
        .users
        .find_by_id(review.user_id)
        .map(|user| user.login.clone())
        .unwrap_or_else(|| format!("user_id={}", review.user_id))
}

/// `reviews`: all reviews of one market, newest first
pub fn list(state: &mut AppState, args: &CommandArgs) -> Result<String, CommandError> {
    let request = ReviewsRequest::from_args(args)?;
    let market = state.catalog.get(request.market_id).ok_or_else(market_not_found)?;
    let view = state.reviews.for_market(market);

    let mut lines = vec![format!("Отзывы для рынка: {} (ID: {})", market.name, market.id)];

    if view.reviews.is_empty() {
        lines.push("Отзывов пока нет.".to_string());
        return Ok(lines.join("\n"));
    }

    lines.push(match view.stats.avg {
        Some(avg) => format!("Средний рейтинг: {} ({} отзывов)", format_decimal(avg), view.stats.count),
        None => "Средний рейтинг: нет отзывов".to_string(),
    });

    for review in &view.reviews {
        let rating = review.rating.map_or_else(|| "-".to_string(), |r| r.to_string());
        let created_at = if review.created_at.is_empty() { "-" } else { review.created_at.as_str() };

        lines.push(String::new());
        lines.push(format!(
            "[{}] rating={} | author={} | created_at={}",
            review.id,
            rating,
            author(state, review),
            created_at
        ));

        let text = review.text.trim();
        if !text.is_empty() {
            lines.push(format!("  {text}"));
        }
    }

    Ok(lines.join("\n"))
}

/// `review_add`: requires a logged-in user
pub fn add(state: &mut AppState, args: &CommandArgs) -> Result<String, CommandError> {
    let user = state
        .session
        .clone()
        .ok_or(CommandError::Unauthenticated("добавления отзыва"))?;

    let request = ReviewAddRequest::from_args(args)?;
    let market_id = state.catalog.get(request.market_id).ok_or_else(market_not_found)?.id;

    let review = state.reviews.add(market_id, &user, request.rating, &request.text)?;
    Ok(format!("Отзыв успешно добавлен (ID: {}).", review.id))
}

/// `review_delete`: only the author may delete a review
pub fn delete(state: &mut AppState, args: &CommandArgs) -> Result<String, CommandError> {
    let user = state
        .session
        .clone()
        .ok_or(CommandError::Unauthenticated("удаления отзыва"))?;

    let request = ReviewDeleteRequest::from_args(args)?;
    state.reviews.delete(request.review_id, &user)?;

    Ok("Отзыв удалён.".to_string())
}
