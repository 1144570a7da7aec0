use crate::models::EnrichedMarket;

const SEPARATOR: &str = " | ";
const ELLIPSIS: char = '…';

pub const NOTHING_FOUND: &str = "Ничего не найдено.";
pub const NO_RATING: &str = "нет";
pub const NO_DISTANCE: &str = "-";
pub const DISTANCE_UNIT: &str = "км";

/// Table columns: header and fixed width in characters
const COLUMNS: [(&str, usize); 7] = [
    ("ID", 8),
    ("NAME", 50),
    ("CITY", 20),
    ("STATE", 16),
    ("ZIP", 8),
    ("RATING", 10),
    ("DIST", 10),
];

/// Pad or truncate `text` to exactly `width` characters
///
/// Truncated text ends with an ellipsis, except in columns of width 0 or 1.
pub fn format_cell(text: &str, width: usize) -> String {
    let len = text.chars().count();

    if len <= width {
        return format!("{text:<width$}");
    }
    if width <= 1 {
        return text.chars().take(width).collect();
    }

    let mut cell: String = text.chars().take(width - 1).collect();
    cell.push(ELLIPSIS);
    cell
}

/// Render a float the way it is shown to users: `4.0`, `4.25`, `12.5`
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

pub fn rating_text(avg: Option<f64>, count: usize) -> String {
    match avg {
        Some(avg) => format!("{} ({})", format_decimal(avg), count),
        None => NO_RATING.to_string(),
    }
}

pub fn distance_text(distance: Option<f64>) -> String {
    match distance {
        Some(distance) => format!("{} {}", format_decimal(distance), DISTANCE_UNIT),
        None => NO_DISTANCE.to_string(),
    }
}

fn render_row(cells: [String; 7]) -> String {
    cells
        .iter()
        .zip(COLUMNS)
        .map(|(cell, (_, width))| format_cell(cell, width))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Render a page of markets as a fixed-width table
pub fn render_markets(items: &[EnrichedMarket<'_>]) -> String {
    if items.is_empty() {
        return NOTHING_FOUND.to_string();
    }

    let header = render_row(COLUMNS.map(|(title, _)| title.to_string()));
    let rule = "-".repeat(header.chars().count());

    let mut lines = vec![header, rule];
    lines.extend(items.iter().map(|item| {
        let market = item.market;
        render_row([
            market.id.to_string(),
            market.name.clone(),
            market.city.clone(),
            market.state.clone(),
            market.zip.clone(),
            rating_text(item.rating_avg, item.rating_count),
            distance_text(item.distance),
        ])
    }));

    lines.join("\n")
}
