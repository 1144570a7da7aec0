// Unit tests for the market query core

use farmers_markets::core::{
    aggregate, distance_km, enrich, paginate, sort_markets, MarketFilter, MarketQuery, PageRequest, QueryEngine,
    RatingIndex, SortKey, SortOrder,
};
use farmers_markets::models::{Center, EnrichedMarket, Market, RatingStats, Review};

fn create_test_review(id: u64, market_id: u64, rating: i64) -> Review {
    Review {
        id,
        market_id: Some(market_id),
        user_id: 1,
        login: "ivan".to_string(),
        rating: Some(rating),
        text: String::new(),
        created_at: "2024-05-01T10:00:00Z".to_string(),
    }
}

fn chicago_markets() -> Vec<Market> {
    vec![
        Market::new(1, "Oak St Market", "Chicago", "IL", "60601", Some(41.88), Some(-87.63)),
        Market::new(2, "Oak Park Market", "Chicago", "IL", "60302", Some(41.885), Some(-87.78)),
    ]
}

#[test]
fn test_distance_zero() {
    let distance = distance_km(41.88, -87.63, 41.88, -87.63);
    assert!(distance < 0.01);
}

#[test]
fn test_distance_oak_street_to_oak_park() {
    // Downtown Chicago to Oak Park is roughly 12-13 km
    let distance = distance_km(41.88, -87.63, 41.885, -87.78);
    assert!(distance > 12.0 && distance < 13.0, "got {}", distance);
}

#[test]
fn test_aggregate_example() {
    let index = aggregate(&[create_test_review(0, 1, 5), create_test_review(1, 1, 3)]);

    assert_eq!(index.get(1), RatingStats { count: 2, avg: Some(4.0) });
}

#[test]
fn test_count_zero_iff_avg_absent() {
    let markets = chicago_markets();
    let reviews = vec![create_test_review(0, 1, 4), create_test_review(1, 99, 2)];
    let index = aggregate(&reviews);

    for market in &markets {
        let item = enrich(market, &index, None);
        assert_eq!(item.rating_count == 0, item.rating_avg.is_none());
    }
}

#[test]
fn test_radius_search_example() {
    let markets = chicago_markets();
    let query = MarketQuery {
        filter: MarketFilter::default().with_radius(Some(5.0)),
        center: Some(Center { lat: 41.88, lon: -87.63 }),
        sort_by: SortKey::Distance,
        order: SortOrder::Asc,
        page: PageRequest::default(),
    };

    let page = QueryEngine::new(&markets).execute(&[], &query).unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].market.id, 1);
    assert!(page.items[0].distance.unwrap() < 0.01);
}

#[test]
fn test_radius_consistent_with_distance() {
    let markets: Vec<Market> = (0..40)
        .map(|i| {
            let coords = if i % 7 == 0 { None } else { Some(41.80 + i as f64 * 0.01) };
            Market::new(i, &format!("Market {}", i), "Chicago", "IL", "60601", coords, coords.map(|_| -87.63))
        })
        .collect();
    let center = Center { lat: 41.88, lon: -87.63 };
    let radius = 10.0;

    let query = MarketQuery {
        filter: MarketFilter::default().with_radius(Some(radius)),
        center: Some(center),
        page: PageRequest::new(1, 100),
        ..MarketQuery::default()
    };
    let page = QueryEngine::new(&markets).execute(&[], &query).unwrap();
    let kept: Vec<u64> = page.items.iter().map(|item| item.market.id).collect();

    for item in &page.items {
        assert!(item.distance.unwrap() <= radius);
    }

    let index = RatingIndex::default();
    for market in markets.iter().filter(|m| !kept.contains(&m.id)) {
        let item = enrich(market, &index, Some(center));
        assert!(item.distance.map_or(true, |d| d > radius));
    }
}

#[test]
fn test_rating_sort_example() {
    let markets = vec![
        Market::new(1, "Market", "A", "B", "1", None, None),
        Market::new(2, "Market", "A", "B", "1", None, None),
        Market::new(3, "Market", "A", "B", "1", None, None),
    ];
    let ratings = [None, Some(4.0), Some(2.0)];
    let mut items: Vec<EnrichedMarket> = markets
        .iter()
        .zip(ratings)
        .map(|(market, rating_avg)| EnrichedMarket {
            market,
            rating_count: usize::from(rating_avg.is_some()),
            rating_avg,
            distance: None,
        })
        .collect();

    sort_markets(&mut items, SortKey::Rating, SortOrder::Asc);

    let order: Vec<Option<f64>> = items.iter().map(|i| i.rating_avg).collect();
    assert_eq!(order, vec![Some(4.0), Some(2.0), None]);
}

#[test]
fn test_sorting_is_idempotent_for_every_key() {
    let markets: Vec<Market> = (0..12)
        .map(|i| {
            Market::new(
                11 - i,
                if i % 3 == 0 { "Same Name" } else { "Other" },
                if i % 2 == 0 { "Austin" } else { "Boston" },
                "TX",
                "1",
                (i % 4 != 0).then_some(30.0 + i as f64 * 0.1),
                (i % 4 != 0).then_some(-97.0),
            )
        })
        .collect();
    let reviews: Vec<Review> = (0..6).map(|i| create_test_review(i, i * 2, (i % 5 + 1) as i64)).collect();
    let index = aggregate(&reviews);
    let center = Some(Center { lat: 30.0, lon: -97.0 });

    for key in [SortKey::Name, SortKey::City, SortKey::State, SortKey::Rating, SortKey::Distance] {
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let mut items: Vec<EnrichedMarket> = markets.iter().map(|m| enrich(m, &index, center)).collect();
            let mut reversed: Vec<EnrichedMarket> = items.iter().rev().cloned().collect();

            sort_markets(&mut items, key, order);
            sort_markets(&mut reversed, key, order);
            assert_eq!(items, reversed, "{:?} {:?} depends on input order", key, order);

            let once = items.clone();
            sort_markets(&mut items, key, order);
            assert_eq!(items, once, "{:?} {:?} is not idempotent", key, order);
        }
    }
}

#[test]
fn test_pagination_properties() {
    let items: Vec<u32> = (0..37).collect();

    for size in 1..=12 {
        let mut collected = 0;
        let mut page = 1;
        loop {
            let chunk = paginate(items.clone(), PageRequest::new(page, size));
            assert_eq!(chunk.total, items.len());
            assert!(chunk.items.len() <= size);
            if chunk.items.is_empty() {
                break;
            }
            collected += chunk.items.len();
            page += 1;
        }
        assert_eq!(collected, items.len());
    }
}
