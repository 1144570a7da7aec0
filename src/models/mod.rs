// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{coerce_int, normalize, Center, EnrichedMarket, Market, RatingStats, Review, SessionUser, User};
pub use requests::{
    parse_center, parse_list_query, parse_search_query, CommandArgs, LoginRequest, RegisterRequest,
    ReviewAddRequest, ReviewDeleteRequest, ReviewsRequest, ShowRequest,
};
pub use responses::{Loaded, MarketReviews};
