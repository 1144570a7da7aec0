// Service exports
pub mod accounts;
pub mod markets;
pub mod reviews;
pub mod storage;

pub use accounts::{AccountError, UserStore};
pub use markets::MarketCatalog;
pub use reviews::{ReviewError, ReviewStore};
pub use storage::{load_json_list, next_id, now_iso, record_id, save_json_list, StorageError};
