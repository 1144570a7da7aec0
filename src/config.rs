use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::DEFAULT_PAGE_SIZE;
use crate::services::accounts::{HashCost, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM, DEFAULT_TIME_COST};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub query: QuerySettings,
    pub accounts: AccountSettings,
    pub logging: LoggingSettings,
}

/// Locations of the data files
#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_markets_csv")]
    pub markets_csv: PathBuf,
    #[serde(default = "default_users_json")]
    pub users_json: PathBuf,
    #[serde(default = "default_reviews_json")]
    pub reviews_json: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            markets_csv: default_markets_csv(),
            users_json: default_users_json(),
            reviews_json: default_reviews_json(),
        }
    }
}

fn default_markets_csv() -> PathBuf { PathBuf::from("farmers_markets.csv") }
fn default_users_json() -> PathBuf { PathBuf::from("users.json") }
fn default_reviews_json() -> PathBuf { PathBuf::from("reviews.json") }

#[derive(Debug, Clone, Deserialize)]
pub struct QuerySettings {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize { DEFAULT_PAGE_SIZE }

/// Argon2id cost of newly hashed passwords
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSettings {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_time_cost")]
    pub time_cost: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            time_cost: default_time_cost(),
            parallelism: default_parallelism(),
        }
    }
}

impl AccountSettings {
    pub fn hash_cost(&self) -> HashCost {
        HashCost::new(self.memory_kib, self.time_cost, self.parallelism)
    }
}

fn default_memory_kib() -> u32 { DEFAULT_MEMORY_KIB }
fn default_time_cost() -> u32 { DEFAULT_TIME_COST }
fn default_parallelism() -> u32 { DEFAULT_PARALLELISM }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "warn".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MARKETS)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MARKETS__DATA__REVIEWS_JSON -> data.reviews_json
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("MARKETS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.data.markets_csv, PathBuf::from("farmers_markets.csv"));
        assert_eq!(settings.data.reviews_json, PathBuf::from("reviews.json"));
        assert_eq!(settings.query.default_page_size, 10);
        assert_eq!(settings.accounts.hash_cost(), HashCost::new(65_536, 3, 4));
    }

    #[test]
    fn test_default_logging() {
        assert_eq!(default_log_level(), "warn");
        assert_eq!(default_log_format(), "compact");
    }

    #[test]
    fn test_load_from_file_fills_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "[query]\ndefault_page_size = 25\n\n[data]\nusers_json = \"data/users.json\"\n\n[accounts]\ntime_cost = 2\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.query.default_page_size, 25);
        assert_eq!(settings.data.users_json, PathBuf::from("data/users.json"));
        assert_eq!(settings.data.markets_csv, PathBuf::from("farmers_markets.csv"));
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.accounts.hash_cost(), HashCost::new(65_536, 2, 4));
    }
}
