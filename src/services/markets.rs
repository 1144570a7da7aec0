use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::models::Market;
use crate::services::storage::StorageError;

/// One row of the farmers markets CSV export
#[derive(Debug, Deserialize)]
struct MarketRow {
    #[serde(rename = "FMID")]
    fmid: String,
    #[serde(rename = "MarketName")]
    market_name: String,
    city: String,
    #[serde(rename = "State")]
    state: String,
    zip: String,
    #[serde(default)]
    x: Option<String>,
    #[serde(default)]
    y: Option<String>,
}

impl MarketRow {
    fn into_market(self) -> Option<Market> {
        let id = self.fmid.trim().parse::<u64>().ok()?;

        Some(Market::new(
            id,
            &self.market_name,
            &self.city,
            &self.state,
            &self.zip,
            parse_coordinate(self.y.as_deref()),
            parse_coordinate(self.x.as_deref()),
        ))
    }
}

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read-only market catalog: load order plus an id index
#[derive(Debug, Clone, Default)]
pub struct MarketCatalog {
    markets: Vec<Market>,
    by_id: HashMap<u64, usize>,
    skipped: usize,
}

impl MarketCatalog {
    /// Build a catalog; a repeated id replaces the earlier market in place
    pub fn from_markets(markets: impl IntoIterator<Item = Market>) -> Self {
        let mut catalog = Self::default();
        for market in markets {
            catalog.insert(market);
        }
        catalog
    }

    fn insert(&mut self, market: Market) {
        match self.by_id.get(&market.id) {
            Some(&index) => self.markets[index] = market,
            None => {
                self.by_id.insert(market.id, self.markets.len());
                self.markets.push(market);
            }
        }
    }

    /// Parse CSV data with a header row, skipping rows that cannot be read
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let mut catalog = Self::default();

        // Fail early when the header itself is unreadable
        csv_reader.headers()?;

        for row in csv_reader.deserialize::<MarketRow>() {
            match row.ok().and_then(MarketRow::into_market) {
                Some(market) => catalog.insert(market),
                None => catalog.skipped += 1,
            }
        }

        Ok(catalog)
    }

    /// Load the catalog from a CSV file
    pub fn load_csv(path: &Path) -> Result<Self, StorageError> {
        let file = std::fs::File::open(path).map_err(|e| StorageError::io(path, e))?;
        let catalog = Self::from_reader(file).map_err(|source| StorageError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        if catalog.skipped > 0 {
            tracing::warn!("Skipped {} unreadable CSV rows in {}", catalog.skipped, path.display());
        }
        tracing::info!("Loaded {} markets from {}", catalog.len(), path.display());

        Ok(catalog)
    }

    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    /// Look up a market by id; negative ids never match
    pub fn get(&self, id: i64) -> Option<&Market> {
        let id = u64::try_from(id).ok()?;
        self.by_id.get(&id).map(|&index| &self.markets[index])
    }

    pub fn contains(&self, id: i64) -> bool {
        self.get(id).is_some()
    }

    /// Number of CSV rows that were skipped while loading
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}
