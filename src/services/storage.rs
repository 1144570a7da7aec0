use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{coerce_int, Loaded};

/// Errors that can occur while reading or writing data files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} должен содержать JSON-массив.", .0.display())]
    NotAList(PathBuf),
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Load a JSON array of records
///
/// A missing file is created holding an empty array. Elements that do not
/// deserialize into `T` are kept verbatim in `Loaded::unreadable` so that a
/// later rewrite can put them back.
pub fn load_json_list<T: DeserializeOwned>(path: &Path) -> Result<Loaded<T>, StorageError> {
    if !path.exists() {
        tracing::info!("{} not found, creating an empty list", path.display());
        save_json_list::<Value>(path, &[], &[])?;
        return Ok(Loaded::default());
    }

    let raw = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    let data: Value = serde_json::from_str(&raw).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Array(elements) = data else {
        return Err(StorageError::NotAList(path.to_path_buf()));
    };

    let mut loaded = Loaded::default();
    for element in elements {
        match T::deserialize(&element) {
            Ok(item) => loaded.items.push(item),
            Err(e) => {
                tracing::debug!("Keeping unreadable record in {}: {}", path.display(), e);
                loaded.unreadable.push(element);
            }
        }
    }

    if loaded.skipped() > 0 {
        tracing::warn!("{} unreadable records in {} are kept as is", loaded.skipped(), path.display());
    }

    Ok(loaded)
}

#[derive(Serialize)]
#[serde(untagged)]
enum Record<'a, T> {
    Item(&'a T),
    Preserved(&'a Value),
}

/// Overwrite `path` with `items` followed by `preserved`, as a pretty-printed JSON array
pub fn save_json_list<T: Serialize>(path: &Path, items: &[T], preserved: &[Value]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let records: Vec<Record<'_, T>> = items
        .iter()
        .map(Record::Item)
        .chain(preserved.iter().map(Record::Preserved))
        .collect();

    let mut json = serde_json::to_string_pretty(&records).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');

    fs::write(path, json).map_err(|e| StorageError::io(path, e))
}

/// Integer `id` of a raw record, if it has a usable one
pub fn record_id(record: &Value) -> Option<u64> {
    let id = record.get("id")?;
    id.as_u64().or_else(|| coerce_int(id).and_then(|n| u64::try_from(n).ok()))
}

/// Next free id after every id in `ids`; `None` once `u64::MAX` is taken
pub fn next_id(ids: impl Iterator<Item = u64>) -> Option<u64> {
    match ids.max() {
        Some(max) => max.checked_add(1),
        None => Some(0),
    }
}

/// Current UTC time as ISO 8601 with second precision and a `Z` suffix
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
