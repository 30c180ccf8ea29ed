//! Input catalog loading.

use std::path::Path;

use tracing::{debug, instrument};

use tomoscrape_shared::{CatalogEntry, Result, TomoError};

/// Read the catalog JSON array, keeping at most `limit` entries.
///
/// Unreadable or malformed catalogs are fatal: the batch cannot start.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_catalog(path: &Path, limit: Option<usize>) -> Result<Vec<CatalogEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TomoError::catalog(format!("failed to read {}: {e}", path.display()))
    })?;

    let mut entries: Vec<CatalogEntry> = serde_json::from_str(&content).map_err(|e| {
        TomoError::catalog(format!("failed to parse {}: {e}", path.display()))
    })?;

    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    debug!(count = entries.len(), "catalog loaded");
    Ok(entries)
}
