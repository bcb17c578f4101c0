//! Load cache - memoizes order-line loads per resolved input path set
//!
//! Source files are treated as immutable for the life of the process, so entries
//! are never invalidated.

use crate::error::{DashboardError, Result};
use crate::ingestion::source::OrderLineSource;
use crate::order_line::OrderLines;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

type CacheKey = (String, Vec<PathBuf>);

#[derive(Default)]
pub struct LoadCache {
    entries: Mutex<HashMap<CacheKey, Arc<OrderLines>>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached rows for this source, loading them on first use
    pub fn load(&self, source: &dyn OrderLineSource) -> Result<Arc<OrderLines>> {
        let key = Self::resolve_key(source)?;

        if let Some(hit) = self.entries().get(&key) {
            debug!("Load cache hit for {} {:?}", key.0, key.1);
            return Ok(Arc::clone(hit));
        }

        info!("Load cache miss for {}, reading source files", key.0);
        let lines = Arc::new(source.load()?);
        self.entries().insert(key, Arc::clone(&lines));
        Ok(lines)
    }

    /// Number of distinct loads held
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<OrderLines>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Canonical paths so "./data/x.csv" and "data/x.csv" share an entry
    fn resolve_key(source: &dyn OrderLineSource) -> Result<CacheKey> {
        let paths = source
            .inputs()
            .into_iter()
            .map(|path| {
                path.canonicalize().map_err(|e| {
                    DashboardError::Load(format!("Cannot resolve {}: {}", path.display(), e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((source.source_type().to_string(), paths))
    }
}
