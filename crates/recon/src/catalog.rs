//! Shared, immutable catalog snapshots.
//!
//! A snapshot is built once from a catalog table and then only read. Reloading
//! the catalog builds a new snapshot and swaps it in; runs holding the old one
//! finish against it.

use std::sync::{Arc, RwLock};

use crate::config::EngineConfig;
use crate::error::ReconError;
use crate::index::MatchIndex;
use crate::load::load_catalog;
use crate::model::{CatalogEntry, Warning};
use crate::table::Table;

#[derive(Debug)]
pub struct CatalogSnapshot {
    pub entries: Vec<CatalogEntry>,
    pub index: MatchIndex,
    /// Warnings raised while loading the catalog.
    pub warnings: Vec<Warning>,
}

impl CatalogSnapshot {
    pub fn load(table: &Table, config: &EngineConfig) -> Result<Arc<Self>, ReconError> {
        let (entries, warnings) = load_catalog(table, config)?;
        Ok(Arc::new(Self::from_entries(entries, warnings)))
    }

    pub fn from_entries(entries: Vec<CatalogEntry>, warnings: Vec<Warning>) -> Self {
        let index = MatchIndex::build(&entries);
        log::info!(
            "catalog: {} entr(ies), {} index key(s) ({} alias)",
            entries.len(),
            index.len(),
            index.alias_len()
        );
        Self { entries, index, warnings }
    }
}

/// Holder of the current catalog snapshot.
#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogStore {
    pub fn new(snapshot: Arc<CatalogSnapshot>) -> Self {
        Self { current: RwLock::new(snapshot) }
    }

    /// The snapshot in effect now.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the current snapshot, returning the previous one.
    pub fn swap(&self, next: Arc<CatalogSnapshot>) -> Arc<CatalogSnapshot> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }

    /// Load a catalog table and swap it in.
    pub fn reload(&self, table: &Table, config: &EngineConfig) -> Result<Arc<CatalogSnapshot>, ReconError> {
        let next = CatalogSnapshot::load(table, config)?;
        Ok(self.swap(next))
    }
}
