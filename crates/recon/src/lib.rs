//! `multibrand-recon` — Catalog/sales reconciliation and multi-brand metrics.
//!
//! Pure engine crate: receives already-decoded tables, returns enriched rows,
//! per-customer and per-sector metrics, an audit of anomalous matches and a
//! list of data-quality warnings. No CLI or file I/O dependencies.

pub mod aggregate;
pub mod audit;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod index;
pub mod load;
pub mod model;
pub mod normalize;
pub mod report;
pub mod resolve;
pub mod table;

pub use catalog::{CatalogSnapshot, CatalogStore};
pub use config::EngineConfig;
pub use engine::{run, run_with_catalog};
pub use error::ReconError;
pub use index::MatchIndex;
pub use model::{CustomerId, MatchReason, NormalizedCode, ReconResult, TableKind, Warning};
pub use report::MetricFilter;
pub use table::Table;
