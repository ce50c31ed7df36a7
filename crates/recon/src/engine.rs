use crate::aggregate::{aggregate_clients, aggregate_sectors, is_saturated};
use crate::audit::build_audit;
use crate::catalog::CatalogSnapshot;
use crate::config::EngineConfig;
use crate::enrich::enrich;
use crate::error::ReconError;
use crate::load::load_sales;
use crate::model::{
    ClientCycleMetric, OverallMetrics, ReconMeta, ReconResult, SectorCycleMetric, Warning, WarningKind,
};
use crate::report::overall_metrics;
use crate::table::Table;

/// Reconcile one sales table against a catalog table.
///
/// Fails only on validation (missing required columns); data-quality problems
/// come back as warnings in the result.
pub fn run(config: &EngineConfig, catalog: &Table, sales: &Table) -> Result<ReconResult, ReconError> {
    let snapshot = CatalogSnapshot::load(catalog, config)?;
    run_with_catalog(config, &snapshot, sales)
}

/// Reconcile one sales table against an already-built catalog snapshot.
///
/// The snapshot is only read, so any number of runs can share it.
pub fn run_with_catalog(
    config: &EngineConfig,
    catalog: &CatalogSnapshot,
    sales: &Table,
) -> Result<ReconResult, ReconError> {
    let (rows, sales_warnings) = load_sales(sales, config)?;
    let sale_rows = rows.iter().filter(|r| r.record_type == config.sale_type).count();

    let (enriched, match_warnings) = enrich(&rows, &catalog.index, config);
    let (clients, client_warnings) = aggregate_clients(&enriched, config);
    let sectors = aggregate_sectors(&clients);
    let overall = overall_metrics(&clients);
    let audit = build_audit(&enriched);

    let mut warnings = catalog.warnings.clone();
    warnings.extend(sales_warnings);
    warnings.extend(match_warnings);
    warnings.extend(client_warnings);
    warnings.extend(overflow_warning(&clients, &sectors, &overall));

    log::info!(
        "run complete: {} sales row(s), {} client metric(s), {} sector metric(s), {} warning(s)",
        rows.len(),
        clients.len(),
        sectors.len(),
        warnings.len()
    );

    Ok(ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            catalog_entries: catalog.entries.len(),
            index_keys: catalog.index.len(),
            sales_rows: rows.len(),
            sale_rows,
        },
        warnings,
        overall,
        clients,
        sectors,
        audit,
        enriched,
    })
}

/// One high-severity warning when any quantity or amount total was clamped
/// at the `i64` bound.
fn overflow_warning(
    clients: &[ClientCycleMetric],
    sectors: &[SectorCycleMetric],
    overall: &OverallMetrics,
) -> Option<Warning> {
    let clamped = clients.iter().filter(|c| is_saturated(c.quantity) || is_saturated(c.amount_cents)).count()
        + sectors.iter().filter(|s| is_saturated(s.quantity) || is_saturated(s.amount_cents)).count()
        + usize::from(is_saturated(overall.quantity) || is_saturated(overall.amount_cents));
    if clamped == 0 {
        return None;
    }
    log::warn!("{clamped} total(s) clamped at the integer bound");
    Some(Warning::high(
        WarningKind::TotalOverflow,
        format!("{clamped} quantity/amount total(s) exceed the representable range and were clamped"),
    ))
}
