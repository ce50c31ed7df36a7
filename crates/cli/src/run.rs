//! `mbrand run`: reconcile sales against the catalog and report metrics.

use std::path::PathBuf;

use serde::Serialize;

use multibrand_io::{read_table_file, repair_file, RepairOptions, RepairStats, TextEncoding};
use multibrand_recon::model::{
    format_cents, AuditEntry, ClientCycleMetric, OverallMetrics, ReconMeta, SectorCycleMetric,
};
use multibrand_recon::report::{customer_detail, overall_metrics, top_sectors, CustomerDetail, TopSectors};
use multibrand_recon::{run, CustomerId, MetricFilter, Warning};

use crate::config::load_engine_config;
use crate::CliError;

pub struct RunArgs {
    pub catalog: PathBuf,
    pub sales: PathBuf,
    pub config: Option<PathBuf>,
    pub sep: Option<char>,
    pub encoding: Option<TextEncoding>,
    pub cycles: Vec<String>,
    pub sectors: Vec<String>,
    pub brands: Vec<String>,
    pub only_multi_brand: bool,
    pub customer: Option<CustomerId>,
    pub top: usize,
    pub json: bool,
    pub output: Option<PathBuf>,
}

/// JSON document printed by `mbrand run --json`.
#[derive(Serialize)]
struct RunOutput {
    meta: ReconMeta,
    repair: RepairStats,
    warnings: Vec<Warning>,
    filter: MetricFilter,
    overall: OverallMetrics,
    top_sectors: TopSectors,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer: Option<CustomerDetail>,
    clients: Vec<ClientCycleMetric>,
    sectors: Vec<SectorCycleMetric>,
    audit: Vec<AuditEntry>,
}

/// Identity selected by `--customer` or by `--customer-name` plus
/// `--customer-sector` (clap keeps the two forms exclusive).
pub fn customer_id(
    code: Option<String>,
    name: Option<String>,
    sector: Option<String>,
) -> Option<CustomerId> {
    match (code, name, sector) {
        (Some(code), _, _) => Some(CustomerId::derive(&code, "", "")),
        (None, Some(name), Some(sector)) => Some(CustomerId::Fallback {
            name: name.trim().to_string(),
            sector: sector.trim().to_string(),
        }),
        _ => None,
    }
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_engine_config(args.config.as_deref())?;

    let catalog = read_table_file(&args.catalog, None, None)
        .map_err(|e| CliError::read(&args.catalog, e))?
        .table;

    let options = RepairOptions {
        encoding: args.encoding,
        separator: args.sep,
        ..RepairOptions::from_config(&config.repair)
    };
    let repaired = repair_file(&args.sales, &options).map_err(|e| CliError::read(&args.sales, e))?;
    if !repaired.report.is_clean() {
        log::info!("{}: {} repair(s) applied", args.sales.display(), repaired.report.fixes.len());
    }

    let result = run(&config, &catalog, &repaired.table).map_err(|e| {
        let err = CliError::recon(e);
        CliError { message: format!("{}: {}", args.sales.display(), err.message), ..err }
    })?;

    // Sector rows only honor the cycle and sector criteria
    let filter = MetricFilter {
        cycles: args.cycles,
        sectors: args.sectors,
        brands: args.brands,
        only_multi_brand: args.only_multi_brand,
    };
    let clients = filter.apply(&result.clients);
    let sectors = filter.apply_sectors(&result.sectors);
    let overall = overall_metrics(&clients);
    let top = top_sectors(&sectors, args.top);

    let customer = args.customer.as_ref().map(|id| {
        let cycle = match filter.cycles.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        };
        customer_detail(&result.enriched, id, cycle, &config)
    });

    let output = RunOutput {
        meta: result.meta,
        repair: repaired.report.stats.clone(),
        warnings: result.warnings,
        filter,
        overall,
        top_sectors: top,
        customer,
        clients,
        sectors,
        audit: result.audit,
    };

    let json_str = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    } else {
        print_summary(&output);
    }

    Ok(())
}

fn print_summary(out: &RunOutput) {
    for w in &out.warnings {
        eprintln!("{w}");
    }

    let o = &out.overall;
    println!(
        "customers: {} active, {} multi-brand ({:.1}%)",
        o.active_customers, o.multi_brand_customers, o.multi_brand_pct
    );
    println!("volume: {} item(s), {}", o.quantity, format_cents(o.amount_cents));

    if !out.top_sectors.by_amount.is_empty() {
        println!();
        println!("top sectors by amount:");
        for s in &out.top_sectors.by_amount {
            println!("  {:<24} {:>14}", s.sector, format_cents(s.amount_cents));
        }
        println!("top sectors by active customers:");
        for s in &out.top_sectors.by_active {
            println!("  {:<24} {:>14}", s.sector, s.active_customers);
        }
    }

    if !out.sectors.is_empty() {
        println!();
        println!("{:<8} {:<24} {:>7} {:>7} {:>7}", "cycle", "sector", "active", "multi", "%");
        for s in &out.sectors {
            println!(
                "{:<8} {:<24} {:>7} {:>7} {:>6.1}%",
                s.cycle, s.sector, s.active_customers, s.multi_brand_customers, s.multi_brand_pct
            );
        }
    }

    if let Some(ref c) = out.customer {
        println!();
        println!(
            "customer {}: {} row(s), {} item(s), {}",
            c.customer_id,
            c.rows.len(),
            c.summary.quantity,
            format_cents(c.summary.amount_cents)
        );
        println!("  brands: {}", c.summary.brands.join(", "));
        println!("  cycles: {}", c.summary.cycles.join(", "));
    }

    if !out.audit.is_empty() {
        eprintln!("audit: {} unresolved or zero-prefix code(s)", out.audit.len());
    }
}
