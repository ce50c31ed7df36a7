use std::collections::{BTreeSet, HashMap};

use crate::config::EngineConfig;
use crate::error::ReconError;
use crate::model::{CatalogEntry, SalesRow, TableKind, Warning, WarningKind};
use crate::normalize::{normalize_brand, normalize_code, parse_cents, parse_quantity};
use crate::table::Table;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const CATALOG_SKU: &str = "SKU";
pub const CATALOG_NAME: &str = "Nome";
pub const CATALOG_BRAND: &str = "Marca";

pub const CATALOG_REQUIRED: &[&str] = &[CATALOG_SKU, CATALOG_NAME, CATALOG_BRAND];

pub const SALES_SECTOR: &str = "Setor";
pub const SALES_CUSTOMER_NAME: &str = "NomeRevendedora";
pub const SALES_CUSTOMER_CODE: &str = "CodigoRevendedora";
pub const SALES_CYCLE: &str = "CicloFaturamento";
pub const SALES_PRODUCT_CODE: &str = "CodigoProduto";
pub const SALES_PRODUCT_NAME: &str = "NomeProduto";
pub const SALES_TYPE: &str = "Tipo";
pub const SALES_QUANTITY: &str = "QuantidadeItens";
pub const SALES_AMOUNT: &str = "ValorPraticado";
pub const SALES_CHANNEL: &str = "MeioCaptacao";

pub const SALES_REQUIRED: &[&str] = &[
    SALES_SECTOR,
    SALES_CUSTOMER_NAME,
    SALES_CUSTOMER_CODE,
    SALES_CYCLE,
    SALES_PRODUCT_CODE,
    SALES_PRODUCT_NAME,
    SALES_TYPE,
    SALES_QUANTITY,
    SALES_AMOUNT,
];

/// Duplicate codes listed by name in the duplicate warning.
const DUPLICATE_EXAMPLES: usize = 5;

fn require(table: &Table, kind: TableKind, required: &[&str]) -> Result<Vec<usize>, ReconError> {
    let missing = table.missing_columns(required);
    if !missing.is_empty() {
        return Err(ReconError::MissingColumns { table: kind, columns: missing });
    }
    Ok(required.iter().filter_map(|c| table.column_index(c)).collect())
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Validate and normalize the catalog table.
///
/// Rows whose code normalizes to empty are dropped (counted in one warning).
/// Duplicate codes are kept and reported; the match index decides which wins.
pub fn load_catalog(
    table: &Table,
    config: &EngineConfig,
) -> Result<(Vec<CatalogEntry>, Vec<Warning>), ReconError> {
    let cols = require(table, TableKind::Catalog, CATALOG_REQUIRED)?;
    let (sku_idx, name_idx, brand_idx) = (cols[0], cols[1], cols[2]);

    let mut warnings = Vec::new();
    let mut entries = Vec::with_capacity(table.len());
    let mut unrecognized: BTreeSet<String> = BTreeSet::new();
    let mut dropped = 0usize;

    for row in 0..table.len() {
        let raw_brand = table.cell(row, brand_idx);
        let brand = normalize_brand(raw_brand, &config.brands);
        if !brand.is_empty() && !config.brands.recognizes(&brand) {
            unrecognized.insert(brand.clone());
        }

        let raw_code = table.cell(row, sku_idx);
        let code = normalize_code(Some(raw_code));
        if code.is_empty() {
            dropped += 1;
            continue;
        }

        entries.push(CatalogEntry {
            code,
            raw_code: raw_code.to_string(),
            name: table.cell(row, name_idx).trim().to_string(),
            brand,
        });
    }

    for brand in &unrecognized {
        warnings.push(Warning::warning(
            WarningKind::UnrecognizedBrand,
            format!("unrecognized brand in catalog: '{brand}'"),
        ));
    }

    if dropped > 0 {
        warnings.push(Warning::warning(
            WarningKind::EmptyCatalogCode,
            format!("{dropped} catalog row(s) dropped: empty or invalid SKU"),
        ));
    }

    if let Some(w) = duplicate_warning(&entries) {
        warnings.push(w);
    }

    log::info!(
        "catalog loaded: {} entr(ies), {} dropped, {} warning(s)",
        entries.len(),
        dropped,
        warnings.len()
    );

    Ok((entries, warnings))
}

fn duplicate_warning(entries: &[CatalogEntry]) -> Option<Warning> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for e in entries {
        *counts.entry(e.code.as_str()).or_insert(0) += 1;
    }

    // First-appearance order for the examples
    let mut seen = BTreeSet::new();
    let mut examples = Vec::new();
    let mut rows = 0usize;
    for e in entries {
        let n = counts[e.code.as_str()];
        if n > 1 {
            rows += 1;
            if seen.insert(e.code.as_str()) && examples.len() < DUPLICATE_EXAMPLES {
                examples.push(e.code.as_str());
            }
        }
    }

    if rows == 0 {
        return None;
    }

    Some(Warning::warning(
        WarningKind::DuplicateCatalogCode,
        format!(
            "duplicate SKUs in catalog: {}{} (total: {rows} row(s))",
            examples.join(", "),
            if seen.len() > examples.len() { ", ..." } else { "" },
        ),
    ))
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

/// Validate and type the sales table.
///
/// A missing `MeioCaptacao` column is synthesized as empty. Blank or
/// unparseable quantities and amounts count as zero and are reported once.
pub fn load_sales(
    table: &Table,
    config: &EngineConfig,
) -> Result<(Vec<SalesRow>, Vec<Warning>), ReconError> {
    let cols = require(table, TableKind::Sales, SALES_REQUIRED)?;
    let channel_idx = table.column_index(SALES_CHANNEL);

    let mut warnings = Vec::new();
    if channel_idx.is_none() {
        warnings.push(Warning::warning(
            WarningKind::MissingOptionalColumn,
            format!("optional column '{SALES_CHANNEL}' not found; treated as empty"),
        ));
    }

    let mut rows = Vec::with_capacity(table.len());
    let mut bad_numbers = 0usize;
    let mut sale_rows = 0usize;

    for r in 0..table.len() {
        let get = |i: usize| table.cell(r, cols[i]);

        let quantity = parse_quantity(get(7)).unwrap_or_else(|| {
            bad_numbers += 1;
            0
        });
        let amount_cents = parse_cents(get(8)).unwrap_or_else(|| {
            bad_numbers += 1;
            0
        });

        let record_type = get(6).trim().to_string();
        if record_type == config.sale_type {
            sale_rows += 1;
        }

        rows.push(SalesRow {
            sector: get(0).trim().to_string(),
            customer_name: get(1).trim().to_string(),
            customer_code: get(2).trim().to_string(),
            cycle: get(3).trim().to_string(),
            product_code: get(4).to_string(),
            product_name: get(5).trim().to_string(),
            record_type,
            quantity,
            amount_cents,
            channel: channel_idx.map(|i| table.cell(r, i).trim().to_string()).unwrap_or_default(),
        });
    }

    if bad_numbers > 0 {
        warnings.push(Warning::warning(
            WarningKind::UnparseableNumber,
            format!(
                "{bad_numbers} blank or unparseable value(s) in {SALES_QUANTITY}/{SALES_AMOUNT} counted as 0"
            ),
        ));
    }

    warnings.push(Warning::info(
        WarningKind::RecordTypeCounts,
        format!(
            "{} record(s): {} of type '{}', {} of other types",
            rows.len(),
            sale_rows,
            config.sale_type,
            rows.len() - sale_rows
        ),
    ));

    log::info!("sales loaded: {} row(s), {} sale-typed", rows.len(), sale_rows);

    Ok((rows, warnings))
}
