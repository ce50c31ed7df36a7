use crate::config::EngineConfig;
use crate::index::MatchIndex;
use crate::model::{CustomerId, EnrichedSalesRow, MatchReason, SalesRow, Warning, WarningKind};
use crate::normalize::normalize_code;
use crate::resolve::resolve;

/// Match statistics over sale-typed rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MatchStats {
    pub sale_rows: usize,
    pub not_found: usize,
    pub zero_prefix: usize,
}

impl MatchStats {
    /// Share of sale rows whose code was not found. 0 without sale rows.
    pub fn unmatched_ratio(&self) -> f64 {
        if self.sale_rows == 0 {
            0.0
        } else {
            self.not_found as f64 / self.sale_rows as f64
        }
    }
}

/// Resolve every sales row against the index and attach brand, name, match
/// reason and customer identity. Unmatched codes are data, never errors.
pub fn enrich(
    rows: &[SalesRow],
    index: &MatchIndex,
    config: &EngineConfig,
) -> (Vec<EnrichedSalesRow>, Vec<Warning>) {
    let mut stats = MatchStats::default();
    let mut enriched = Vec::with_capacity(rows.len());

    for row in rows {
        let normalized_code = normalize_code(Some(row.product_code.as_str()));
        let resolution = resolve(index, &normalized_code);

        let (resolved_brand, resolved_name) = match resolution.entry {
            Some(entry) => (entry.brand.clone(), entry.name.clone()),
            None => (config.unknown_brand.clone(), row.product_name.clone()),
        };

        if row.record_type == config.sale_type {
            stats.sale_rows += 1;
            match resolution.reason {
                MatchReason::NotFound => stats.not_found += 1,
                MatchReason::MatchedWithZeroPrefix => stats.zero_prefix += 1,
                MatchReason::ExactMatch => {}
            }
        }

        enriched.push(EnrichedSalesRow {
            customer_id: CustomerId::derive(&row.customer_code, &row.customer_name, &row.sector),
            row: row.clone(),
            normalized_code,
            resolved_brand,
            resolved_name,
            match_reason: resolution.reason,
        });
    }

    let warnings = match_warnings(&stats, config);
    (enriched, warnings)
}

fn match_warnings(stats: &MatchStats, config: &EngineConfig) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if stats.sale_rows == 0 {
        return warnings;
    }

    let ratio = stats.unmatched_ratio();
    let found = stats.sale_rows - stats.not_found;
    warnings.push(Warning::info(
        WarningKind::MatchRate,
        format!(
            "SKUs found: {found} / {} ({:.1}%)",
            stats.sale_rows,
            (1.0 - ratio) * 100.0
        ),
    ));
    log::info!("match rate: {found}/{} sale row(s)", stats.sale_rows);

    if ratio > config.unmatched_alert_ratio {
        let msg = format!(
            "{:.1}% of sale rows have SKUs not found in the catalog; check that the catalog is complete",
            ratio * 100.0
        );
        log::warn!("{msg}");
        warnings.push(Warning::high(WarningKind::UnmatchedRatio, msg));
    }

    if stats.zero_prefix > 0 {
        warnings.push(Warning::info(
            WarningKind::ZeroPrefixMatches,
            format!("{} SKU(s) matched by adding a leading zero", stats.zero_prefix),
        ));
    }

    warnings
}
