//! Views derived from the metric tables: overall totals, sector rankings,
//! single-customer detail and filtering.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::aggregate::percent;
use crate::config::EngineConfig;
use crate::model::{ClientCycleMetric, CustomerId, EnrichedSalesRow, OverallMetrics, SectorCycleMetric};

// ---------------------------------------------------------------------------
// Overall
// ---------------------------------------------------------------------------

/// Totals across every cycle. A customer counts once however many cycles it
/// was active in, and counts as multi-brand if it was in at least one.
pub fn overall_metrics(clients: &[ClientCycleMetric]) -> OverallMetrics {
    let active: BTreeSet<&CustomerId> = clients.iter().map(|c| &c.customer_id).collect();
    let multi: BTreeSet<&CustomerId> = clients
        .iter()
        .filter(|c| c.is_multi_brand)
        .map(|c| &c.customer_id)
        .collect();

    OverallMetrics {
        active_customers: active.len(),
        multi_brand_customers: multi.len(),
        multi_brand_pct: percent(multi.len(), active.len()),
        quantity: clients.iter().fold(0i64, |t, c| t.saturating_add(c.quantity)),
        amount_cents: clients.iter().fold(0i64, |t, c| t.saturating_add(c.amount_cents)),
    }
}

// ---------------------------------------------------------------------------
// Top sectors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorTotal {
    pub sector: String,
    /// Sum of per-cycle active counts.
    pub active_customers: usize,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSectors {
    pub by_amount: Vec<SectorTotal>,
    pub by_active: Vec<SectorTotal>,
}

/// Rank sectors summed over all cycles. Ties go to the sector name, ascending.
pub fn top_sectors(sectors: &[SectorCycleMetric], n: usize) -> TopSectors {
    let mut totals: BTreeMap<&str, SectorTotal> = BTreeMap::new();
    for s in sectors {
        let t = totals.entry(s.sector.as_str()).or_insert_with(|| SectorTotal {
            sector: s.sector.clone(),
            active_customers: 0,
            amount_cents: 0,
        });
        t.active_customers += s.active_customers;
        t.amount_cents = t.amount_cents.saturating_add(s.amount_cents);
    }
    let all: Vec<SectorTotal> = totals.into_values().collect();

    let mut by_amount = all.clone();
    by_amount.sort_by(|a, b| b.amount_cents.cmp(&a.amount_cents).then_with(|| a.sector.cmp(&b.sector)));
    by_amount.truncate(n);

    let mut by_active = all;
    by_active.sort_by(|a, b| {
        b.active_customers
            .cmp(&a.active_customers)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    by_active.truncate(n);

    TopSectors { by_amount, by_active }
}

// ---------------------------------------------------------------------------
// Customer detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    /// Distinct resolved brands of sale rows, sorted. The unknown label is kept.
    pub brands: Vec<String>,
    pub quantity: i64,
    pub amount_cents: i64,
    /// Cycles with sales, in first-appearance order.
    pub cycles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDetail {
    pub customer_id: CustomerId,
    pub rows: Vec<EnrichedSalesRow>,
    pub summary: CustomerSummary,
}

/// Every row of one customer (optionally one cycle), plus a summary over its
/// sale-typed rows.
pub fn customer_detail(
    rows: &[EnrichedSalesRow],
    customer_id: &CustomerId,
    cycle: Option<&str>,
    config: &EngineConfig,
) -> CustomerDetail {
    let selected: Vec<EnrichedSalesRow> = rows
        .iter()
        .filter(|r| &r.customer_id == customer_id)
        .filter(|r| cycle.map_or(true, |c| r.row.cycle == c))
        .cloned()
        .collect();

    let mut brands = BTreeSet::new();
    let mut cycles: Vec<String> = Vec::new();
    let mut quantity = 0i64;
    let mut amount_cents = 0i64;
    for r in selected.iter().filter(|r| r.row.record_type == config.sale_type) {
        brands.insert(r.resolved_brand.clone());
        if !cycles.contains(&r.row.cycle) {
            cycles.push(r.row.cycle.clone());
        }
        quantity = quantity.saturating_add(r.row.quantity);
        amount_cents = amount_cents.saturating_add(r.row.amount_cents);
    }

    CustomerDetail {
        customer_id: customer_id.clone(),
        rows: selected,
        summary: CustomerSummary {
            brands: brands.into_iter().collect(),
            quantity,
            amount_cents,
            cycles,
        },
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Restricts client metrics. Empty lists do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricFilter {
    pub cycles: Vec<String>,
    pub sectors: Vec<String>,
    /// Keep customers that bought at least one of these brands.
    pub brands: Vec<String>,
    pub only_multi_brand: bool,
}

impl MetricFilter {
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty() && self.sectors.is_empty() && self.brands.is_empty() && !self.only_multi_brand
    }

    pub fn matches(&self, c: &ClientCycleMetric) -> bool {
        (self.cycles.is_empty() || self.cycles.contains(&c.cycle))
            && (self.sectors.is_empty() || self.sectors.contains(&c.sector))
            && (self.brands.is_empty() || c.brands.iter().any(|b| self.brands.contains(b)))
            && (!self.only_multi_brand || c.is_multi_brand)
    }

    pub fn apply(&self, clients: &[ClientCycleMetric]) -> Vec<ClientCycleMetric> {
        clients.iter().filter(|c| self.matches(c)).cloned().collect()
    }

    /// Sector rows carry no brand or customer detail, so only the cycle and
    /// sector criteria apply.
    pub fn apply_sectors(&self, sectors: &[SectorCycleMetric]) -> Vec<SectorCycleMetric> {
        sectors
            .iter()
            .filter(|s| self.cycles.is_empty() || self.cycles.contains(&s.cycle))
            .filter(|s| self.sectors.is_empty() || self.sectors.contains(&s.sector))
            .cloned()
            .collect()
    }
}
