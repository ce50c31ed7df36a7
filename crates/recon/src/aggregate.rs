use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::model::{
    ClientCycleMetric, CustomerId, EnrichedSalesRow, SectorCycleMetric, Warning, WarningKind,
};

/// Brands needed for a customer to count as multi-brand in a cycle.
pub const MULTI_BRAND_MIN: usize = 2;

/// Group key for per-customer metrics.
type ClientKey = (String, CustomerId);

/// Partial per-customer totals. Merging is associative; display fields come
/// from the lowest input position, so the result does not depend on how the
/// rows were split.
#[derive(Debug, Clone)]
struct ClientAcc {
    first: usize,
    sector: String,
    customer_code: String,
    customer_name: String,
    sectors: BTreeSet<String>,
    brands: BTreeSet<String>,
    quantity: i64,
    amount_cents: i64,
}

impl ClientAcc {
    fn start(pos: usize, row: &EnrichedSalesRow, unknown_brand: &str) -> Self {
        let mut acc = Self {
            first: pos,
            sector: row.row.sector.clone(),
            customer_code: row.row.customer_code.clone(),
            customer_name: row.row.customer_name.clone(),
            sectors: BTreeSet::new(),
            brands: BTreeSet::new(),
            quantity: 0,
            amount_cents: 0,
        };
        acc.add(row, unknown_brand);
        acc
    }

    fn add(&mut self, row: &EnrichedSalesRow, unknown_brand: &str) {
        self.sectors.insert(row.row.sector.clone());
        if row.resolved_brand != unknown_brand {
            self.brands.insert(row.resolved_brand.clone());
        }
        self.quantity = self.quantity.saturating_add(row.row.quantity);
        self.amount_cents = self.amount_cents.saturating_add(row.row.amount_cents);
    }

    fn merge(mut self, other: Self) -> Self {
        if other.first < self.first {
            self.first = other.first;
            self.sector = other.sector;
            self.customer_code = other.customer_code;
            self.customer_name = other.customer_name;
        }
        self.sectors.extend(other.sectors);
        self.brands.extend(other.brands);
        self.quantity = self.quantity.saturating_add(other.quantity);
        self.amount_cents = self.amount_cents.saturating_add(other.amount_cents);
        self
    }
}

fn merge_maps(
    mut left: BTreeMap<ClientKey, ClientAcc>,
    right: BTreeMap<ClientKey, ClientAcc>,
) -> BTreeMap<ClientKey, ClientAcc> {
    for (key, acc) in right {
        match left.remove(&key) {
            Some(existing) => {
                left.insert(key, existing.merge(acc));
            }
            None => {
                left.insert(key, acc);
            }
        }
    }
    left
}

/// Per (cycle, customer) metrics over sale-typed rows, ordered by cycle then
/// customer. Other record types are ignored.
///
/// The returned warnings flag customers whose rows disagree on the sector
/// within one cycle; the sector of their first row is kept.
pub fn aggregate_clients(
    rows: &[EnrichedSalesRow],
    config: &EngineConfig,
) -> (Vec<ClientCycleMetric>, Vec<Warning>) {
    let unknown = config.unknown_brand.as_str();

    let groups = rows
        .par_iter()
        .enumerate()
        .filter(|(_, r)| r.row.record_type == config.sale_type)
        .fold(BTreeMap::new, |mut map: BTreeMap<ClientKey, ClientAcc>, (pos, row)| {
            let key = (row.row.cycle.clone(), row.customer_id.clone());
            match map.get_mut(&key) {
                Some(acc) => acc.add(row, unknown),
                None => {
                    map.insert(key, ClientAcc::start(pos, row, unknown));
                }
            }
            map
        })
        .reduce(BTreeMap::new, merge_maps);

    let mut drifted = 0usize;
    let metrics: Vec<ClientCycleMetric> = groups
        .into_iter()
        .map(|((cycle, customer_id), acc)| {
            if acc.sectors.len() > 1 {
                drifted += 1;
                log::debug!(
                    "customer {customer_id} in cycle {cycle} spans sectors {:?}",
                    acc.sectors
                );
            }
            let distinct_brands = acc.brands.len();
            ClientCycleMetric {
                cycle,
                customer_id,
                sector: acc.sector,
                customer_code: acc.customer_code,
                customer_name: acc.customer_name,
                brands: acc.brands.into_iter().collect(),
                distinct_brands,
                is_multi_brand: distinct_brands >= MULTI_BRAND_MIN,
                quantity: acc.quantity,
                amount_cents: acc.amount_cents,
            }
        })
        .collect();

    let mut warnings = Vec::new();
    if drifted > 0 {
        warnings.push(Warning::warning(
            WarningKind::SectorChange,
            format!(
                "{drifted} customer/cycle group(s) have rows in more than one sector; the first row's sector is used"
            ),
        ));
    }

    log::info!("client metrics: {} customer/cycle group(s)", metrics.len());
    (metrics, warnings)
}

/// True when a total hit the `i64` bound and was clamped there.
pub fn is_saturated(total: i64) -> bool {
    total == i64::MAX || total == i64::MIN
}

/// Percentage rounded to one decimal; 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

/// Per (cycle, sector) rollup of the client metrics, ordered by cycle then sector.
pub fn aggregate_sectors(clients: &[ClientCycleMetric]) -> Vec<SectorCycleMetric> {
    #[derive(Default)]
    struct SectorAcc<'a> {
        customers: BTreeSet<&'a CustomerId>,
        multi_brand: BTreeSet<&'a CustomerId>,
        quantity: i64,
        amount_cents: i64,
    }

    let mut groups: BTreeMap<(&str, &str), SectorAcc<'_>> = BTreeMap::new();
    for c in clients {
        let acc = groups.entry((c.cycle.as_str(), c.sector.as_str())).or_default();
        acc.customers.insert(&c.customer_id);
        if c.is_multi_brand {
            acc.multi_brand.insert(&c.customer_id);
        }
        acc.quantity = acc.quantity.saturating_add(c.quantity);
        acc.amount_cents = acc.amount_cents.saturating_add(c.amount_cents);
    }

    groups
        .into_iter()
        .map(|((cycle, sector), acc)| SectorCycleMetric {
            cycle: cycle.to_string(),
            sector: sector.to_string(),
            active_customers: acc.customers.len(),
            multi_brand_customers: acc.multi_brand.len(),
            multi_brand_pct: percent(acc.multi_brand.len(), acc.customers.len()),
            quantity: acc.quantity,
            amount_cents: acc.amount_cents,
        })
        .collect()
}
