use std::collections::HashSet;

use crate::model::{AuditEntry, EnrichedSalesRow};

/// One entry per distinct anomalous match (not found, or found only through
/// zero padding), in first-appearance order. Exact matches are not audited.
///
/// All record types are audited, not only sales.
pub fn build_audit(rows: &[EnrichedSalesRow]) -> Vec<AuditEntry> {
    let mut seen: HashSet<AuditEntry> = HashSet::new();
    let mut audit = Vec::new();

    for r in rows.iter().filter(|r| r.match_reason.is_audited()) {
        let entry = AuditEntry {
            cycle: r.row.cycle.clone(),
            sector: r.row.sector.clone(),
            customer_code: r.row.customer_code.clone(),
            raw_code: r.row.product_code.clone(),
            normalized_code: r.normalized_code.clone(),
            product_name: r.row.product_name.clone(),
            match_reason: r.match_reason,
        };
        if seen.insert(entry.clone()) {
            audit.push(entry);
        }
    }

    log::info!("audit: {} distinct anomalous match(es)", audit.len());
    audit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomerId, MatchReason, SalesRow};
    use crate::normalize::normalize_code;

    fn row(customer: &str, code: &str, reason: MatchReason, kind: &str) -> EnrichedSalesRow {
        EnrichedSalesRow {
            row: SalesRow {
                sector: "Norte".into(),
                customer_name: "n".into(),
                customer_code: customer.into(),
                cycle: "202401".into(),
                product_code: code.into(),
                product_name: "Perfume".into(),
                record_type: kind.into(),
                quantity: 1,
                amount_cents: 1,
                channel: String::new(),
            },
            normalized_code: normalize_code(Some(code)),
            resolved_brand: "b".into(),
            resolved_name: "Perfume".into(),
            match_reason: reason,
            customer_id: CustomerId::derive(customer, "n", "Norte"),
        }
    }

    #[test]
    fn only_anomalies_deduplicated_in_order() {
        let rows = vec![
            row("1", "999", MatchReason::NotFound, "Venda"),
            row("1", "5678", MatchReason::ExactMatch, "Venda"),
            row("1", "1234", MatchReason::MatchedWithZeroPrefix, "Venda"),
            row("1", "999", MatchReason::NotFound, "Venda"),
            row("2", "999", MatchReason::NotFound, "Troca"),
        ];
        let audit = build_audit(&rows);
        assert_eq!(audit.len(), 3);
        assert_eq!(audit[0].raw_code, "999");
        assert_eq!(audit[0].match_reason, MatchReason::NotFound);
        assert_eq!(audit[1].match_reason, MatchReason::MatchedWithZeroPrefix);
        assert_eq!(audit[1].normalized_code.as_str(), "1234");
        assert_eq!(audit[2].customer_code, "2");
    }

    #[test]
    fn raw_code_distinguishes_entries() {
        let rows = vec![
            row("1", "A-999", MatchReason::NotFound, "Venda"),
            row("1", "999", MatchReason::NotFound, "Venda"),
        ];
        let audit = build_audit(&rows);
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].normalized_code, audit[1].normalized_code);
    }
}
