use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input tables
// ---------------------------------------------------------------------------

/// Which of the two inputs a table (or an error about it) refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Catalog,
    Sales,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog"),
            Self::Sales => write!(f, "sales"),
        }
    }
}

/// Digit-only product code. Empty means absent/invalid.
///
/// Compared as a string: `"123"` and `"0123"` are different codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedCode(String);

impl NormalizedCode {
    /// Caller guarantees `digits` is ASCII digits only.
    pub(crate) fn from_digits(digits: String) -> Self {
        debug_assert!(digits.bytes().all(|b| b.is_ascii_digit()));
        Self(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for NormalizedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One product of the authoritative catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub code: NormalizedCode,
    pub raw_code: String,
    pub name: String,
    pub brand: String,
}

/// One validated row of the sales extract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRow {
    pub sector: String,
    pub customer_name: String,
    pub customer_code: String,
    pub cycle: String,
    pub product_code: String,
    pub product_name: String,
    pub record_type: String,
    pub quantity: i64,
    pub amount_cents: i64,
    pub channel: String,
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Customer identity. `Fallback` is heuristic: two customers with the same
/// name and sector and no code collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomerId {
    Coded { code: String },
    Fallback { name: String, sector: String },
}

impl CustomerId {
    /// Code when present and non-blank, else `name|sector`.
    pub fn derive(code: &str, name: &str, sector: &str) -> Self {
        let code = code.trim();
        if code.is_empty() {
            Self::Fallback {
                name: name.to_string(),
                sector: sector.to_string(),
            }
        } else {
            Self::Coded { code: code.to_string() }
        }
    }

    pub fn is_reliable(&self) -> bool {
        matches!(self, Self::Coded { .. })
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coded { code } => f.write_str(code),
            Self::Fallback { name, sector } => write!(f, "{name}|{sector}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchReason {
    ExactMatch,
    MatchedWithZeroPrefix,
    NotFound,
}

impl MatchReason {
    /// Reasons that land in the audit table.
    pub fn is_audited(&self) -> bool {
        !matches!(self, Self::ExactMatch)
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactMatch => write!(f, "EXACT_MATCH"),
            Self::MatchedWithZeroPrefix => write!(f, "MATCHED_WITH_ZERO_PREFIX"),
            Self::NotFound => write!(f, "NOT_FOUND"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedSalesRow {
    #[serde(flatten)]
    pub row: SalesRow,
    pub normalized_code: NormalizedCode,
    pub resolved_brand: String,
    pub resolved_name: String,
    pub match_reason: MatchReason,
    pub customer_id: CustomerId,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientCycleMetric {
    pub cycle: String,
    pub customer_id: CustomerId,
    pub sector: String,
    pub customer_code: String,
    pub customer_name: String,
    /// Distinct known brands, sorted.
    pub brands: Vec<String>,
    pub distinct_brands: usize,
    pub is_multi_brand: bool,
    pub quantity: i64,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorCycleMetric {
    pub cycle: String,
    pub sector: String,
    pub active_customers: usize,
    pub multi_brand_customers: usize,
    /// Rounded to one decimal. 0 when there are no active customers.
    pub multi_brand_pct: f64,
    pub quantity: i64,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallMetrics {
    pub active_customers: usize,
    pub multi_brand_customers: usize,
    pub multi_brand_pct: f64,
    pub quantity: i64,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AuditEntry {
    pub cycle: String,
    pub sector: String,
    pub customer_code: String,
    pub raw_code: String,
    pub normalized_code: NormalizedCode,
    pub product_name: String,
    pub match_reason: MatchReason,
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnrecognizedBrand,
    EmptyCatalogCode,
    DuplicateCatalogCode,
    MissingOptionalColumn,
    UnparseableNumber,
    RecordTypeCounts,
    MatchRate,
    UnmatchedRatio,
    ZeroPrefixMatches,
    SectorChange,
    TotalOverflow,
}

/// Data-quality finding. Never interrupts a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub severity: Severity,
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn info(kind: WarningKind, message: impl Into<String>) -> Self {
        Self { severity: Severity::Info, kind, message: message.into() }
    }

    pub fn warning(kind: WarningKind, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, kind, message: message.into() }
    }

    pub fn high(kind: WarningKind, message: impl Into<String>) -> Self {
        Self { severity: Severity::High, kind, message: message.into() }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::High => "ALERT",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub catalog_entries: usize,
    pub index_keys: usize,
    pub sales_rows: usize,
    pub sale_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub warnings: Vec<Warning>,
    pub overall: OverallMetrics,
    pub clients: Vec<ClientCycleMetric>,
    pub sectors: Vec<SectorCycleMetric>,
    pub audit: Vec<AuditEntry>,
    pub enriched: Vec<EnrichedSalesRow>,
}

impl ReconResult {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Format integer cents as `1234.56`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
