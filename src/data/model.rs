use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::numeric::parse_numeric;

// ---------------------------------------------------------------------------
// CellValue – a single decoded cell
// ---------------------------------------------------------------------------

/// A decoded cell: a finished number, raw text, or nothing at all.
/// Numeric columns are normalized at decode time, so downstream code never
/// sees numeric text for a column the schema marks numeric.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Interpret the value as a number. Numbers pass through unchanged,
    /// text goes through the lossy normalizer, missing cells are 0.
    pub fn to_number(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => parse_numeric(s),
            CellValue::Missing => 0.0,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Missing => write!(f, "<missing>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one decoded row
// ---------------------------------------------------------------------------

const MISSING: CellValue = CellValue::Missing;

/// One decoded row: column name → cell value. Column sets vary per dataset
/// kind; presence is part of each kind's schema, not enforced here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    cells: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn insert(&mut self, column: String, value: CellValue) {
        self.cells.insert(column, value);
    }

    /// Cell for `column`; absent columns read as [`CellValue::Missing`].
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&MISSING)
    }

    pub fn number(&self, column: &str) -> f64 {
        self.get(column).to_number()
    }

    /// Text cell as an owned string; numbers and missing cells read as "".
    pub fn text(&self, column: &str) -> String {
        self.get(column).as_text().unwrap_or("").to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Numeric column rule
// ---------------------------------------------------------------------------

/// Decides which columns the decoder pipes through the numeric normalizer.
/// Passed into the decoder per dataset kind rather than hard-coded there;
/// all four current kinds share [`DEFAULT_NUMERIC_RULE`], which reproduces
/// the upstream export convention exactly.
#[derive(Debug, Clone, Copy)]
pub struct NumericRule {
    pub substrings: &'static [&'static str],
    pub exact: &'static [&'static str],
}

impl NumericRule {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.substrings.iter().any(|s| column.contains(s))
            || self.exact.iter().any(|e| column == *e)
    }
}

pub static DEFAULT_NUMERIC_RULE: NumericRule = NumericRule {
    substrings: &["Amount", "HHI", "Count", "Dollars", "Rate", "Share", "Rank"],
    exact: &[
        "Total_Subs",
        "LBE_Count",
        "ScopeTotalSub",
        "ScopeHHI",
        "NumSubcontractors",
    ],
};

// ---------------------------------------------------------------------------
// Dataset kinds
// ---------------------------------------------------------------------------

/// The four dataset kinds the pipeline ingests. Each kind knows its canonical
/// remote resource name and the numeric-column rule its schema uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    MarketConcentration,
    DominantSubcontractors,
    LbeAnalysis,
    ScopeAggregation,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::MarketConcentration,
        DatasetKind::DominantSubcontractors,
        DatasetKind::LbeAnalysis,
        DatasetKind::ScopeAggregation,
    ];

    /// Fixed resource file name, one per kind.
    pub fn file_name(self) -> &'static str {
        match self {
            DatasetKind::MarketConcentration => "market_concentration_hhi_consolidated.csv",
            DatasetKind::DominantSubcontractors => "dominant_subcontractors_consolidated.csv",
            DatasetKind::LbeAnalysis => "lbe_scope_analysis_consolidated.csv",
            DatasetKind::ScopeAggregation => "scope_subcontractor_aggregation_consolidated.csv",
        }
    }

    pub fn numeric_rule(self) -> &'static NumericRule {
        // All four export schemas follow the same column-naming convention.
        &DEFAULT_NUMERIC_RULE
    }

    pub fn label(self) -> &'static str {
        match self {
            DatasetKind::MarketConcentration => "market concentration",
            DatasetKind::DominantSubcontractors => "dominant subcontractors",
            DatasetKind::LbeAnalysis => "LBE analysis",
            DatasetKind::ScopeAggregation => "scope aggregation",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Typed rows, one struct per dataset kind
// ---------------------------------------------------------------------------

/// Per-scope market concentration: HHI score, firm count, total spend, and
/// the recorded concentration tier label (authoritative; see `metrics`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeConcentration {
    pub scope: String,
    pub hhi: f64,
    pub subcontractors: u32,
    pub total_spend: f64,
    pub recorded_level: String,
}

/// Largest firms per scope, pre-ranked upstream (rank 1 = largest share).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominantSubcontractor {
    pub scope: String,
    pub firm: String,
    pub amount: f64,
    pub contracts: u32,
    pub scope_total: f64,
    pub share_of_scope: f64,
    pub rank_in_scope: u32,
}

/// Equity participation per scope: LBE firm counts and dollar shares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeEquity {
    pub scope: String,
    pub lbe_count: u32,
    pub total_subs: u32,
    pub lbe_rate: f64,
    pub total_dollars: f64,
    pub lbe_dollar_share: f64,
}

/// Fine-grained scope × firm join table; many rows share a scope name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeAggregationRow {
    pub scope: String,
    pub firm: String,
    pub amount: f64,
    pub contracts: u32,
    pub scope_total: f64,
    pub share_of_scope: f64,
}

/// A typed row that can be built from a decoded [`Record`].
///
/// Conversions are permissive: missing or malformed cells read as 0 / "",
/// mirroring the decoder's lossy numeric default. `audit` runs once per
/// decoded dataset and may log anomalies; it must not reject rows.
pub trait DatasetRow: Sized + Clone + 'static {
    const KIND: DatasetKind;

    fn from_record(record: &Record) -> Self;

    /// Pinned sample rows substituted when the remote resource fails.
    fn fallback() -> &'static [Self];

    fn audit(_rows: &[Self]) {}
}

fn count_cast(value: f64) -> u32 {
    // `as` saturates, so negative garbage clamps to 0 instead of wrapping.
    value as u32
}

fn audit_shares(kind: DatasetKind, shares: impl Iterator<Item = f64>) {
    let out_of_range = shares.filter(|s| !(0.0..=1.0).contains(s)).count();
    if out_of_range > 0 {
        log::warn!("{kind}: {out_of_range} rows have ShareOfScope outside [0, 1]");
    }
}

impl DatasetRow for ScopeConcentration {
    const KIND: DatasetKind = DatasetKind::MarketConcentration;

    fn from_record(record: &Record) -> Self {
        Self {
            scope: record.text("ScopeOfWork"),
            hhi: record.number("ScopeHHI"),
            subcontractors: count_cast(record.number("NumSubcontractors")),
            total_spend: record.number("ScopeTotalSub"),
            recorded_level: record.text("ConcentrationLevel"),
        }
    }

    fn fallback() -> &'static [Self] {
        super::fallback::market_concentration()
    }
}

impl DatasetRow for DominantSubcontractor {
    const KIND: DatasetKind = DatasetKind::DominantSubcontractors;

    fn from_record(record: &Record) -> Self {
        Self {
            scope: record.text("ScopeOfWork"),
            firm: record.text("SubcontractorName"),
            amount: record.number("TotalSubAmount"),
            contracts: count_cast(record.number("ContractsCount")),
            scope_total: record.number("ScopeTotalSub"),
            share_of_scope: record.number("ShareOfScope"),
            rank_in_scope: count_cast(record.number("RankInScope")),
        }
    }

    fn fallback() -> &'static [Self] {
        super::fallback::dominant_subcontractors()
    }

    fn audit(rows: &[Self]) {
        audit_shares(Self::KIND, rows.iter().map(|r| r.share_of_scope));
    }
}

impl DatasetRow for ScopeEquity {
    const KIND: DatasetKind = DatasetKind::LbeAnalysis;

    fn from_record(record: &Record) -> Self {
        Self {
            // This export alone uses a spaced column name for the scope key.
            scope: record.text("Scope of Work"),
            lbe_count: count_cast(record.number("LBE_Count")),
            total_subs: count_cast(record.number("Total_Subs")),
            lbe_rate: record.number("LBE_Rate"),
            total_dollars: record.number("Total_Dollars"),
            lbe_dollar_share: record.number("LBE_Dollar_Share"),
        }
    }

    fn fallback() -> &'static [Self] {
        super::fallback::lbe_analysis()
    }
}

impl DatasetRow for ScopeAggregationRow {
    const KIND: DatasetKind = DatasetKind::ScopeAggregation;

    fn from_record(record: &Record) -> Self {
        Self {
            scope: record.text("ScopeOfWork"),
            firm: record.text("SubcontractorName"),
            amount: record.number("TotalSubAmount"),
            contracts: count_cast(record.number("ContractsCount")),
            scope_total: record.number("ScopeTotalSub"),
            share_of_scope: record.number("ShareOfScope"),
        }
    }

    fn fallback() -> &'static [Self] {
        super::fallback::scope_aggregation()
    }

    fn audit(rows: &[Self]) {
        audit_shares(Self::KIND, rows.iter().map(|r| r.share_of_scope));
    }
}

// ---------------------------------------------------------------------------
// Dataset – rows plus provenance
// ---------------------------------------------------------------------------

/// An ordered sequence of one row type plus its provenance flag. Never
/// mutated in place; a reload replaces the whole value.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset<T> {
    pub rows: Vec<T>,
    pub from_fallback: bool,
}

impl<T> Dataset<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
