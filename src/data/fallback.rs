//! Pinned sample datasets bundled into the binary.
//!
//! These stand in for any dataset kind whose remote resource is missing,
//! unreachable, malformed, or empty. They go through the same decoder as
//! live data and are decoded once, on first use.

use std::sync::OnceLock;

use super::decode::decode;
use super::model::{
    DatasetRow, DominantSubcontractor, ScopeAggregationRow, ScopeConcentration, ScopeEquity,
};

pub const MARKET_CONCENTRATION_CSV: &str =
    include_str!("../../samples/market_concentration_hhi_consolidated.csv");
pub const DOMINANT_SUBCONTRACTORS_CSV: &str =
    include_str!("../../samples/dominant_subcontractors_consolidated.csv");
pub const LBE_ANALYSIS_CSV: &str =
    include_str!("../../samples/lbe_scope_analysis_consolidated.csv");
pub const SCOPE_AGGREGATION_CSV: &str =
    include_str!("../../samples/scope_subcontractor_aggregation_consolidated.csv");

fn decode_sample<T: DatasetRow>(csv: &str) -> Vec<T> {
    decode(csv, T::KIND.numeric_rule())
        .expect("bundled sample data is well-formed")
        .iter()
        .map(T::from_record)
        .collect()
}

pub fn market_concentration() -> &'static [ScopeConcentration] {
    static ROWS: OnceLock<Vec<ScopeConcentration>> = OnceLock::new();
    ROWS.get_or_init(|| decode_sample(MARKET_CONCENTRATION_CSV))
}

pub fn dominant_subcontractors() -> &'static [DominantSubcontractor] {
    static ROWS: OnceLock<Vec<DominantSubcontractor>> = OnceLock::new();
    ROWS.get_or_init(|| decode_sample(DOMINANT_SUBCONTRACTORS_CSV))
}

pub fn lbe_analysis() -> &'static [ScopeEquity] {
    static ROWS: OnceLock<Vec<ScopeEquity>> = OnceLock::new();
    ROWS.get_or_init(|| decode_sample(LBE_ANALYSIS_CSV))
}

pub fn scope_aggregation() -> &'static [ScopeAggregationRow] {
    static ROWS: OnceLock<Vec<ScopeAggregationRow>> = OnceLock::new();
    ROWS.get_or_init(|| decode_sample(SCOPE_AGGREGATION_CSV))
}
