use std::fmt;

use serde::Serialize;

use crate::data::model::{
    DominantSubcontractor, ScopeAggregationRow, ScopeConcentration, ScopeEquity,
};

// ---------------------------------------------------------------------------
// Concentration tiers
// ---------------------------------------------------------------------------

/// HHI tier boundaries. Both are inclusive on their lower side: an HHI of
/// exactly 2500 is highly concentrated, exactly 1500 is moderately so.
pub const HIGH_CONCENTRATION_HHI: f64 = 2500.0;
pub const MODERATE_CONCENTRATION_HHI: f64 = 1500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConcentrationTier {
    #[serde(rename = "Highly Concentrated")]
    HighlyConcentrated,
    #[serde(rename = "Moderately Concentrated")]
    ModeratelyConcentrated,
    #[serde(rename = "Unconcentrated")]
    Unconcentrated,
}

impl ConcentrationTier {
    pub const ALL: [ConcentrationTier; 3] = [
        ConcentrationTier::HighlyConcentrated,
        ConcentrationTier::ModeratelyConcentrated,
        ConcentrationTier::Unconcentrated,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConcentrationTier::HighlyConcentrated => "Highly Concentrated",
            ConcentrationTier::ModeratelyConcentrated => "Moderately Concentrated",
            ConcentrationTier::Unconcentrated => "Unconcentrated",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

impl fmt::Display for ConcentrationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reference classification of an HHI score. Recorded tier labels in loaded
/// rows stay authoritative; this rule backs consistency checks and any
/// recomputation.
pub fn concentration_tier(hhi: f64) -> ConcentrationTier {
    if hhi >= HIGH_CONCENTRATION_HHI {
        ConcentrationTier::HighlyConcentrated
    } else if hhi >= MODERATE_CONCENTRATION_HHI {
        ConcentrationTier::ModeratelyConcentrated
    } else {
        ConcentrationTier::Unconcentrated
    }
}

/// Rows whose recorded tier label disagrees with the reference rule for
/// their HHI (or carries a label the rule does not know).
pub fn mislabeled(rows: &[ScopeConcentration]) -> Vec<&ScopeConcentration> {
    rows.iter()
        .filter(|r| ConcentrationTier::from_label(&r.recorded_level) != Some(concentration_tier(r.hhi)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tier rollups
// ---------------------------------------------------------------------------

/// Scope count and summed spend for one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierRollup {
    pub tier: ConcentrationTier,
    pub scopes: usize,
    pub total_spend: f64,
}

/// Per-tier rollups in fixed order (high → moderate → unconcentrated),
/// grouped by the *recorded* tier labels. Rows with unrecognized labels are
/// not counted anywhere.
pub fn tier_rollups(rows: &[ScopeConcentration]) -> Vec<TierRollup> {
    ConcentrationTier::ALL
        .into_iter()
        .map(|tier| {
            let matching = rows
                .iter()
                .filter(|r| ConcentrationTier::from_label(&r.recorded_level) == Some(tier));
            let (scopes, total_spend) = matching.fold((0usize, 0.0f64), |(n, sum), r| {
                (n + 1, sum + r.total_spend)
            });
            TierRollup {
                tier,
                scopes,
                total_spend,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dominant firms
// ---------------------------------------------------------------------------

/// A firm is dominant when it holds at least this share of its scope.
pub const DOMINANT_SHARE_THRESHOLD: f64 = 0.25;

pub fn is_dominant(row: &DominantSubcontractor) -> bool {
    row.share_of_scope >= DOMINANT_SHARE_THRESHOLD
}

pub fn dominant_firms(rows: &[DominantSubcontractor]) -> Vec<&DominantSubcontractor> {
    rows.iter().filter(|&r| is_dominant(r)).collect()
}

// ---------------------------------------------------------------------------
// Equity aggregates
// ---------------------------------------------------------------------------

/// Dollar-weighted LBE participation across all scopes. The non-LBE firm
/// count is derived by subtraction so the two halves always sum to the
/// total, and the share is defined as 0 when no dollars were recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquitySummary {
    pub total_dollars: f64,
    pub lbe_dollars: f64,
    pub overall_share: f64,
    pub lbe_firms: u32,
    pub total_firms: u32,
    pub non_lbe_firms: u32,
}

pub fn equity_summary(rows: &[ScopeEquity]) -> EquitySummary {
    let total_dollars: f64 = rows.iter().map(|r| r.total_dollars).sum();
    let lbe_dollars: f64 = rows
        .iter()
        .map(|r| r.total_dollars * r.lbe_dollar_share)
        .sum();
    let overall_share = if total_dollars > 0.0 {
        lbe_dollars / total_dollars
    } else {
        0.0
    };

    let lbe_firms: u32 = rows.iter().map(|r| r.lbe_count).sum();
    let total_firms: u32 = rows.iter().map(|r| r.total_subs).sum();

    EquitySummary {
        total_dollars,
        lbe_dollars,
        overall_share,
        lbe_firms,
        total_firms,
        non_lbe_firms: total_firms.saturating_sub(lbe_firms),
    }
}

/// Attention thresholds: a scope with an LBE dollar share below the low
/// bound or above the high bound warrants review.
pub const ATTENTION_LOW_SHARE: f64 = 0.25;
pub const ATTENTION_HIGH_SHARE: f64 = 0.75;

/// Scopes at the participation extremes, ascending by LBE dollar share,
/// capped at `limit` (the surfaces show 10).
pub fn scopes_requiring_attention(rows: &[ScopeEquity], limit: usize) -> Vec<&ScopeEquity> {
    let mut concerning: Vec<&ScopeEquity> = rows
        .iter()
        .filter(|r| {
            r.lbe_dollar_share < ATTENTION_LOW_SHARE || r.lbe_dollar_share > ATTENTION_HIGH_SHARE
        })
        .collect();
    concerning.sort_by(|a, b| a.lbe_dollar_share.total_cmp(&b.lbe_dollar_share));
    concerning.truncate(limit);
    concerning
}

/// Highest-spend scopes with recorded dollars, descending by total spend.
pub fn top_scopes_by_spend(rows: &[ScopeEquity], limit: usize) -> Vec<&ScopeEquity> {
    let mut scopes: Vec<&ScopeEquity> = rows.iter().filter(|r| r.total_dollars > 0.0).collect();
    scopes.sort_by(|a, b| b.total_dollars.total_cmp(&a.total_dollars));
    scopes.truncate(limit);
    scopes
}

// ---------------------------------------------------------------------------
// Scope firm breakdowns
// ---------------------------------------------------------------------------

/// Every aggregation row for `scope`, descending by share of scope.
pub fn scope_breakdown<'a>(
    rows: &'a [ScopeAggregationRow],
    scope: &str,
) -> Vec<&'a ScopeAggregationRow> {
    let mut firms: Vec<&ScopeAggregationRow> =
        rows.iter().filter(|r| r.scope == scope).collect();
    firms.sort_by(|a, b| b.share_of_scope.total_cmp(&a.share_of_scope));
    firms
}

// ---------------------------------------------------------------------------
// Cross-dataset KPIs
// ---------------------------------------------------------------------------

/// Headline aggregates for the overview surface, recomputed from the loaded
/// datasets on every cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketKpis {
    pub total_spend: f64,
    pub scopes: usize,
    pub highly_concentrated_scopes: usize,
    pub highly_concentrated_share: f64,
    pub lbe_dollars: f64,
    pub lbe_share: f64,
    pub average_award: f64,
}

pub fn market_kpis(
    concentration: &[ScopeConcentration],
    equity: &[ScopeEquity],
    aggregation: &[ScopeAggregationRow],
) -> MarketKpis {
    let highly_concentrated_scopes = concentration
        .iter()
        .filter(|r| {
            ConcentrationTier::from_label(&r.recorded_level)
                == Some(ConcentrationTier::HighlyConcentrated)
        })
        .count();
    let scopes = concentration.len();
    let highly_concentrated_share = if scopes > 0 {
        highly_concentrated_scopes as f64 / scopes as f64
    } else {
        0.0
    };

    let equity_totals = equity_summary(equity);

    let awarded: f64 = aggregation.iter().map(|r| r.amount).sum();
    let contracts: u32 = aggregation.iter().map(|r| r.contracts).sum();
    let average_award = if contracts > 0 {
        awarded / contracts as f64
    } else {
        0.0
    };

    MarketKpis {
        total_spend: equity_totals.total_dollars,
        scopes,
        highly_concentrated_scopes,
        highly_concentrated_share,
        lbe_dollars: equity_totals.lbe_dollars,
        lbe_share: equity_totals.overall_share,
        average_award,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concentration(scope: &str, hhi: f64, spend: f64, level: &str) -> ScopeConcentration {
        ScopeConcentration {
            scope: scope.into(),
            hhi,
            subcontractors: 3,
            total_spend: spend,
            recorded_level: level.into(),
        }
    }

    fn equity(scope: &str, dollars: f64, share: f64) -> ScopeEquity {
        ScopeEquity {
            scope: scope.into(),
            lbe_count: 1,
            total_subs: 2,
            lbe_rate: 0.5,
            total_dollars: dollars,
            lbe_dollar_share: share,
        }
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(
            concentration_tier(2500.0),
            ConcentrationTier::HighlyConcentrated
        );
        assert_eq!(
            concentration_tier(1500.0),
            ConcentrationTier::ModeratelyConcentrated
        );
        assert_eq!(concentration_tier(1499.0), ConcentrationTier::Unconcentrated);
        assert_eq!(
            concentration_tier(10000.0),
            ConcentrationTier::HighlyConcentrated
        );
        assert_eq!(concentration_tier(0.0), ConcentrationTier::Unconcentrated);
    }

    #[test]
    fn rollups_group_by_recorded_label() {
        let rows = vec![
            concentration("A", 3000.0, 100.0, "Highly Concentrated"),
            concentration("B", 2700.0, 50.0, "Highly Concentrated"),
            concentration("C", 1600.0, 25.0, "Moderately Concentrated"),
            concentration("D", 900.0, 10.0, "Unconcentrated"),
            concentration("E", 900.0, 999.0, "Mystery Tier"),
        ];
        let rollups = tier_rollups(&rows);

        assert_eq!(rollups.len(), 3);
        assert_eq!(rollups[0].tier, ConcentrationTier::HighlyConcentrated);
        assert_eq!(rollups[0].scopes, 2);
        assert_eq!(rollups[0].total_spend, 150.0);
        assert_eq!(rollups[1].scopes, 1);
        assert_eq!(rollups[2].scopes, 1);
        // The unrecognized label lands nowhere.
        let counted: usize = rollups.iter().map(|r| r.scopes).sum();
        assert_eq!(counted, 4);
    }

    #[test]
    fn mislabeled_rows_are_detected() {
        let rows = vec![
            concentration("A", 3000.0, 100.0, "Highly Concentrated"),
            concentration("B", 3000.0, 100.0, "Unconcentrated"),
            concentration("C", 100.0, 100.0, "Nonsense"),
        ];
        let bad = mislabeled(&rows);
        assert_eq!(bad.len(), 2);
        assert_eq!(bad[0].scope, "B");
        assert_eq!(bad[1].scope, "C");
    }

    #[test]
    fn dominant_threshold_is_inclusive() {
        let mut row = DominantSubcontractor {
            scope: "Paving".into(),
            firm: "Acme".into(),
            amount: 100.0,
            contracts: 1,
            scope_total: 400.0,
            share_of_scope: 0.2499,
            rank_in_scope: 1,
        };
        assert!(!is_dominant(&row));
        row.share_of_scope = 0.25;
        assert!(is_dominant(&row));

        let other = DominantSubcontractor {
            share_of_scope: 0.1,
            ..row.clone()
        };
        let rows = vec![row, other];
        let dominant = dominant_firms(&rows);
        assert_eq!(dominant.len(), 1);
        assert_eq!(dominant[0].share_of_scope, 0.25);
    }

    #[test]
    fn equity_share_is_dollar_weighted() {
        let rows = vec![equity("A", 100.0, 0.5), equity("B", 300.0, 0.9)];
        let summary = equity_summary(&rows);
        assert_eq!(summary.total_dollars, 400.0);
        assert_eq!(summary.lbe_dollars, 320.0);
        assert!((summary.overall_share - 0.8).abs() < 1e-12);
        assert_eq!(summary.lbe_firms, 2);
        assert_eq!(summary.total_firms, 4);
        assert_eq!(summary.non_lbe_firms, 2);
    }

    #[test]
    fn equity_share_is_zero_when_no_dollars() {
        let summary = equity_summary(&[equity("A", 0.0, 0.9)]);
        assert_eq!(summary.overall_share, 0.0);
    }

    #[test]
    fn attention_list_is_ascending_and_capped() {
        let rows = vec![
            equity("High", 10.0, 0.9),
            equity("Fine", 10.0, 0.5),
            equity("Zero", 10.0, 0.0),
            equity("Low", 10.0, 0.1),
            equity("EdgeLow", 10.0, 0.25),
            equity("EdgeHigh", 10.0, 0.75),
        ];

        let concerning = scopes_requiring_attention(&rows, 10);
        let names: Vec<&str> = concerning.iter().map(|r| r.scope.as_str()).collect();
        // 0.25 and 0.75 are inside the acceptable band; the rest sort ascending.
        assert_eq!(names, vec!["Zero", "Low", "High"]);

        let capped = scopes_requiring_attention(&rows, 2);
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].scope, "Zero");
    }

    #[test]
    fn top_scopes_skip_zero_dollar_rows() {
        let rows = vec![
            equity("A", 50.0, 0.5),
            equity("B", 0.0, 0.5),
            equity("C", 200.0, 0.5),
        ];
        let top = top_scopes_by_spend(&rows, 5);
        let names: Vec<&str> = top.iter().map(|r| r.scope.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);
    }

    #[test]
    fn scope_breakdown_orders_by_share() {
        let rows = vec![
            ScopeAggregationRow {
                scope: "Electrical".into(),
                firm: "Second".into(),
                amount: 80.0,
                contracts: 3,
                scope_total: 350.0,
                share_of_scope: 0.227,
            },
            ScopeAggregationRow {
                scope: "Concrete".into(),
                firm: "Other".into(),
                amount: 10.0,
                contracts: 1,
                scope_total: 10.0,
                share_of_scope: 1.0,
            },
            ScopeAggregationRow {
                scope: "Electrical".into(),
                firm: "First".into(),
                amount: 150.0,
                contracts: 5,
                scope_total: 350.0,
                share_of_scope: 0.426,
            },
        ];
        let breakdown = scope_breakdown(&rows, "Electrical");
        let firms: Vec<&str> = breakdown.iter().map(|r| r.firm.as_str()).collect();
        assert_eq!(firms, vec!["First", "Second"]);
    }

    #[test]
    fn kpis_recompute_from_live_rows() {
        let concentration_rows = vec![
            concentration("A", 3000.0, 100.0, "Highly Concentrated"),
            concentration("B", 900.0, 100.0, "Unconcentrated"),
        ];
        let equity_rows = vec![equity("A", 100.0, 0.5), equity("B", 300.0, 0.9)];
        let aggregation_rows = vec![
            ScopeAggregationRow {
                scope: "A".into(),
                firm: "X".into(),
                amount: 300.0,
                contracts: 2,
                scope_total: 400.0,
                share_of_scope: 0.75,
            },
            ScopeAggregationRow {
                scope: "A".into(),
                firm: "Y".into(),
                amount: 100.0,
                contracts: 2,
                scope_total: 400.0,
                share_of_scope: 0.25,
            },
        ];

        let kpis = market_kpis(&concentration_rows, &equity_rows, &aggregation_rows);
        assert_eq!(kpis.scopes, 2);
        assert_eq!(kpis.highly_concentrated_scopes, 1);
        assert_eq!(kpis.highly_concentrated_share, 0.5);
        assert_eq!(kpis.total_spend, 400.0);
        assert!((kpis.lbe_share - 0.8).abs() < 1e-12);
        assert_eq!(kpis.average_award, 100.0);
    }
}
