use serde::Serialize;

use crate::data::loader::LoadOutcome;
use crate::data::model::{
    Dataset, DominantSubcontractor, ScopeAggregationRow, ScopeConcentration, ScopeEquity,
};

// ---------------------------------------------------------------------------
// DataSession – one load cycle's worth of datasets
// ---------------------------------------------------------------------------

/// All four datasets from a single load cycle, plus the aggregate provenance
/// flag. Built once per cycle from settled per-kind outcomes and handed to
/// consumers as a read-only snapshot; a reload constructs a new value.
#[derive(Debug, Clone, Serialize)]
pub struct DataSession {
    pub concentration: Dataset<ScopeConcentration>,
    pub dominant: Dataset<DominantSubcontractor>,
    pub equity: Dataset<ScopeEquity>,
    pub aggregation: Dataset<ScopeAggregationRow>,
    pub using_fallback: bool,
}

impl DataSession {
    /// Pure reducer over the four settled outcomes: any kind that fell back
    /// flips the aggregate flag, and each failed kind gets its pinned sample.
    pub fn from_outcomes(
        concentration: LoadOutcome<ScopeConcentration>,
        dominant: LoadOutcome<DominantSubcontractor>,
        equity: LoadOutcome<ScopeEquity>,
        aggregation: LoadOutcome<ScopeAggregationRow>,
    ) -> Self {
        let using_fallback = concentration.fell_back()
            || dominant.fell_back()
            || equity.fell_back()
            || aggregation.fell_back();

        Self {
            concentration: concentration.into_dataset(),
            dominant: dominant.into_dataset(),
            equity: equity.into_dataset(),
            aggregation: aggregation.into_dataset(),
            using_fallback,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState – the presentation-facing read API
// ---------------------------------------------------------------------------

/// What presentation surfaces see: the current session (once loaded), a
/// loading flag, and a non-blocking provenance notice. No write operations
/// are exposed; only the pipeline mutates this, between snapshots.
#[derive(Debug, Default)]
pub struct SessionState {
    data: Option<DataSession>,
    loading: bool,
    notice: Option<String>,
}

impl SessionState {
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.notice = None;
    }

    /// Install a freshly assembled session. Sets the user-facing notice and
    /// clears the loading flag; data is only observable after this point, so
    /// no partial-readiness state ever escapes.
    pub fn set_session(&mut self, session: DataSession) {
        let notice = if session.using_fallback {
            "Full dataset not found, using sample data"
        } else {
            "Full dataset loaded successfully"
        };
        if session.using_fallback {
            log::warn!("{notice}");
        } else {
            log::info!("{notice}");
        }
        self.notice = Some(notice.to_string());
        self.data = Some(session);
        self.loading = false;
    }

    pub fn data(&self) -> Option<&DataSession> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True until a load cycle has completed with all four kinds fresh.
    pub fn is_using_fallback(&self) -> bool {
        self.data.as_ref().map_or(true, |d| d.using_fallback)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fallback;
    use crate::data::loader::{LoadError, LoadOutcome};

    fn fresh_equity() -> LoadOutcome<ScopeEquity> {
        LoadOutcome::Fresh(vec![ScopeEquity {
            scope: "Roofing".into(),
            lbe_count: 1,
            total_subs: 2,
            lbe_rate: 0.5,
            total_dollars: 1000.0,
            lbe_dollar_share: 0.4,
        }])
    }

    fn fresh_concentration() -> LoadOutcome<ScopeConcentration> {
        LoadOutcome::Fresh(vec![ScopeConcentration {
            scope: "Roofing".into(),
            hhi: 900.0,
            subcontractors: 12,
            total_spend: 1000.0,
            recorded_level: "Unconcentrated".into(),
        }])
    }

    #[test]
    fn all_fresh_clears_fallback_flag() {
        let session = DataSession::from_outcomes(
            fresh_concentration(),
            LoadOutcome::Fresh(Vec::from(fallback::dominant_subcontractors())),
            fresh_equity(),
            LoadOutcome::Fresh(Vec::from(fallback::scope_aggregation())),
        );
        assert!(!session.using_fallback);
        assert!(!session.concentration.from_fallback);
        assert_eq!(session.equity.rows[0].scope, "Roofing");
    }

    #[test]
    fn one_failed_kind_flags_fallback_but_keeps_others_fresh() {
        // A single 404 must not taint the three kinds that loaded fine.
        let session = DataSession::from_outcomes(
            fresh_concentration(),
            LoadOutcome::Fallback(LoadError::Status(reqwest::StatusCode::NOT_FOUND)),
            fresh_equity(),
            LoadOutcome::Fresh(Vec::from(fallback::scope_aggregation())),
        );

        assert!(session.using_fallback);
        // The failed kind carries its sample; the rest keep remote content.
        assert!(session.dominant.from_fallback);
        assert_eq!(session.dominant.rows, fallback::dominant_subcontractors());
        assert!(!session.concentration.from_fallback);
        assert_eq!(session.concentration.rows[0].scope, "Roofing");
        assert!(!session.equity.from_fallback);
    }

    #[test]
    fn all_failed_kinds_yield_all_samples() {
        let session = DataSession::from_outcomes(
            LoadOutcome::Fallback(LoadError::Empty),
            LoadOutcome::Fallback(LoadError::Empty),
            LoadOutcome::Fallback(LoadError::Empty),
            LoadOutcome::Fallback(LoadError::Empty),
        );

        assert!(session.using_fallback);
        assert_eq!(session.concentration.rows, fallback::market_concentration());
        assert_eq!(session.dominant.rows, fallback::dominant_subcontractors());
        assert_eq!(session.equity.rows, fallback::lbe_analysis());
        assert_eq!(session.aggregation.rows, fallback::scope_aggregation());
    }

    #[test]
    fn state_transitions_and_notices() {
        let mut state = SessionState::default();
        assert!(!state.is_loading());
        assert!(state.is_using_fallback());
        assert!(state.data().is_none());

        state.begin_load();
        assert!(state.is_loading());

        let session = DataSession::from_outcomes(
            fresh_concentration(),
            LoadOutcome::Fresh(Vec::from(fallback::dominant_subcontractors())),
            fresh_equity(),
            LoadOutcome::Fresh(Vec::from(fallback::scope_aggregation())),
        );
        state.set_session(session);

        assert!(!state.is_loading());
        assert!(!state.is_using_fallback());
        assert_eq!(state.notice(), Some("Full dataset loaded successfully"));
    }

    #[test]
    fn fallback_notice_is_distinct() {
        let mut state = SessionState::default();
        state.begin_load();
        state.set_session(DataSession::from_outcomes(
            LoadOutcome::Fallback(LoadError::Empty),
            LoadOutcome::Fresh(Vec::from(fallback::dominant_subcontractors())),
            fresh_equity(),
            LoadOutcome::Fresh(Vec::from(fallback::scope_aggregation())),
        ));
        assert_eq!(state.notice(), Some("Full dataset not found, using sample data"));
        assert!(state.is_using_fallback());
    }
}
