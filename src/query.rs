use std::cmp::Ordering;

use crate::data::model::{
    DominantSubcontractor, ScopeAggregationRow, ScopeConcentration, ScopeEquity,
};

// ---------------------------------------------------------------------------
// Sort plumbing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// A sortable cell drawn from a row: numbers compare numerically, text
/// compares case-insensitively. Mixed comparisons put numbers first.
#[derive(Debug, Clone, Copy)]
pub enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
}

fn cmp_values(a: SortValue<'_>, b: SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(&y),
        (SortValue::Text(x), SortValue::Text(y)) => x
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(y.chars().flat_map(char::to_lowercase)),
        (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
        (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
    }
}

/// A row type's sort-key enum. Keys choose the direction applied when they
/// are first selected; ascending unless a key overrides.
pub trait SortKey: Copy + Eq {
    fn default_direction(self) -> SortDirection {
        SortDirection::Ascending
    }
}

/// A row usable by the generic view: designated search columns and a typed
/// sort key. Every presentation surface goes through this one interface.
pub trait TableRow {
    type Key: SortKey;

    fn sort_value(&self, key: Self::Key) -> SortValue<'_>;

    /// `needle` arrives lowercased and non-empty.
    fn matches_search(&self, needle: &str) -> bool;
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

// ---------------------------------------------------------------------------
// Query state and application
// ---------------------------------------------------------------------------

/// The view controls a surface holds: a search term and the current sort.
#[derive(Debug, Clone)]
pub struct QueryState<K: SortKey> {
    pub search: String,
    pub sort: Option<(K, SortDirection)>,
}

impl<K: SortKey> Default for QueryState<K> {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: None,
        }
    }
}

impl<K: SortKey> QueryState<K> {
    /// Re-selecting the active key flips direction; a new key starts at its
    /// default direction.
    pub fn toggle_sort(&mut self, key: K) {
        self.sort = Some(match self.sort {
            Some((current, direction)) if current == key => (key, direction.flip()),
            _ => (key, key.default_direction()),
        });
    }
}

/// Filter and sort `rows`, returning indices into the input slice. The input
/// is never touched; equal sort keys keep their original relative order, and
/// an empty search term filters nothing.
pub fn apply<T: TableRow>(rows: &[T], query: &QueryState<T::Key>) -> Vec<usize> {
    apply_filtered(rows, query, |_| true)
}

/// [`apply`] with an extra row predicate (e.g. the dominance threshold).
pub fn apply_filtered<T, F>(rows: &[T], query: &QueryState<T::Key>, keep: F) -> Vec<usize>
where
    T: TableRow,
    F: Fn(&T) -> bool,
{
    let needle = query.search.trim().to_lowercase();

    let mut indices: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|&(_, row)| keep(row))
        .filter(|&(_, row)| needle.is_empty() || row.matches_search(&needle))
        .map(|(i, _)| i)
        .collect();

    if let Some((key, direction)) = query.sort {
        indices.sort_by(|&a, &b| {
            let ordering = cmp_values(rows[a].sort_value(key), rows[b].sort_value(key));
            match direction {
                SortDirection::Ascending => ordering,
                // reverse() keeps Equal as Equal, so ties stay stable.
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    indices
}

// ---------------------------------------------------------------------------
// View adapters, one per dataset kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcentrationKey {
    Scope,
    Hhi,
    Subcontractors,
    TotalSpend,
}

impl SortKey for ConcentrationKey {
    fn default_direction(self) -> SortDirection {
        match self {
            // Lower HHI reads as healthier competition, so HHI starts low-first;
            // spend and firm counts start largest-first.
            ConcentrationKey::Scope | ConcentrationKey::Hhi => SortDirection::Ascending,
            ConcentrationKey::Subcontractors | ConcentrationKey::TotalSpend => {
                SortDirection::Descending
            }
        }
    }
}

impl TableRow for ScopeConcentration {
    type Key = ConcentrationKey;

    fn sort_value(&self, key: ConcentrationKey) -> SortValue<'_> {
        match key {
            ConcentrationKey::Scope => SortValue::Text(&self.scope),
            ConcentrationKey::Hhi => SortValue::Number(self.hhi),
            ConcentrationKey::Subcontractors => SortValue::Number(f64::from(self.subcontractors)),
            ConcentrationKey::TotalSpend => SortValue::Number(self.total_spend),
        }
    }

    fn matches_search(&self, needle: &str) -> bool {
        contains_ci(&self.scope, needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DominantKey {
    Firm,
    Scope,
    Amount,
    Contracts,
    Share,
    Rank,
}

impl SortKey for DominantKey {}

impl TableRow for DominantSubcontractor {
    type Key = DominantKey;

    fn sort_value(&self, key: DominantKey) -> SortValue<'_> {
        match key {
            DominantKey::Firm => SortValue::Text(&self.firm),
            DominantKey::Scope => SortValue::Text(&self.scope),
            DominantKey::Amount => SortValue::Number(self.amount),
            DominantKey::Contracts => SortValue::Number(f64::from(self.contracts)),
            DominantKey::Share => SortValue::Number(self.share_of_scope),
            DominantKey::Rank => SortValue::Number(f64::from(self.rank_in_scope)),
        }
    }

    fn matches_search(&self, needle: &str) -> bool {
        contains_ci(&self.firm, needle) || contains_ci(&self.scope, needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquityKey {
    Scope,
    LbeShare,
    LbeCount,
    TotalSubs,
    TotalDollars,
}

impl SortKey for EquityKey {
    fn default_direction(self) -> SortDirection {
        match self {
            EquityKey::Scope => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }
}

impl TableRow for ScopeEquity {
    type Key = EquityKey;

    fn sort_value(&self, key: EquityKey) -> SortValue<'_> {
        match key {
            EquityKey::Scope => SortValue::Text(&self.scope),
            EquityKey::LbeShare => SortValue::Number(self.lbe_dollar_share),
            EquityKey::LbeCount => SortValue::Number(f64::from(self.lbe_count)),
            EquityKey::TotalSubs => SortValue::Number(f64::from(self.total_subs)),
            EquityKey::TotalDollars => SortValue::Number(self.total_dollars),
        }
    }

    fn matches_search(&self, needle: &str) -> bool {
        contains_ci(&self.scope, needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationKey {
    Firm,
    Amount,
    Share,
}

impl SortKey for AggregationKey {
    fn default_direction(self) -> SortDirection {
        match self {
            AggregationKey::Firm => SortDirection::Ascending,
            AggregationKey::Amount | AggregationKey::Share => SortDirection::Descending,
        }
    }
}

impl TableRow for ScopeAggregationRow {
    type Key = AggregationKey;

    fn sort_value(&self, key: AggregationKey) -> SortValue<'_> {
        match key {
            AggregationKey::Firm => SortValue::Text(&self.firm),
            AggregationKey::Amount => SortValue::Number(self.amount),
            AggregationKey::Share => SortValue::Number(self.share_of_scope),
        }
    }

    fn matches_search(&self, needle: &str) -> bool {
        contains_ci(&self.firm, needle)
    }
}
