use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::decode::{decode, DecodeError};
use super::model::{
    Dataset, DatasetRow, DominantSubcontractor, ScopeAggregationRow, ScopeConcentration,
    ScopeEquity,
};
use crate::session::DataSession;

// ---------------------------------------------------------------------------
// Per-kind load results
// ---------------------------------------------------------------------------

/// Why a dataset kind fell back to its bundled sample. None of these ever
/// propagate past the kind they occurred in.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// An empty remote file is indistinguishable from "not deployed".
    #[error("resource decoded to zero rows")]
    Empty,
}

/// The settled result of one kind's load attempt. Failures are values, not
/// exceptions: the session reducer turns these into datasets and the single
/// aggregate provenance flag.
#[derive(Debug)]
pub enum LoadOutcome<T> {
    Fresh(Vec<T>),
    Fallback(LoadError),
}

impl<T: DatasetRow> LoadOutcome<T> {
    pub fn fell_back(&self) -> bool {
        matches!(self, LoadOutcome::Fallback(_))
    }

    /// Resolve into a dataset, substituting the kind's pinned sample rows
    /// when the load failed.
    pub fn into_dataset(self) -> Dataset<T> {
        match self {
            LoadOutcome::Fresh(rows) => Dataset {
                rows,
                from_fallback: false,
            },
            LoadOutcome::Fallback(_) => Dataset {
                rows: T::fallback().to_vec(),
                from_fallback: true,
            },
        }
    }
}

/// Decode a fetched body into typed rows for one kind. Zero decoded rows is
/// a failure: the caller treats it exactly like an unreachable resource.
pub fn decode_rows<T: DatasetRow>(text: &str) -> Result<Vec<T>, LoadError> {
    let records = decode(text, T::KIND.numeric_rule())?;
    if records.is_empty() {
        return Err(LoadError::Empty);
    }
    let rows: Vec<T> = records.iter().map(T::from_record).collect();
    T::audit(&rows);
    Ok(rows)
}

// ---------------------------------------------------------------------------
// DataLoader – fetch all four kinds, independently and concurrently
// ---------------------------------------------------------------------------

/// Fetches the four dataset resources under one base URL. Kinds load
/// concurrently and independently: one failing cannot affect another, and
/// the session only exists once all four have settled.
pub struct DataLoader {
    client: Client,
    base_url: String,
}

impl DataLoader {
    pub fn new(base_url: impl Into<String>) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("marketlens/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// One full load cycle. Never fails: every kind settles as either fresh
    /// rows or its fallback sample. A reload is simply another call.
    pub async fn load_session(&self) -> DataSession {
        let (concentration, dominant, equity, aggregation) = tokio::join!(
            self.load_kind::<ScopeConcentration>(),
            self.load_kind::<DominantSubcontractor>(),
            self.load_kind::<ScopeEquity>(),
            self.load_kind::<ScopeAggregationRow>(),
        );
        DataSession::from_outcomes(concentration, dominant, equity, aggregation)
    }

    async fn load_kind<T: DatasetRow>(&self) -> LoadOutcome<T> {
        match self.fetch_rows::<T>().await {
            Ok(rows) => {
                log::info!("{}: loaded {} rows", T::KIND, rows.len());
                LoadOutcome::Fresh(rows)
            }
            Err(err) => {
                log::warn!("{}: {err}; using bundled sample", T::KIND);
                LoadOutcome::Fallback(err)
            }
        }
    }

    async fn fetch_rows<T: DatasetRow>(&self) -> Result<Vec<T>, LoadError> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            T::KIND.file_name()
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(LoadError::Status(response.status()));
        }
        let body = response.text().await?;
        decode_rows::<T>(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fallback;
    use crate::data::model::{ScopeConcentration, ScopeEquity};

    #[test]
    fn decode_rows_rejects_empty_bodies() {
        let result = decode_rows::<ScopeConcentration>("ScopeOfWork,ScopeHHI\n");
        assert!(matches!(result, Err(LoadError::Empty)));
    }

    #[test]
    fn decode_rows_produces_typed_rows() {
        let body = "ScopeOfWork,ScopeHHI,NumSubcontractors,ScopeTotalSub,ConcentrationLevel\n\
                    Roofing,1200,14,\"2,500,000\",Unconcentrated\n";
        let rows = decode_rows::<ScopeConcentration>(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_spend, 2_500_000.0);
        assert_eq!(rows[0].recorded_level, "Unconcentrated");
    }

    #[test]
    fn fresh_outcome_keeps_remote_rows() {
        let rows = vec![ScopeEquity {
            scope: "Roofing".into(),
            lbe_count: 2,
            total_subs: 4,
            lbe_rate: 0.5,
            total_dollars: 100.0,
            lbe_dollar_share: 0.5,
        }];
        let dataset = LoadOutcome::Fresh(rows.clone()).into_dataset();
        assert!(!dataset.from_fallback);
        assert_eq!(dataset.rows, rows);
    }

    #[test]
    fn fallback_outcome_substitutes_sample_rows() {
        let dataset = LoadOutcome::<ScopeEquity>::Fallback(LoadError::Empty).into_dataset();
        assert!(dataset.from_fallback);
        assert_eq!(dataset.rows, fallback::lbe_analysis());
    }
}
