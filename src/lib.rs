//! Market-structure insights for contract award data.
//!
//! The pipeline fetches four tabular dataset kinds, substitutes bundled
//! samples when a resource is missing or malformed, derives concentration /
//! equity / dominance metrics, and serves stateless filter/sort views to
//! presentation surfaces.

/// Decoding, loading, and fallback substitution.
pub mod data;
/// Currency and percentage display helpers.
pub mod format;
/// Pure derivations over loaded datasets.
pub mod metrics;
/// Generic filter/sort/search views.
pub mod query;
/// Per-cycle session snapshot and the presentation-facing read API.
pub mod session;
