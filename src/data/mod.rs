/// Data layer: numeric normalization, decoding, loading, and fallback.
///
/// Architecture:
/// ```text
///  remote CSV resources (4 kinds)          bundled samples
///        │                                       │
///        ▼                                       │
///   ┌──────────┐                                 │
///   │  loader   │  fetch, per-kind outcome ──────┘ (on any failure)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  decode   │  delimited text → Records (numeric rule applied here)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  typed rows per kind, Dataset + provenance flag
///   └──────────┘
/// ```
///
/// Everything downstream (`metrics`, `query`) consumes finished typed rows
/// and never re-derives column semantics.
pub mod decode;
pub mod fallback;
pub mod loader;
pub mod model;
pub mod numeric;
