//! Stage the bundled sample CSVs into a directory.
//!
//! Point any static file server at the output directory and the main binary
//! can exercise the full remote-load path against known data:
//!
//! ```text
//! cargo run --bin stage_samples -- data
//! python3 -m http.server 8000
//! cargo run -- --base-url http://localhost:8000/data
//! ```

use std::fs;
use std::path::Path;

const FILES: [(&str, &str); 4] = [
    (
        "market_concentration_hhi_consolidated.csv",
        include_str!("../../samples/market_concentration_hhi_consolidated.csv"),
    ),
    (
        "dominant_subcontractors_consolidated.csv",
        include_str!("../../samples/dominant_subcontractors_consolidated.csv"),
    ),
    (
        "lbe_scope_analysis_consolidated.csv",
        include_str!("../../samples/lbe_scope_analysis_consolidated.csv"),
    ),
    (
        "scope_subcontractor_aggregation_consolidated.csv",
        include_str!("../../samples/scope_subcontractor_aggregation_consolidated.csv"),
    ),
];

fn main() {
    let dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let dir = Path::new(&dir);
    fs::create_dir_all(dir).expect("Failed to create output directory");

    for (name, body) in FILES {
        let path = dir.join(name);
        fs::write(&path, body).expect("Failed to write sample file");
        println!("Wrote {}", path.display());
    }
}
