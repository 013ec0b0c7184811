// ---------------------------------------------------------------------------
// Display formatting for currency and percentages
// ---------------------------------------------------------------------------

/// Compact currency: `$237.9M`, `$426K`, `$950`. Non-finite input renders
/// as `$0` rather than leaking NaN into a report.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    if amount >= 1_000_000.0 {
        format!("${:.1}M", amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("${:.0}K", amount / 1_000.0)
    } else {
        format!("${amount}")
    }
}

/// Fraction as a percentage with one decimal: `0.475` → `47.5%`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0.0%".to_string();
    }
    format!("{:.1}%", value * 100.0)
}
