// ---------------------------------------------------------------------------
// Lossy numeric normalization
// ---------------------------------------------------------------------------

/// Coerce a raw cell into a number, the way the upstream exports encode them:
///
/// * `"1,234"` → `1234.0` (thousands separators stripped)
/// * `"14,000,000-15,000,000"` → `14000000.0` (engineer estimates arrive as
///   hyphen ranges; the lower bound is kept, the upper bound discarded)
/// * anything unparseable → `0.0`
///
/// Never fails. The zero default is lossy: a bad cell must not abort the
/// dataset, and provenance is reported in aggregate rather than per cell.
pub fn parse_numeric(raw: &str) -> f64 {
    let trimmed = raw.trim();

    let segment = match trimmed.split_once('-') {
        Some((first, _)) => first,
        None => trimmed,
    };

    segment
        .replace(',', "")
        .trim()
        .parse::<f64>()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::parse_numeric;

    #[test]
    fn strips_thousands_separators() {
        assert_eq!(parse_numeric("1,234"), 1234.0);
        assert_eq!(parse_numeric("6,909,290.5"), 6909290.5);
    }

    #[test]
    fn range_keeps_lower_bound() {
        assert_eq!(parse_numeric("14,000,000-15,000,000"), 14_000_000.0);
        assert_eq!(parse_numeric("100-200"), 100.0);
    }

    #[test]
    fn unparseable_is_zero() {
        assert_eq!(parse_numeric("abc"), 0.0);
        assert_eq!(parse_numeric(""), 0.0);
        assert_eq!(parse_numeric("$12"), 0.0);
    }

    #[test]
    fn plain_numbers_pass_through() {
        assert_eq!(parse_numeric("42"), 42.0);
        assert_eq!(parse_numeric(" 0.25 "), 0.25);
    }
}
