use csv::ReaderBuilder;
use thiserror::Error;

use super::model::{CellValue, NumericRule, Record};
use super::numeric::parse_numeric;

// ---------------------------------------------------------------------------
// Delimited-text decoding
// ---------------------------------------------------------------------------

/// Decoding failed outright. Row-level problems (a row with the wrong number
/// of fields) are *not* errors: they are logged and the row is skipped, so a
/// partially damaged file still yields every intact row.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not read header row: {0}")]
    Header(#[source] csv::Error),
    #[error("malformed delimited input: {0}")]
    Malformed(#[source] csv::Error),
}

/// Parse delimited text (header row required) into decoded [`Record`]s.
///
/// Columns matched by `rule` are piped through the numeric normalizer here,
/// at decode time, so every downstream consumer sees finished numbers for
/// those columns and never raw text. Rows whose cells are all empty are
/// skipped, as are rows the parser rejects for field-count mismatches.
pub fn decode(text: &str, rule: &NumericRule) -> Result<Vec<Record>, DecodeError> {
    let mut reader = ReaderBuilder::new().from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(DecodeError::Header)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in reader.records() {
        let row = match row {
            Ok(r) => r,
            Err(e) if matches!(e.kind(), csv::ErrorKind::UnequalLengths { .. }) => {
                log::warn!("skipping malformed row: {e}");
                dropped += 1;
                continue;
            }
            Err(e) => return Err(DecodeError::Malformed(e)),
        };

        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut record = Record::default();
        for (idx, header) in headers.iter().enumerate() {
            let raw = row.get(idx).unwrap_or("");
            let value = if rule.is_numeric(header) {
                CellValue::Number(parse_numeric(raw))
            } else {
                CellValue::Text(raw.to_string())
            };
            record.insert(header.clone(), value);
        }
        records.push(record);
    }

    if dropped > 0 {
        log::warn!("dropped {dropped} malformed rows while decoding");
    }

    Ok(records)
}
