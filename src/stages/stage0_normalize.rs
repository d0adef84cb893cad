use tracing::{debug, warn};

use crate::error::LoadError;
use crate::models::{Column, ColumnKind, LoadConfig, NormalizedTable, RawTable, Value};

/// Result of Stage 0 normalization
#[derive(Debug)]
pub struct NormalizationResult {
    /// The normalized table
    pub table: NormalizedTable,
    /// Rows dropped because their district was a subtotal marker
    pub subtotal_rows_removed: usize,
    /// Count cells that were missing or unparsable and became 0
    pub cells_zeroed: usize,
}

/// Perform Stage 0: flatten the header, coerce counts, drop subtotals
///
/// This stage:
/// 1. Flattens every (outer, inner) header key into one column name
/// 2. Coerces every non-label column to a non-negative integer, zero on failure
/// 3. Removes rows whose district is a subtotal marker
pub fn normalize(raw: &RawTable, config: &LoadConfig) -> Result<NormalizationResult, LoadError> {
    let columns = flatten_header(raw, config);

    let district_column = columns
        .iter()
        .position(|c| c.name == config.district_column)
        .ok_or_else(|| {
            LoadError::MalformedHeader(format!(
                "district column '{}' not found in [{}]",
                config.district_column,
                columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

    let mut rows = Vec::with_capacity(raw.rows.len());
    let mut subtotal_rows_removed = 0;
    let mut cells_zeroed = 0;

    for raw_row in &raw.rows {
        let district = raw_row.get(district_column).map(String::as_str).unwrap_or("");
        if config.is_subtotal(district) {
            subtotal_rows_removed += 1;
            continue;
        }

        let row: Vec<Value> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let cell = raw_row.get(i).map(String::as_str).unwrap_or("");
                match column.kind {
                    ColumnKind::Label => Value::Label(cell.trim().to_string()),
                    ColumnKind::Count => Value::Count(parse_count(cell).unwrap_or_else(|| {
                        cells_zeroed += 1;
                        0
                    })),
                }
            })
            .collect();
        rows.push(row);
    }

    debug!(
        "Normalized {} rows ({} subtotal rows removed, {} cells zeroed)",
        rows.len(),
        subtotal_rows_removed,
        cells_zeroed
    );

    Ok(NormalizationResult {
        table: NormalizedTable::new(columns, rows, district_column),
        subtotal_rows_removed,
        cells_zeroed,
    })
}

/// Flatten the hierarchical header into typed columns
fn flatten_header(raw: &RawTable, config: &LoadConfig) -> Vec<Column> {
    let columns: Vec<Column> = raw
        .header
        .iter()
        .map(|key| {
            let name = key.flatten();
            let kind = if config.is_label_column(&name) {
                ColumnKind::Label
            } else {
                ColumnKind::Count
            };
            Column { name, kind }
        })
        .collect();

    for (i, column) in columns.iter().enumerate() {
        if columns[..i].iter().any(|c| c.name == column.name) {
            warn!("Duplicate column name '{}' at position {}", column.name, i);
        }
    }

    columns
}

/// Parse a count cell with integer semantics
///
/// Fractions truncate toward zero and negatives clamp to zero. Returns
/// `None` for blank or non-numeric text ("-", "N/A") and for values too
/// large for a `u64` ("1e20"), which callers replace with zero.
pub fn parse_count(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(n) = cell.parse::<u64>() {
        return Some(n);
    }
    if let Ok(n) = cell.parse::<i64>() {
        return Some(n.max(0) as u64);
    }
    match cell.parse::<f64>() {
        Ok(f) if f.is_finite() && f < u64::MAX as f64 => {
            Some(if f <= 0.0 { 0 } else { f.trunc() as u64 })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HeaderKey;

    fn raw(header: &[(&str, &str)], rows: &[&[&str]]) -> RawTable {
        RawTable {
            header: header.iter().map(|(o, i)| HeaderKey::new(*o, *i)).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn shelter_raw() -> RawTable {
        raw(
            &[
                ("자치구별", "자치구별"),
                ("Unnamed: 1", "자치구별(2)"),
                ("소계", "소계"),
                ("개", "소계"),
                ("고양이", "소계"),
            ],
            &[
                &["합계", "소계", "40", "25", "15"],
                &["서울시", "종로구", "12", "-", "5"],
                &["서울시", "중구", "28", "20", "10.9"],
            ],
        )
    }

    #[test]
    fn test_header_flattening() {
        let result = normalize(&shelter_raw(), &LoadConfig::default()).unwrap();
        assert_eq!(
            result.table.column_names(),
            vec!["자치구별", "자치구별(2)", "소계", "개_소계", "고양이_소계"]
        );
        assert_eq!(result.table.columns()[0].kind, ColumnKind::Label);
        assert_eq!(result.table.columns()[1].kind, ColumnKind::Label);
        assert_eq!(result.table.columns()[3].kind, ColumnKind::Count);
    }

    #[test]
    fn test_subtotal_rows_removed() {
        let result = normalize(&shelter_raw(), &LoadConfig::default()).unwrap();

        assert_eq!(result.subtotal_rows_removed, 1);
        assert_eq!(result.table.len(), 2);
        for i in 0..result.table.len() {
            assert_ne!(result.table.district(i), Some("소계"));
        }
        assert_eq!(result.table.district(0), Some("종로구"));
    }

    #[test]
    fn test_dash_coerces_to_zero() {
        let result = normalize(&shelter_raw(), &LoadConfig::default()).unwrap();

        assert_eq!(result.table.get(0, "개_소계"), Some(&Value::Count(0)));
        assert_eq!(result.table.get(1, "고양이_소계"), Some(&Value::Count(10)));
        assert_eq!(result.cells_zeroed, 1);
    }

    #[test]
    fn test_missing_district_column() {
        let table = raw(&[("소계", "소계")], &[&["3"]]);
        let err = normalize(&table, &LoadConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedHeader(_)));
    }

    #[test]
    fn test_renormalize_is_idempotent() {
        let config = LoadConfig::default();
        let first = normalize(&shelter_raw(), &config).unwrap();
        let second = normalize(&first.table.to_raw(), &config).unwrap();

        assert_eq!(second.subtotal_rows_removed, 0);
        assert_eq!(second.cells_zeroed, 0);
        assert_eq!(second.table, first.table);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count(" 7 "), Some(7));
        assert_eq!(parse_count("3.99"), Some(3));
        assert_eq!(parse_count("-5"), Some(0));
        assert_eq!(parse_count("-"), None);
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("N/A"), None);
        assert_eq!(parse_count("NaN"), None);
        assert_eq!(parse_count("1,234"), None);
        assert_eq!(parse_count("1e3"), Some(1000));
        assert_eq!(parse_count("1e20"), None);
        assert_eq!(parse_count("99999999999999999999"), None);
        assert_eq!(parse_count("18446744073709551615"), Some(u64::MAX));
    }
}
