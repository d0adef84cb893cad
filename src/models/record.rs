use serde::{Deserialize, Serialize};

use super::{ColumnKind, NormalizedTable, Value};
use crate::error::LoadError;

/// Flat column holding the total intake per district
pub const TOTAL_COLUMN: &str = "소계";
/// Flat column holding the dog subtotal
pub const DOG_COLUMN: &str = "개_소계";
/// Flat column holding the cat subtotal
pub const CAT_COLUMN: &str = "고양이_소계";

/// One district's intake counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictRecord {
    pub district: String,
    pub total: u64,
    pub dogs: u64,
    pub cats: u64,
}

impl DistrictRecord {
    /// Extract typed records, validating the required columns once
    pub fn from_table(table: &NormalizedTable) -> Result<Vec<DistrictRecord>, LoadError> {
        let total = count_column(table, TOTAL_COLUMN)?;
        let dogs = count_column(table, DOG_COLUMN)?;
        let cats = count_column(table, CAT_COLUMN)?;

        Ok(table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| DistrictRecord {
                district: table.district(i).unwrap_or_default().to_string(),
                total: count_at(row, total),
                dogs: count_at(row, dogs),
                cats: count_at(row, cats),
            })
            .collect())
    }
}

fn count_at(row: &[Value], col: usize) -> u64 {
    row.get(col).and_then(Value::as_count).unwrap_or(0)
}

fn count_column(table: &NormalizedTable, name: &str) -> Result<usize, LoadError> {
    let idx = table
        .column_index(name)
        .ok_or_else(|| LoadError::MalformedHeader(format!("missing column '{}'", name)))?;
    if table.columns()[idx].kind != ColumnKind::Count {
        return Err(LoadError::MalformedHeader(format!(
            "column '{}' is not a count column",
            name
        )));
    }
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_csv_str;
    use crate::models::LoadConfig;

    #[test]
    fn test_records_from_table() {
        let csv = "자치구별(1),자치구별(2),소계,개,고양이\n\
                   자치구별(1),자치구별(2),소계,소계,소계\n\
                   서울시,종로구,10,6,4\n\
                   서울시,중구,7,2,5\n";
        let table = parse_csv_str(csv, &LoadConfig::default()).unwrap();
        let records = DistrictRecord::from_table(&table).unwrap();

        assert_eq!(
            records[1],
            DistrictRecord {
                district: "중구".to_string(),
                total: 7,
                dogs: 2,
                cats: 5,
            }
        );
    }

    #[test]
    fn test_missing_column_fails_fast() {
        let csv = "자치구별(1),자치구별(2),소계,개\n\
                   자치구별(1),자치구별(2),소계,소계\n\
                   서울시,종로구,10,6\n";
        let table = parse_csv_str(csv, &LoadConfig::default()).unwrap();
        let err = DistrictRecord::from_table(&table).unwrap_err();

        assert!(matches!(err, LoadError::MalformedHeader(msg) if msg.contains(CAT_COLUMN)));
    }
}
