use serde::Serialize;

use super::HeaderKey;

/// Configuration for loading and normalizing a shelter statistics file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    /// Preamble lines (titles, notes) before the two header lines
    pub skip_rows: usize,
    /// Substring identifying label columns; these are never coerced
    pub label_marker: String,
    /// Flat name of the column holding the district name
    pub district_column: String,
    /// District values marking subtotal rows
    pub subtotal_markers: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            label_marker: "자치구별".to_string(),
            district_column: "자치구별(2)".to_string(),
            subtotal_markers: vec!["소계".to_string(), "Subtotal".to_string()],
        }
    }
}

impl LoadConfig {
    /// Whether a district value marks a subtotal row
    pub fn is_subtotal(&self, district: &str) -> bool {
        let district = district.trim();
        self.subtotal_markers.iter().any(|m| m == district)
    }

    /// Whether a flat column name holds labels rather than counts
    pub fn is_label_column(&self, name: &str) -> bool {
        name.contains(&self.label_marker) || name == self.district_column
    }
}

/// Table as read from disk: hierarchical header plus untyped cells
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// One key per column, in file order
    pub header: Vec<HeaderKey>,
    /// Data rows, each padded or cut to the header width
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Text column (district names)
    Label,
    /// Non-negative integer column
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// A normalized cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Count(u64),
    Label(String),
}

impl Value {
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Value::Count(n) => Some(*n),
            Value::Label(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            Value::Label(s) => Some(s),
            Value::Count(_) => None,
        }
    }

    fn to_cell(&self) -> String {
        match self {
            Value::Count(n) => n.to_string(),
            Value::Label(s) => s.clone(),
        }
    }
}

/// Sum counts, pinning at `u64::MAX` instead of overflowing
pub fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

/// Table with flat column names and integer counts
///
/// Only built by normalization, which validates the district column.
/// Never mutated after construction; filtering builds a new table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTable {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
    district_column: usize,
}

impl NormalizedTable {
    pub(crate) fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>, district_column: usize) -> Self {
        Self {
            columns,
            rows,
            district_column,
        }
    }

    /// A table with the same columns and a different row set
    pub(crate) fn with_rows(&self, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
            district_column: self.district_column,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Index of the first column with this flat name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a cell by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }

    /// District name of a row
    pub fn district(&self, row: usize) -> Option<&str> {
        self.rows.get(row)?.get(self.district_column)?.as_label()
    }

    pub fn district_column_name(&self) -> Option<&str> {
        self.columns
            .get(self.district_column)
            .map(|c| c.name.as_str())
    }

    /// Sum of a count column over all rows, `None` if absent or a label column
    pub fn column_sum(&self, column: &str) -> Option<u64> {
        let col = self.column_index(column)?;
        if self.columns[col].kind != ColumnKind::Count {
            return None;
        }
        Some(saturating_sum(
            self.rows
                .iter()
                .filter_map(|r| r.get(col).and_then(Value::as_count)),
        ))
    }

    /// Re-express as a raw table with a single-level header, each column
    /// keyed `(name, name)`, so it can be fed back through normalization
    pub fn to_raw(&self) -> RawTable {
        RawTable {
            header: self
                .columns
                .iter()
                .map(|c| HeaderKey::new(c.name.clone(), c.name.clone()))
                .collect(),
            rows: self
                .rows
                .iter()
                .map(|r| r.iter().map(Value::to_cell).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NormalizedTable {
        NormalizedTable::new(
            vec![
                Column {
                    name: "자치구별(2)".to_string(),
                    kind: ColumnKind::Label,
                },
                Column {
                    name: "소계".to_string(),
                    kind: ColumnKind::Count,
                },
            ],
            vec![
                vec![Value::Label("종로구".to_string()), Value::Count(12)],
                vec![Value::Label("중구".to_string()), Value::Count(30)],
            ],
            0,
        )
    }

    #[test]
    fn test_subtotal_markers() {
        let config = LoadConfig::default();
        assert!(config.is_subtotal("소계"));
        assert!(config.is_subtotal(" Subtotal "));
        assert!(!config.is_subtotal("종로구"));
    }

    #[test]
    fn test_column_sum() {
        let table = sample();
        assert_eq!(table.column_sum("소계"), Some(42));
        assert_eq!(table.column_sum("자치구별(2)"), None);
        assert_eq!(table.column_sum("없음"), None);
    }

    #[test]
    fn test_column_sum_saturates() {
        let table = sample().with_rows(vec![
            vec![Value::Label("종로구".to_string()), Value::Count(u64::MAX)],
            vec![Value::Label("중구".to_string()), Value::Count(5)],
        ]);
        assert_eq!(table.column_sum("소계"), Some(u64::MAX));
        assert_eq!(saturating_sum([1u64, 2, 3].into_iter()), 6);
    }

    #[test]
    fn test_lookup_by_name() {
        let table = sample();
        assert_eq!(table.district(1), Some("중구"));
        assert_eq!(table.get(0, "소계"), Some(&Value::Count(12)));
        assert_eq!(table.district_column_name(), Some("자치구별(2)"));

        let empty = NormalizedTable::new(Vec::new(), Vec::new(), 3);
        assert_eq!(empty.district_column_name(), None);
        assert_eq!(empty.district(0), None);
    }

    #[test]
    fn test_to_raw_single_level_header() {
        let raw = sample().to_raw();
        assert_eq!(raw.header[1], HeaderKey::new("소계", "소계"));
        assert_eq!(raw.rows[1], vec!["중구".to_string(), "30".to_string()]);
    }
}
