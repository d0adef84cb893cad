use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use crate::error::LoadError;
use crate::models::{HeaderKey, LoadConfig, NormalizedTable, RawTable};
use crate::stages::normalize;

/// Load a shelter statistics CSV file into a NormalizedTable
pub fn load(path: &Path, config: &LoadConfig) -> Result<NormalizedTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    info!("Loading shelter statistics from {:?}", path);
    let file = File::open(path).map_err(|e| LoadError::from_io(path, e))?;
    let raw = read_raw_table(file, config)?;
    let result = normalize(&raw, config)?;

    info!(
        "Loaded {} districts, {} columns ({} subtotal rows removed)",
        result.table.len(),
        result.table.columns().len(),
        result.subtotal_rows_removed
    );

    Ok(result.table)
}

/// Parse CSV text into a NormalizedTable
pub fn parse_csv_str(data: &str, config: &LoadConfig) -> Result<NormalizedTable, LoadError> {
    let raw = read_raw_table(data.as_bytes(), config)?;
    Ok(normalize(&raw, config)?.table)
}

/// Read the preamble, the two header lines and the data rows
pub fn read_raw_table<R: Read>(source: R, config: &LoadConfig) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);
    let mut records = reader.records();

    for line in 0..config.skip_rows {
        match records.next() {
            Some(record) => {
                record?;
            }
            None => {
                return Err(LoadError::MalformedHeader(format!(
                    "file ends inside the preamble at line {}",
                    line + 1
                )));
            }
        }
    }

    let outer = next_header_line(&mut records, "outer")?;
    let inner = next_header_line(&mut records, "inner")?;

    if outer.len() != inner.len() {
        return Err(LoadError::MalformedHeader(format!(
            "header lines have {} and {} columns",
            outer.len(),
            inner.len()
        )));
    }

    let header: Vec<HeaderKey> = outer
        .into_iter()
        .zip(inner)
        .map(|(o, i)| HeaderKey::new(o, i))
        .collect();
    let width = header.len();

    let mut rows = Vec::new();
    for (line_num, record) in records.enumerate() {
        let record = record?;
        if record.len() > width {
            warn!(
                "Data row {}: ignoring {} cells past the header width",
                line_num + 1,
                record.len() - width
            );
        }
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable { header, rows })
}

fn next_header_line<R: Read>(
    records: &mut csv::StringRecordsIter<'_, R>,
    which: &str,
) -> Result<Vec<String>, LoadError> {
    let record = records.next().ok_or_else(|| {
        LoadError::MalformedHeader(format!("missing {} header line", which))
    })??;

    Ok(record
        .iter()
        .map(|label| label.trim_start_matches('\u{feff}').trim().to_string())
        .collect())
}
