use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use super::error::DataError;
use super::model::{CovidDataset, CovidRecord};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a countries-aggregated table from a local CSV file.
pub fn load_file(path: &Path) -> Result<CovidDataset, DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_csv(file)
}

/// Parse a countries-aggregated table from any reader.
///
/// Expected layout (column order is free, extra columns are ignored):
///
/// ```text
/// Date,Country,Confirmed,Recovered,Deaths
/// 2020-01-22,Afghanistan,0,0,0
/// ```
pub fn load_csv<R: Read>(reader: R) -> Result<CovidDataset, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or(DataError::MissingColumn(name))
    };
    let date_idx = column("Date")?;
    let country_idx = column("Country")?;
    let confirmed_idx = column("Confirmed")?;
    let recovered_idx = column("Recovered")?;
    let deaths_idx = column("Deaths")?;

    let mut records = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        // 1-based, counting the header line.
        let row = i + 2;

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
            DataError::BadDate {
                row,
                value: raw_date.to_string(),
            }
        })?;

        records.push(CovidRecord {
            country: record.get(country_idx).unwrap_or("").to_string(),
            date,
            confirmed: parse_count(record.get(confirmed_idx), row, "Confirmed")?,
            deaths: parse_count(record.get(deaths_idx), row, "Deaths")?,
            recovered: parse_count(record.get(recovered_idx), row, "Recovered")?,
        });
    }

    log::debug!("Parsed {} rows", records.len());
    CovidDataset::from_records(records)
}

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

/// Empty cells count as zero; `12.0` style floats are accepted.
fn parse_count(cell: Option<&str>, row: usize, column: &'static str) -> Result<i64, DataError> {
    let s = cell.unwrap_or("");
    if s.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = s.parse::<i64>() {
        return Ok(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(DataError::BadCount {
            row,
            column,
            value: s.to_string(),
        }),
    }
}
