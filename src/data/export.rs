use std::io::Write;
use std::path::Path;

use super::error::ExportError;
use super::model::CovidRecord;

/// Column order of the source table, reused for the download.
const HEADER: [&str; 5] = ["Date", "Country", "Confirmed", "Recovered", "Deaths"];

/// Write the filtered view as CSV. Returns the number of data rows.
pub fn write_csv<W: Write>(records: &[CovidRecord], writer: W) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for r in records {
        csv_writer.write_record([
            r.date.format("%Y-%m-%d").to_string(),
            r.country.clone(),
            r.confirmed.to_string(),
            r.recovered.to_string(),
            r.deaths.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(records.len())
}

/// Create (or truncate) `path` and write the view into it.
pub fn export_to_path(records: &[CovidRecord], path: &Path) -> Result<usize, ExportError> {
    let file = std::fs::File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let n = write_csv(records, std::io::BufWriter::new(file))?;
    log::info!("Exported {n} rows to {}", path.display());
    Ok(n)
}
