use std::path::Path;

use super::error::ExportResult;
use super::filter::FilteredView;

/// Suggested file name for a downloaded export.
pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";

/// MIME type of an export.
pub const EXPORT_MIME: &str = "text/csv";

/// Serialize a view as UTF-8 CSV: the source columns in source order, then
/// `Sales`, one row per record. Dates use the load format so the output can
/// be loaded again.
pub fn to_csv_bytes(view: &FilteredView) -> ExportResult<Vec<u8>> {
    let dataset = view.dataset();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(dataset.export_columns())?;

    for tx in view.iter() {
        writer.write_record(dataset.export_row(tx))?;
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Write the CSV export of a view to `path`.
pub fn write_csv(view: &FilteredView, path: &Path) -> ExportResult<()> {
    let bytes = to_csv_bytes(view)?;
    std::fs::write(path, bytes)?;
    log::info!("Exported {} rows to {}", view.len(), path.display());
    Ok(())
}
