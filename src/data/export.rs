use std::path::Path;

use super::error::ExportError;
use super::filter::FilteredView;

/// Suggested file name for the download action.
pub const EXPORT_FILE_NAME: &str = "filtered_office_supplies.csv";

/// Serialise the view as CSV: header row, no index column, dates as
/// `YYYY-MM-DD`, quoting only where a field needs it.
pub fn to_csv(view: &FilteredView<'_>) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for rec in view.iter() {
        writer.serialize(rec)?;
    }
    // `serialize` only emits the header alongside the first row.
    if view.is_empty() {
        writer.write_record(super::model::COLUMNS)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// Write [`to_csv`] output to `path`.
pub fn write_csv(view: &FilteredView<'_>, path: &Path) -> Result<(), ExportError> {
    let bytes = to_csv(view)?;
    std::fs::write(path, &bytes)?;
    log::info!("Exported {} rows to {}", view.len(), path.display());
    Ok(())
}
