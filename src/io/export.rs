//! CSV export for simulation samples.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::SimulationState;

/// Exports samples to a CSV file at the given path.
///
/// Writes the record-key header followed by one rounded row per sample.
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(series: &[SimulationState], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(series, buf)
}

/// Writes samples as CSV to any writer.
///
/// Columns follow [`SimulationState::FIELD_NAMES`]. Values are the
/// presentation copy from [`SimulationState::rounded`].
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(series: &[SimulationState], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(SimulationState::FIELD_NAMES)?;

    for s in series {
        let r = s.rounded();
        let mut row = Vec::with_capacity(SimulationState::FIELD_NAMES.len());
        row.push(r.time.to_string());
        row.extend(r.numeric_fields().iter().map(|(_, v)| v.to_string()));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
