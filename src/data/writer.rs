use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use super::loader::is_index_column;
use super::model::PixelTable;
use crate::error::{MsiError, Result};

/// Write `table` in the cleaned layout: `X,Y,<channels...>`, one row per
/// pixel. `f64`'s `Display` is shortest round-trip, so reloading the
/// output reproduces the same values bit for bit.
///
/// Channel names the cleaned-layout reader would skip, trim or reject are
/// refused with [`MsiError::UnwritableChannel`] before anything is written.
pub fn write_cleaned<W: Write>(table: &PixelTable, writer: W, delimiter: u8) -> Result<()> {
    check_writable(table.channels())?;
    let mut out = WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    let mut header = vec!["X".to_string(), "Y".to_string()];
    header.extend(table.channels().iter().cloned());
    out.write_record(&header)?;

    let mut row: Vec<String> = Vec::with_capacity(header.len());
    for (coord, record) in table.pixels() {
        row.clear();
        row.push(coord.x.to_string());
        row.push(coord.y.to_string());
        row.extend(record.iter().map(|v| v.to_string()));
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}

fn check_writable(channels: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(channels.len());
    for name in channels {
        if is_index_column(name) || name.trim() != name || !seen.insert(name.as_str()) {
            return Err(MsiError::UnwritableChannel(name.clone()));
        }
    }
    Ok(())
}

pub fn write_cleaned_file(table: &PixelTable, path: &Path, delimiter: u8) -> Result<()> {
    check_writable(table.channels())?;
    let file = File::create(path)?;
    write_cleaned(table, file, delimiter)?;
    log::info!(
        "Wrote cleaned table ({} pixels) to {}",
        table.len(),
        path.display()
    );
    Ok(())
}
