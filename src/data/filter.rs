use std::collections::BTreeSet;

use super::model::{PixelTable, TIC_CHANNEL};
use crate::error::{MsiError, Result};
use crate::processing::tic::compute_tic;

// ---------------------------------------------------------------------------
// Channel removal
// ---------------------------------------------------------------------------

/// Remove the named channels from the channel list and from every record.
///
/// All identifiers are checked before anything is touched: if one of them
/// is unknown the table is left exactly as it was. A surviving `TIC`
/// channel is recomputed from the remaining channels.
pub fn drop_channels<S: AsRef<str>>(table: &mut PixelTable, identifiers: &[S]) -> Result<()> {
    let indices = resolve_channels(table, identifiers)?;
    if indices.is_empty() {
        return Ok(());
    }
    table.remove_channel_indices(&indices);
    if table.contains_channel(TIC_CHANNEL) {
        compute_tic(table);
    }
    log::info!(
        "Dropped {} channel(s) [{}]; {} remain",
        indices.len(),
        identifiers
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(", "),
        table.channels().len()
    );
    Ok(())
}

/// Owned variant of [`drop_channels`].
pub fn without_channels<S: AsRef<str>>(
    mut table: PixelTable,
    identifiers: &[S],
) -> Result<PixelTable> {
    drop_channels(&mut table, identifiers)?;
    Ok(table)
}

/// Map identifiers to channel positions, failing on the first unknown one.
fn resolve_channels<S: AsRef<str>>(
    table: &PixelTable,
    identifiers: &[S],
) -> Result<BTreeSet<usize>> {
    identifiers
        .iter()
        .map(|id| {
            let id = id.as_ref();
            table
                .channel_index(id)
                .ok_or_else(|| MsiError::UnknownChannel(id.to_string()))
        })
        .collect()
}
