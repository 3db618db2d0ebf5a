use crate::data::model::{PixelTable, TIC_CHANNEL};
use crate::error::{MsiError, Result};

// ---------------------------------------------------------------------------
// Total Ion Current
// ---------------------------------------------------------------------------

/// Add (or overwrite) the `TIC` channel with the per-pixel sum of every
/// other channel. An existing `TIC` value is never part of the sum, so
/// repeated calls give the same result.
pub fn compute_tic(table: &mut PixelTable) {
    match table.channel_index(TIC_CHANNEL) {
        Some(tic_idx) => {
            for rec in table.records_mut() {
                rec[tic_idx] = sum_excluding(rec, Some(tic_idx));
            }
        }
        None => table.push_channel(TIC_CHANNEL, |rec| sum_excluding(rec, None)),
    }
    log::debug!("Computed TIC over {} pixels", table.len());
}

fn sum_excluding(record: &[f64], skip: Option<usize>) -> f64 {
    record
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skip)
        .map(|(_, v)| *v)
        .sum()
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Divide `channel` by the pixel's TIC. Pixels with a TIC of exactly zero
/// get zero.
///
/// Only the requested channel is rewritten; use [`normalize_all`] for the
/// whole table. TIC is computed first if the table has none. An existing
/// TIC is reused as-is, so normalising the same channel twice divides it
/// twice.
pub fn normalize(table: &mut PixelTable, channel: &str) -> Result<()> {
    let idx = table
        .channel_index(channel)
        .ok_or_else(|| MsiError::ChannelNotFound(channel.to_string()))?;
    if channel == TIC_CHANNEL {
        return Err(MsiError::ReservedChannel(channel.to_string()));
    }
    let tic_idx = ensure_tic(table);

    for rec in table.records_mut() {
        rec[idx] = divide_by_tic(rec[idx], rec[tic_idx]);
    }
    log::debug!("Normalised channel {channel} by TIC");
    Ok(())
}

/// Divide every non-TIC channel by TIC.
pub fn normalize_all(table: &mut PixelTable) {
    let tic_idx = ensure_tic(table);
    for rec in table.records_mut() {
        let tic = rec[tic_idx];
        for (i, v) in rec.iter_mut().enumerate() {
            if i != tic_idx {
                *v = divide_by_tic(*v, tic);
            }
        }
    }
    log::debug!(
        "Normalised {} channels by TIC",
        table.channels().len().saturating_sub(1)
    );
}

fn ensure_tic(table: &mut PixelTable) -> usize {
    if let Some(idx) = table.channel_index(TIC_CHANNEL) {
        return idx;
    }
    compute_tic(table);
    table.channels().len() - 1
}

fn divide_by_tic(value: f64, tic: f64) -> f64 {
    if tic == 0.0 {
        0.0
    } else {
        value / tic
    }
}
