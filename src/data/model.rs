use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{MsiError, Result};

/// Name of the synthetic Total Ion Current channel.
pub const TIC_CHANNEL: &str = "TIC";

// ---------------------------------------------------------------------------
// Coord – one pixel position
// ---------------------------------------------------------------------------

/// Integer pixel coordinate. Orders by X first, then Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// PixelTable – the canonical parsed dataset
// ---------------------------------------------------------------------------

/// Sparse MSI table: one record of intensities per (X, Y) pixel.
///
/// Records are stored positionally, aligned with `channels`, so every
/// pixel always carries exactly the declared channel set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelTable {
    channels: Vec<String>,
    pixels: BTreeMap<Coord, Vec<f64>>,
}

impl PixelTable {
    /// An empty table declaring the given channels.
    pub fn new(channels: Vec<String>) -> Self {
        Self {
            channels,
            pixels: BTreeMap::new(),
        }
    }

    /// Ordered channel identifiers (m/z values as written in the source).
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn channel_index(&self, channel: &str) -> Option<usize> {
        self.channels.iter().position(|c| c == channel)
    }

    pub fn contains_channel(&self, channel: &str) -> bool {
        self.channel_index(channel).is_some()
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Insert or replace the record at `coord`. Returns the replaced
    /// record, if any, so callers can account for duplicates.
    pub fn insert(&mut self, coord: Coord, values: Vec<f64>) -> Result<Option<Vec<f64>>> {
        if values.len() != self.channels.len() {
            return Err(MsiError::RaggedRecord {
                expected: self.channels.len(),
                got: values.len(),
            });
        }
        Ok(self.pixels.insert(coord, values))
    }

    /// The full record for one pixel.
    pub fn record(&self, coord: Coord) -> Option<&[f64]> {
        self.pixels.get(&coord).map(Vec::as_slice)
    }

    /// Intensity of `channel` at `coord`.
    pub fn value(&self, coord: Coord, channel: &str) -> Option<f64> {
        let idx = self.channel_index(channel)?;
        self.pixels.get(&coord).map(|rec| rec[idx])
    }

    /// Iterate pixels in ascending (X, Y) order.
    pub fn pixels(&self) -> impl Iterator<Item = (Coord, &[f64])> {
        self.pixels.iter().map(|(c, rec)| (*c, rec.as_slice()))
    }

    /// One channel's intensities, paired with their coordinates.
    pub fn channel_values(&self, channel: &str) -> Result<Vec<(Coord, f64)>> {
        let idx = self
            .channel_index(channel)
            .ok_or_else(|| MsiError::ChannelNotFound(channel.to_string()))?;
        Ok(self.pixels.iter().map(|(c, rec)| (*c, rec[idx])).collect())
    }

    /// Sorted distinct X coordinates.
    pub fn unique_x(&self) -> Vec<i64> {
        let set: BTreeSet<i64> = self.pixels.keys().map(|c| c.x).collect();
        set.into_iter().collect()
    }

    /// Sorted distinct Y coordinates.
    pub fn unique_y(&self) -> Vec<i64> {
        let set: BTreeSet<i64> = self.pixels.keys().map(|c| c.y).collect();
        set.into_iter().collect()
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut Vec<f64>> {
        self.pixels.values_mut()
    }

    /// Append a channel, filling every record through `f`.
    pub(crate) fn push_channel<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(&[f64]) -> f64,
    {
        self.channels.push(name.to_string());
        for rec in self.pixels.values_mut() {
            let v = f(rec);
            rec.push(v);
        }
    }

    /// Remove the channels at `indices`. Indices must be valid.
    pub(crate) fn remove_channel_indices(&mut self, indices: &BTreeSet<usize>) {
        let keep = |i: &usize| !indices.contains(i);
        self.channels = self
            .channels
            .drain(..)
            .enumerate()
            .filter(|(i, _)| keep(i))
            .map(|(_, c)| c)
            .collect();
        for rec in self.pixels.values_mut() {
            *rec = rec
                .drain(..)
                .enumerate()
                .filter(|(i, _)| keep(i))
                .map(|(_, v)| v)
                .collect();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn table() -> PixelTable {
        let mut t = PixelTable::new(vec!["100.1".into(), "200.2".into()]);
        t.insert(Coord::new(2, 1), vec![1.0, 2.0]).unwrap();
        t.insert(Coord::new(0, 5), vec![3.0, 4.0]).unwrap();
        t.insert(Coord::new(2, 0), vec![5.0, 6.0]).unwrap();
        t
    }

    #[test]
    fn test_insert_rejects_ragged_record() {
        let mut t = table();
        let err = t.insert(Coord::new(9, 9), vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            MsiError::RaggedRecord {
                expected: 2,
                got: 1
            }
        ));
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_insert_returns_replaced() {
        let mut t = table();
        let old = t.insert(Coord::new(2, 1), vec![7.0, 8.0]).unwrap();
        assert_eq!(old, Some(vec![1.0, 2.0]));
        assert_eq!(t.value(Coord::new(2, 1), "200.2"), Some(8.0));
    }

    #[test]
    fn test_unique_axes_sorted() {
        let t = table();
        assert_eq!(t.unique_x(), vec![0, 2]);
        assert_eq!(t.unique_y(), vec![0, 1, 5]);
    }

    #[test]
    fn test_coord_display() {
        assert_eq!(Coord::new(3, -7).to_string(), "(3, -7)");
    }

    #[test]
    fn test_pixel_order() {
        let t = table();
        let coords: Vec<Coord> = t.pixels().map(|(c, _)| c).collect();
        assert_eq!(
            coords,
            vec![Coord::new(0, 5), Coord::new(2, 0), Coord::new(2, 1)]
        );
    }

    #[test]
    fn test_channel_values_unknown() {
        let t = table();
        assert!(matches!(
            t.channel_values("999.9"),
            Err(MsiError::ChannelNotFound(_))
        ));
    }

    #[test]
    fn test_remove_channel_indices() {
        let mut t = table();
        t.remove_channel_indices(&BTreeSet::from([0]));
        assert_eq!(t.channels(), &["200.2".to_string()]);
        assert_eq!(t.record(Coord::new(0, 5)), Some(&[4.0][..]));
    }
}
