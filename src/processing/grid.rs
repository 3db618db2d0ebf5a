use std::collections::BTreeSet;

use crate::data::model::PixelTable;
use crate::error::{MsiError, Result};

// ---------------------------------------------------------------------------
// Grid – dense reconstruction of one channel
// ---------------------------------------------------------------------------

/// Dense `rows × cols` image of one channel, rows following the sorted
/// distinct Y values and columns the sorted distinct X values.
///
/// Pixels absent from the source table hold [`Grid::MISSING`]. Row 0 is the
/// smallest Y, which imaging software conventionally draws at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    channel: String,
    x_axis: Vec<i64>,
    y_axis: Vec<i64>,
    /// Row-major, `y_axis.len() * x_axis.len()` cells.
    cells: Vec<Option<f64>>,
}

impl Grid {
    /// Sentinel for cells with no observed pixel.
    pub const MISSING: Option<f64> = None;

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Sorted distinct X values (column labels).
    pub fn x_axis(&self) -> &[i64] {
        &self.x_axis
    }

    /// Distinct Y values (row labels), ascending unless flipped.
    pub fn y_axis(&self) -> &[i64] {
        &self.y_axis
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.y_axis.len(), self.x_axis.len())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell by position. Out-of-range positions return `MISSING`.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let (rows, cols) = self.shape();
        if row >= rows || col >= cols {
            return Self::MISSING;
        }
        self.cells[row * cols + col]
    }

    /// Cell by coordinate. Coordinates outside the axes return `MISSING`.
    pub fn at(&self, x: i64, y: i64) -> Option<f64> {
        let col = self.x_axis.iter().position(|&v| v == x)?;
        let row = self.y_axis.iter().position(|&v| v == y)?;
        self.get(row, col)
    }

    /// Iterate rows in Y order.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        // chunks() panics on 0, and an empty grid has no rows anyway.
        self.cells.chunks(self.x_axis.len().max(1))
    }

    /// Plain numeric matrix with missing cells replaced by `fill`
    /// (typically `f64::NAN` for plotting libraries).
    pub fn to_dense(&self, fill: f64) -> Vec<Vec<f64>> {
        self.rows()
            .map(|row| row.iter().map(|c| c.unwrap_or(fill)).collect())
            .collect()
    }

    /// Copy with rows and Y labels reversed, for renderers whose origin is
    /// at the bottom left.
    pub fn flipped_y(&self) -> Grid {
        let mut y_axis = self.y_axis.clone();
        y_axis.reverse();
        let cells = self
            .cells
            .chunks(self.x_axis.len().max(1))
            .rev()
            .flatten()
            .copied()
            .collect();
        Grid {
            channel: self.channel.clone(),
            x_axis: self.x_axis.clone(),
            y_axis,
            cells,
        }
    }
}

/// Reshape `channel` of `table` into a [`Grid`].
///
/// Gaps in the coordinates are not interpolated: the grid spans exactly the
/// distinct X and Y values that occur, and unobserved combinations stay
/// missing. An empty table yields a 0×0 grid.
pub fn to_grid(table: &PixelTable, channel: &str) -> Result<Grid> {
    let idx = table
        .channel_index(channel)
        .ok_or_else(|| MsiError::ChannelNotFound(channel.to_string()))?;

    let mut xs = BTreeSet::new();
    let mut ys = BTreeSet::new();
    for (coord, _) in table.pixels() {
        xs.insert(coord.x);
        ys.insert(coord.y);
    }
    let x_axis: Vec<i64> = xs.into_iter().collect();
    let y_axis: Vec<i64> = ys.into_iter().collect();

    let cols = x_axis.len();
    let mut cells = vec![Grid::MISSING; y_axis.len() * cols];
    for (coord, rec) in table.pixels() {
        // Both searches succeed: the axes were built from these coordinates.
        if let (Ok(col), Ok(row)) = (
            x_axis.binary_search(&coord.x),
            y_axis.binary_search(&coord.y),
        ) {
            cells[row * cols + col] = Some(rec[idx]);
        }
    }

    let filled = table.len();
    if filled < cells.len() {
        log::debug!(
            "Grid for {channel}: {} of {} cells have no pixel",
            cells.len() - filled,
            cells.len()
        );
    }

    Ok(Grid {
        channel: channel.to_string(),
        x_axis,
        y_axis,
        cells,
    })
}
