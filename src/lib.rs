//! Mass-spectrometry imaging tables: parse instrument exports into a
//! sparse pixel table, normalise an m/z channel by Total Ion Current and
//! reshape it into a dense grid for an external renderer.
//!
//! ```no_run
//! use std::path::Path;
//! use msi_grid::{ChannelProcessor, LoaderConfig, TableLoader};
//!
//! # fn main() -> msi_grid::Result<()> {
//! let mut table = TableLoader::new(LoaderConfig::header_metadata())
//!     .load(Path::new("example.txt"))?;
//! let grid = ChannelProcessor::new("123.456").process(&mut table)?;
//! println!("{} x {}", grid.shape().0, grid.shape().1);
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod processing;
pub mod render;

pub use data::config::{Layout, LoaderConfig};
pub use data::filter::{drop_channels, without_channels};
pub use data::loader::{load_file, TableLoader};
pub use data::model::{Coord, PixelTable, TIC_CHANNEL};
pub use data::writer::{write_cleaned, write_cleaned_file};
pub use error::{MsiError, Result};
pub use processing::{
    compute_tic, normalize, normalize_all, to_grid, ChannelProcessor, Grid, NormalizeScope,
};
pub use render::{render_all, Renderer};
