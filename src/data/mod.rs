/// Data layer: table model, loading, channel removal and writing.
///
/// Architecture:
/// ```text
///  instrument export (layout A) / cleaned table (layout B)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → PixelTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ PixelTable  │  (X, Y) → intensities, channel list
///   └────────────┘
///        │
///        ├──────────────► filter   drop unwanted channels
///        └──────────────► writer   cleaned copy (layout B)
/// ```

pub mod config;
pub mod filter;
pub mod loader;
pub mod model;
pub mod writer;
