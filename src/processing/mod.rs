//! Channel processing: TIC, normalisation and reshaping to a grid.

pub mod grid;
pub mod tic;

use crate::data::model::PixelTable;
use crate::error::{MsiError, Result};

pub use grid::{to_grid, Grid};
pub use tic::{compute_tic, normalize, normalize_all};

/// Which channels a normalisation pass rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeScope {
    /// Only the selected channel. Cheap, and what a single image needs.
    #[default]
    Selected,
    /// Every channel in the table.
    All,
}

/// A selected m/z channel plus how to normalise it before reshaping.
#[derive(Debug, Clone)]
pub struct ChannelProcessor {
    channel: String,
    scope: NormalizeScope,
}

impl ChannelProcessor {
    pub fn new<S: Into<String>>(channel: S) -> Self {
        Self {
            channel: channel.into(),
            scope: NormalizeScope::default(),
        }
    }

    pub fn with_scope(mut self, scope: NormalizeScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Normalise `table` by TIC and reshape the selected channel.
    ///
    /// The channel is checked before anything is written, so a bad
    /// selection leaves `table` untouched.
    pub fn process(&self, table: &mut PixelTable) -> Result<Grid> {
        if !table.contains_channel(&self.channel) {
            return Err(MsiError::ChannelNotFound(self.channel.clone()));
        }
        match self.scope {
            NormalizeScope::Selected => normalize(table, &self.channel)?,
            NormalizeScope::All => normalize_all(table),
        }
        to_grid(table, &self.channel)
    }
}
