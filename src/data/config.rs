use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MsiError, Result};

fn default_header_line() -> usize {
    3
}

// ---------------------------------------------------------------------------
// Layout – which raw shape the source file has
// ---------------------------------------------------------------------------

/// The two recognised raw layouts.
///
/// ```json
/// { "kind": "header_metadata", "header_line": 3, "trailing_fields": 2 }
/// { "kind": "cleaned" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    /// Instrument export: free-form metadata lines, the channel list on
    /// `header_line` (0-based), then `[index, X, Y, intensities...]` rows.
    HeaderMetadata {
        #[serde(default = "default_header_line")]
        header_line: usize,
        /// Unnamed columns at the end of each row that are discarded.
        #[serde(default)]
        trailing_fields: usize,
    },
    /// Conventional table with literal `X` and `Y` header columns.
    Cleaned,
}

impl Layout {
    pub fn default_delimiter(&self) -> char {
        match self {
            Layout::HeaderMetadata { .. } => '\t',
            Layout::Cleaned => ',',
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::HeaderMetadata {
            header_line: default_header_line(),
            trailing_fields: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// LoaderConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub layout: Layout,
    /// Field separator. Falls back to the layout's default when absent.
    #[serde(default)]
    pub delimiter: Option<char>,
}

impl LoaderConfig {
    /// Layout A with a tab delimiter and the channel list on line 3.
    pub fn header_metadata() -> Self {
        Self::default()
    }

    /// Layout B with a comma delimiter.
    pub fn cleaned() -> Self {
        Self {
            layout: Layout::Cleaned,
            delimiter: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: LoaderConfig = serde_json::from_str(text)?;
        config.delimiter_byte()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MsiError::SourceNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// The effective delimiter as a single byte, as the csv reader wants it.
    pub fn delimiter_byte(&self) -> Result<u8> {
        let c = self
            .delimiter
            .unwrap_or_else(|| self.layout.default_delimiter());
        if !c.is_ascii() || c == '\n' || c == '\r' {
            return Err(MsiError::Config(format!(
                "delimiter {c:?} must be a single ASCII character other than a line break"
            )));
        }
        Ok(c as u8)
    }
}
