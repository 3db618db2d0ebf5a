use std::collections::HashSet;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::config::{Layout, LoaderConfig};
use super::model::{Coord, PixelTable};
use crate::error::{MsiError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parses raw MSI exports into a [`PixelTable`] according to a [`LoaderConfig`].
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    config: LoaderConfig,
}

impl TableLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Read the whole file, then parse it. The file is closed before
    /// parsing starts, whatever the outcome.
    pub fn load(&self, path: &Path) -> Result<PixelTable> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => MsiError::SourceNotFound(path.to_path_buf()),
            _ => MsiError::Io(e),
        })?;
        let table = self.load_str(&text)?;
        log::info!(
            "Loaded {}: {} pixels x {} channels",
            path.display(),
            table.len(),
            table.channels().len()
        );
        Ok(table)
    }

    /// Parse an in-memory export.
    pub fn load_str(&self, text: &str) -> Result<PixelTable> {
        let delimiter = self.config.delimiter_byte()?;
        match self.config.layout {
            Layout::HeaderMetadata {
                header_line,
                trailing_fields,
            } => load_header_metadata(text, delimiter, header_line, trailing_fields),
            Layout::Cleaned => load_cleaned(text, delimiter),
        }
    }
}

/// Shorthand for `TableLoader::new(config).load(path)`.
pub fn load_file(path: &Path, config: LoaderConfig) -> Result<PixelTable> {
    TableLoader::new(config).load(path)
}

// ---------------------------------------------------------------------------
// Layout A: metadata lines, channel header line, positional rows
// ---------------------------------------------------------------------------

/// Layout:
/// ```text
/// <metadata>
/// <metadata>
/// <metadata>
/// 123.456\t255.233\t...          <- header_line
/// 0\t0\t0\t100.0\t50.0\t...        <- index, X, Y, intensities
/// ```
fn load_header_metadata(
    text: &str,
    delimiter: u8,
    header_line: usize,
    trailing_fields: usize,
) -> Result<PixelTable> {
    let mut lines = text.split_inclusive('\n');
    let mut offset = 0;
    for _ in 0..header_line {
        let line = lines.next().ok_or_else(|| {
            MsiError::MalformedHeader(format!(
                "expected the channel list on line {header_line}, but the file has only {} lines",
                text.lines().count()
            ))
        })?;
        offset += line.len();
    }
    let header = lines.next().ok_or_else(|| {
        MsiError::MalformedHeader(format!("line {header_line} with the channel list is missing"))
    })?;
    offset += header.len();

    let channels = parse_channel_header(header, delimiter)?;
    let width = 3 + channels.len();
    let mut table = PixelTable::new(channels);

    // Body line numbers are relative to the slice; shift them to file lines.
    let line_shift = header_line as u64 + 1;
    let mut reader = positional_reader(text[offset..].as_bytes(), delimiter);

    let mut duplicates = Duplicates::default();
    for result in reader.records() {
        let record = result.map_err(|e| csv_row_error(e, line_shift))?;
        let row = line_shift + record.position().map(|p| p.line()).unwrap_or(0);

        let mut fields: Vec<&str> = record.iter().collect();
        while fields.last() == Some(&"") {
            fields.pop();
        }
        if fields.is_empty() {
            continue;
        }
        if fields.len() == width + trailing_fields && trailing_fields > 0 {
            fields.truncate(width);
        }
        if fields.len() != width {
            return Err(MsiError::malformed_row(
                row,
                format!("expected {width} fields, found {}", fields.len()),
            ));
        }

        parse_float(fields[0], row, "index")?;
        let coord = Coord::new(
            parse_coordinate(fields[1], row, "X")?,
            parse_coordinate(fields[2], row, "Y")?,
        );
        let values = fields[3..]
            .iter()
            .map(|f| parse_float(f, row, "intensity"))
            .collect::<Result<Vec<f64>>>()?;

        if table.insert(coord, values)?.is_some() {
            duplicates.record(coord);
        }
    }

    duplicates.warn();
    Ok(table)
}

/// Headerless, quote-aware reader shared by the channel line and the body.
fn positional_reader(input: &[u8], delimiter: u8) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input)
}

fn parse_channel_header(line: &str, delimiter: u8) -> Result<Vec<String>> {
    let mut reader = positional_reader(line.as_bytes(), delimiter);
    let mut record = StringRecord::new();
    let found = reader
        .read_record(&mut record)
        .map_err(|e| MsiError::MalformedHeader(e.to_string()))?;
    let mut names: Vec<String> = if found {
        record.iter().map(str::to_string).collect()
    } else {
        Vec::new()
    };
    while names.last().is_some_and(|s| s.is_empty()) {
        names.pop();
    }
    if names.is_empty() {
        return Err(MsiError::MalformedHeader(
            "channel list line is empty".to_string(),
        ));
    }
    check_channel_names(&names)?;
    Ok(names)
}

fn check_channel_names(names: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        if name.is_empty() {
            return Err(MsiError::MalformedHeader(format!(
                "channel identifier #{i} is empty"
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(MsiError::MalformedHeader(format!(
                "channel identifier '{name}' appears more than once"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Layout B: cleaned table with named X / Y columns
// ---------------------------------------------------------------------------

/// Layout:
/// ```text
/// X,Y,123.456,255.233
/// 0,0,100,50
/// ```
/// An index column (unnamed, `Index`, or pandas' `Unnamed: 0`) is skipped.
fn load_cleaned(text: &str, delimiter: u8) -> Result<PixelTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(|e| csv_row_error(e, 0))?.clone();
    let x_idx = headers.iter().position(|h| h == "X");
    let y_idx = headers.iter().position(|h| h == "Y");
    let (Some(x_idx), Some(y_idx)) = (x_idx, y_idx) else {
        return Err(MsiError::MissingCoordinateColumns);
    };

    let channel_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != x_idx && *i != y_idx && !is_index_column(h))
        .map(|(i, h)| (i, h.to_string()))
        .collect();
    let names: Vec<String> = channel_cols.iter().map(|(_, n)| n.clone()).collect();
    check_channel_names(&names)?;

    let mut table = PixelTable::new(names);
    let mut duplicates = Duplicates::default();
    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => return Err(csv_row_error(e, 0)),
        }
        let row = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize| record.get(i).unwrap_or("");

        let coord = Coord::new(
            parse_coordinate(field(x_idx), row, "X")?,
            parse_coordinate(field(y_idx), row, "Y")?,
        );
        let values = channel_cols
            .iter()
            .map(|(i, _)| parse_float(field(*i), row, "intensity"))
            .collect::<Result<Vec<f64>>>()?;

        if table.insert(coord, values)?.is_some() {
            duplicates.record(coord);
        }
    }

    duplicates.warn();
    Ok(table)
}

/// Columns the cleaned-layout reader treats as a row index, not a channel.
pub(crate) fn is_index_column(name: &str) -> bool {
    name.is_empty() || name == "Index" || name.starts_with("Unnamed:")
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn parse_float(s: &str, row: u64, what: &str) -> Result<f64> {
    s.parse::<f64>()
        .map_err(|_| MsiError::malformed_row(row, format!("{what} '{s}' is not a number")))
}

/// Coordinates are read as floats and truncated toward zero.
fn parse_coordinate(s: &str, row: u64, axis: &str) -> Result<i64> {
    let v = parse_float(s, row, axis)?;
    if !v.is_finite() {
        return Err(MsiError::malformed_row(
            row,
            format!("{axis} coordinate '{s}' is not finite"),
        ));
    }
    Ok(v.trunc() as i64)
}

fn csv_row_error(e: csv::Error, line_shift: u64) -> MsiError {
    match e.position() {
        Some(pos) => MsiError::malformed_row(line_shift + pos.line(), e.to_string()),
        None => MsiError::Csv(e),
    }
}

/// Tally of rows that overwrote an earlier pixel.
#[derive(Default)]
struct Duplicates {
    count: usize,
    last: Option<Coord>,
}

impl Duplicates {
    fn record(&mut self, coord: Coord) {
        self.count += 1;
        self.last = Some(coord);
    }

    fn warn(&self) {
        if let Some(last) = self.last {
            log::warn!(
                "{} rows repeated an earlier (X, Y) coordinate, last at {last}; \
                 the later rows were kept",
                self.count
            );
        }
    }
}
