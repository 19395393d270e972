//! Reading datasets from plain numeric tables.
//!
//! One sample per line, fields separated by whitespace and/or commas. Blank lines and lines starting
//! with `#` are skipped.

use crate::{error::invalid_config, KMeans, KMeansError, Primitive, Result};
use log::debug;
use std::{fs::File, io::{BufRead, BufReader}, path::Path};

/// Layout options of a numeric table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// The first (non-blank, non-comment) line holds column names and is skipped.
    pub header: bool,
    /// Amount of leading columns (e.g. an id) to drop from every row.
    pub skip_columns: usize
}

/// Read a dataset from any buffered reader.
///
/// ## Errors
/// - [`KMeansError::Parse`] if a field is not a number
/// - [`KMeansError::DimensionMismatch`] if rows differ in their amount of fields
/// - [`KMeansError::InvalidConfiguration`] if there are no rows (or no columns left after skipping)
/// - [`KMeansError::Io`] if reading fails
pub fn read_table<T: Primitive, R: BufRead>(reader: R, options: &TableOptions) -> Result<KMeans<T>> {
    let mut samples = Vec::new();
    let mut sample_dims = None;
    let mut header_pending = options.header;

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if header_pending {
            header_pending = false;
            continue;
        }

        let row_start = samples.len();
        for field in trimmed.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|f| !f.is_empty())
                .skip(options.skip_columns) {
            let value = field.parse::<T>().map_err(|_| KMeansError::Parse {
                line: line_idx + 1,
                message: format!("'{}' is not a number", field)
            })?;
            samples.push(value);
        }
        let row_dims = samples.len() - row_start;
        match sample_dims {
            None => sample_dims = Some(row_dims),
            Some(expected) if expected != row_dims => {
                return Err(KMeansError::DimensionMismatch { expected, found: row_dims });
            },
            Some(_) => {}
        }
    }

    let sample_dims = match sample_dims {
        Some(dims) if dims > 0 => dims,
        _ => return invalid_config("table does not contain any numeric data")
    };
    let sample_cnt = samples.len() / sample_dims;
    debug!("Read table with {} samples ({} dimensions)", sample_cnt, sample_dims);
    KMeans::new(samples, sample_cnt, sample_dims)
}

/// Read a dataset from the file at **path**. See [`read_table`].
pub fn load_table<T: Primitive, P: AsRef<Path>>(path: P, options: &TableOptions) -> Result<KMeans<T>> {
    let file = File::open(path.as_ref())?;
    read_table(BufReader::new(file), options)
}
