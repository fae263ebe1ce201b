// ============================================================
// Layer 4 — Delimited File Reader
// ============================================================
// Reads a comma-delimited data file into rows of string cells.
//
// Despite the .tsv names used by the humor datasets, every file
// is comma-delimited. The quote character is configurable; `None`
// disables quoting entirely so quote characters stay in the text.
//
// Header handling is NOT done here. Whether row 0 is a header is
// a per-processor decision.

use std::path::{Path, PathBuf};

use crate::domain::error::EvalError;

/// A raw file as ordered rows of ordered cells
#[derive(Debug, Clone)]
pub struct RawRows {
    pub path: PathBuf,
    pub rows: Vec<Vec<String>>,
}

impl RawRows {
    /// Fetch cell `col` of row `row`, failing with a parse error
    /// when the row is too short.
    pub fn cell(&self, row: usize, col: usize) -> Result<&str, EvalError> {
        let cells = &self.rows[row];
        cells
            .get(col)
            .map(String::as_str)
            .ok_or_else(|| EvalError::Parse {
                path:   self.path.clone(),
                row,
                needed: col,
                found:  cells.len(),
            })
    }

    /// Fetch the last cell of row `row`
    pub fn last_cell(&self, row: usize) -> Result<&str, EvalError> {
        let cells = &self.rows[row];
        cells
            .last()
            .map(String::as_str)
            .ok_or_else(|| EvalError::Parse {
                path:   self.path.clone(),
                row,
                needed: 0,
                found:  0,
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read every row of `path`. A missing file is a `DataFileNotFound`.
///
/// Blank lines come back as empty rows, so row indices always match
/// line order and any cell lookup on them is a parse error.
pub fn read_delimited(path: &Path, quote: Option<u8>) -> Result<RawRows, EvalError> {
    if !path.is_file() {
        return Err(EvalError::DataFileNotFound { path: path.to_path_buf() });
    }
    let bytes = std::fs::read(path)
        .map_err(|source| EvalError::Io { path: path.to_path_buf(), source })?;

    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(b',').has_headers(false).flexible(true);
    match quote {
        Some(q) => builder.quote(q),
        None    => builder.quoting(false),
    };

    let csv_err = |source| EvalError::Csv { path: path.to_path_buf(), source };
    let mut reader = builder.from_reader(bytes.as_slice());
    let mut record = csv::StringRecord::new();

    let mut rows: Vec<Vec<String>> = Vec::new();
    loop {
        // the csv reader steps over blank lines before a record
        let start = usize::try_from(reader.position().byte()).unwrap_or(usize::MAX);
        let skipped = blank_lines_at(&bytes, start);
        let has_record = reader.read_record(&mut record).map_err(csv_err)?;

        rows.extend(std::iter::repeat_with(Vec::new).take(skipped));
        if !has_record {
            break;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    tracing::debug!("Read {} rows from '{}'", rows.len(), path.display());
    Ok(RawRows { path: path.to_path_buf(), rows })
}

/// Count the empty lines that begin at byte `start`.
///
/// A record ended by "\r\n" is returned once the '\r' is read, so a
/// '\n' right after it still belongs to that record's line.
fn blank_lines_at(bytes: &[u8], start: usize) -> usize {
    let mut rest = bytes.get(start..).unwrap_or_default();
    if start > 0 && bytes.get(start - 1) == Some(&b'\r') {
        rest = rest.strip_prefix(b"\n").unwrap_or(rest);
    }
    blank_lines(rest)
}

/// Count the empty lines at the start of `bytes`
fn blank_lines(mut bytes: &[u8]) -> usize {
    let mut count = 0;
    loop {
        bytes = if let Some(rest) = bytes.strip_prefix(b"\r\n") {
            rest
        } else if let Some(rest) = bytes.strip_prefix(b"\n").or_else(|| bytes.strip_prefix(b"\r")) {
            rest
        } else {
            return count;
        };
        count += 1;
    }
}
