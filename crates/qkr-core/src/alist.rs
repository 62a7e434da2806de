//! Reading and writing parity-check matrices in the alist text format.
//!
//! The alist format (MacKay's sparse-matrix interchange format) stores a
//! binary matrix as four sections: the dimensions and maximum column/row
//! weights, the per-column and per-row weight vectors, then for each column
//! the 1-based row indices of its nonzero entries and for each row the
//! 1-based column indices — both zero-padded to the maximum weight so every
//! line has the same number of tokens.
//!
//! # Example
//!
//! ```rust
//! use qkr_core::alist::AlistMatrix;
//! use qkr_core::sparse::SparseBitMatrix;
//!
//! let h = SparseBitMatrix::from_dense(2, 4, &[1, 1, 0, 0, 0, 1, 1, 1]);
//! let a = AlistMatrix::from_matrix(&h);
//!
//! let text = a.to_alist_string();
//! let back = AlistMatrix::from_alist_str(&text).unwrap();
//! assert_eq!(back.to_matrix(), h);
//! ```

use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::sparse::SparseBitMatrix;

/// Error raised while reading or writing an alist file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlistError {
    /// The file could not be found or opened.
    NotFound(String),
    /// An I/O error occurred while reading or writing.
    Io(String),
    /// A numeric token was missing in the named section.
    Truncated(&'static str),
    /// A token could not be parsed or a declared size is inconsistent.
    Parse(String),
}

impl fmt::Display for AlistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlistError::NotFound(path) => write!(f, "alist file \"{path}\" not found"),
            AlistError::Io(msg) => write!(f, "alist i/o error: {msg}"),
            AlistError::Truncated(section) => {
                write!(f, "alist reading failed: missing token in {section}")
            }
            AlistError::Parse(msg) => write!(f, "alist parse error: {msg}"),
        }
    }
}

impl std::error::Error for AlistError {}

/// A parity-check matrix in alist form.
///
/// Index lists hold 1-based coordinates, flattened row-major and zero-padded
/// to the corresponding maximum weight, exactly as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlistMatrix {
    /// Number of columns (variables).
    pub n_cols: usize,
    /// Number of rows (checks).
    pub m_rows: usize,
    /// Largest column weight.
    pub max_col_weight: usize,
    /// Largest row weight.
    pub max_row_weight: usize,
    /// Weight of each column.
    pub col_weights: Vec<usize>,
    /// Weight of each row.
    pub row_weights: Vec<usize>,
    /// Per-column 1-based row indices, `n_cols × max_col_weight`.
    pub col_rows: Vec<usize>,
    /// Per-row 1-based column indices, `m_rows × max_row_weight`.
    pub row_cols: Vec<usize>,
}

impl AlistMatrix {
    /// Builds the alist representation of a sparse matrix.
    pub fn from_matrix(h: &SparseBitMatrix) -> Self {
        let (a, _b) = h.adjacency();

        let col_weights: Vec<usize> = a.iter().map(|checks| checks.len()).collect();
        let row_weights: Vec<usize> = (0..h.rows()).map(|j| h.row(j).len()).collect();
        let max_col_weight = col_weights.iter().copied().max().unwrap_or(0);
        let max_row_weight = row_weights.iter().copied().max().unwrap_or(0);

        let mut col_rows = vec![0usize; h.cols() * max_col_weight];
        for (i, checks) in a.iter().enumerate() {
            for (k, &j) in checks.iter().enumerate() {
                col_rows[i * max_col_weight + k] = j + 1;
            }
        }

        let mut row_cols = vec![0usize; h.rows() * max_row_weight];
        for j in 0..h.rows() {
            for (k, &i) in h.row(j).iter().enumerate() {
                row_cols[j * max_row_weight + k] = i + 1;
            }
        }

        Self {
            n_cols: h.cols(),
            m_rows: h.rows(),
            max_col_weight,
            max_row_weight,
            col_weights,
            row_weights,
            col_rows,
            row_cols,
        }
    }

    /// Reconstructs the sparse matrix from the per-row index lists.
    pub fn to_matrix(&self) -> SparseBitMatrix {
        let mut rows = vec![Vec::new(); self.m_rows];
        for j in 0..self.m_rows {
            for k in 0..self.max_row_weight {
                let c = self.row_cols[j * self.max_row_weight + k];
                if c != 0 {
                    rows[j].push(c - 1);
                }
            }
        }
        SparseBitMatrix::from_rows(self.n_cols, &rows)
    }

    /// Parses an alist document from a string.
    ///
    /// Zero tokens inside an index run are skipped (they are padding for
    /// ragged rows or columns); a missing token fails with
    /// [`AlistError::Truncated`] naming the section.
    pub fn from_alist_str(text: &str) -> Result<Self, AlistError> {
        let mut tokens = text.split_whitespace();
        let mut next = |section: &'static str| -> Result<usize, AlistError> {
            let tok = tokens.next().ok_or(AlistError::Truncated(section))?;
            tok.parse::<usize>()
                .map_err(|_| AlistError::Parse(format!("invalid token \"{tok}\" in {section}")))
        };

        let n_cols = next("header")?;
        let m_rows = next("header")?;
        let max_col_weight = next("header")?;
        let max_row_weight = next("header")?;

        let mut col_weights = Vec::with_capacity(n_cols);
        for _ in 0..n_cols {
            col_weights.push(next("column weights")?);
        }
        let mut row_weights = Vec::with_capacity(m_rows);
        for _ in 0..m_rows {
            row_weights.push(next("row weights")?);
        }

        for (i, &w) in col_weights.iter().enumerate() {
            if w > max_col_weight {
                return Err(AlistError::Parse(format!(
                    "column {i} weight {w} exceeds declared maximum {max_col_weight}"
                )));
            }
        }
        for (j, &w) in row_weights.iter().enumerate() {
            if w > max_row_weight {
                return Err(AlistError::Parse(format!(
                    "row {j} weight {w} exceeds declared maximum {max_row_weight}"
                )));
            }
        }

        // Index runs: collect `weight` nonzero tokens per column/row,
        // skipping interleaved zero padding.
        let mut read_lists = |weights: &[usize],
                              max_weight: usize,
                              section: &'static str|
         -> Result<Vec<usize>, AlistError> {
            let mut lists = vec![0usize; weights.len() * max_weight];
            for (outer, &weight) in weights.iter().enumerate() {
                let mut filled = 0;
                while filled < weight {
                    let v = next(section)?;
                    if v == 0 {
                        continue;
                    }
                    lists[outer * max_weight + filled] = v;
                    filled += 1;
                }
            }
            Ok(lists)
        };

        let col_rows = read_lists(&col_weights, max_col_weight, "column index lists")?;
        let row_cols = read_lists(&row_weights, max_row_weight, "row index lists")?;

        Ok(Self {
            n_cols,
            m_rows,
            max_col_weight,
            max_row_weight,
            col_weights,
            row_weights,
            col_rows,
            row_cols,
        })
    }

    /// Serializes to the alist text format.
    ///
    /// All four sections are always emitted, with trailing zero padding for
    /// columns and rows lighter than the maximum weight.
    pub fn to_alist_string(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{} {}", self.n_cols, self.m_rows);
        let _ = writeln!(out, "{} {}", self.max_col_weight, self.max_row_weight);

        let write_vector = |out: &mut String, values: &[usize]| {
            for v in values {
                let _ = write!(out, "{v} ");
            }
            out.push('\n');
        };
        write_vector(&mut out, &self.col_weights);
        write_vector(&mut out, &self.row_weights);

        let write_lists = |out: &mut String, lists: &[usize], width: usize| {
            for line in lists.chunks(width.max(1)) {
                write_vector(out, line);
            }
        };
        write_lists(&mut out, &self.col_rows, self.max_col_weight);
        write_lists(&mut out, &self.row_cols, self.max_row_weight);

        out
    }
}

/// Reads an alist file from disk.
pub fn read_alist(path: &Path) -> Result<AlistMatrix, AlistError> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AlistError::NotFound(path.display().to_string())
        } else {
            AlistError::Io(e.to_string())
        }
    })?;
    AlistMatrix::from_alist_str(&text)
}

/// Writes an alist file to disk.
pub fn write_alist(path: &Path, a: &AlistMatrix) -> Result<(), AlistError> {
    fs::write(path, a.to_alist_string()).map_err(|e| AlistError::Io(e.to_string()))
}
