//! Sparse binary parity-check matrices and Tanner-graph adjacency.
//!
//! A parity-check matrix **H** (m checks × n variables) is stored in
//! compressed-row form: for each row, the ordered list of columns holding a
//! 1. The decoders never mutate H; they derive two adjacency lists from it —
//! variable→check and check→variable — and address their message buffers
//! through the same immutable index structure.
//!
//! Nonzero iteration order is part of the contract: decoder output is
//! compared bit-for-bit against reference runs that rely on row-major,
//! ascending-column order for tie-breaking in the min-finding step.
//!
//! # Example
//!
//! ```rust
//! use qkr_core::gf2::Gf2;
//! use qkr_core::sparse::SparseBitMatrix;
//!
//! // (7,4) Hamming code parity-check matrix.
//! let h = SparseBitMatrix::from_dense(
//!     3, 7,
//!     &[
//!         1, 0, 0, 1, 1, 0, 1,
//!         0, 1, 0, 1, 0, 1, 1,
//!         0, 0, 1, 0, 1, 1, 1,
//!     ],
//! );
//!
//! assert_eq!(h.nnz(), 12);
//! let (a, b) = h.adjacency();
//! assert_eq!(b[0], vec![0, 3, 4, 6]);
//! assert!(a[3].contains(&0) && a[3].contains(&1));
//!
//! // Syndrome of the zero word is zero.
//! let zero = vec![Gf2::ZERO; 7];
//! assert!(h.mul_vec(&zero).iter().all(|s| s.is_zero()));
//! ```

use crate::gf2::Gf2;

/// A sparse binary matrix in compressed-row (CSR) form.
///
/// The structure is immutable after construction: `row_ptr` and `col_idx`
/// never change for the lifetime of the matrix, which lets message buffers
/// sharing this sparsity pattern resolve a coefficient to the same physical
/// slot on every iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseBitMatrix {
    rows: usize,
    cols: usize,
    /// `row_ptr[j]..row_ptr[j + 1]` indexes row j's entries in `col_idx`.
    row_ptr: Vec<usize>,
    /// Column index of each nonzero, row-major, ascending within a row.
    col_idx: Vec<usize>,
}

impl SparseBitMatrix {
    /// Builds from a dense row-major 0/1 matrix. Any nonzero byte counts
    /// as a 1.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != rows * cols`.
    pub fn from_dense(rows: usize, cols: usize, data: &[u8]) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "data length must equal rows * cols"
        );

        let mut row_ptr = Vec::with_capacity(rows + 1);
        let mut col_idx = Vec::new();
        row_ptr.push(0);
        for r in 0..rows {
            for c in 0..cols {
                if data[r * cols + c] != 0 {
                    col_idx.push(c);
                }
            }
            row_ptr.push(col_idx.len());
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
        }
    }

    /// Builds from per-row column lists. Each list is sorted and
    /// deduplicated so that iteration order matches [`from_dense`].
    ///
    /// # Panics
    ///
    /// Panics if any column index is out of bounds.
    ///
    /// [`from_dense`]: SparseBitMatrix::from_dense
    pub fn from_rows(cols: usize, rows: &[Vec<usize>]) -> Self {
        let mut row_ptr = Vec::with_capacity(rows.len() + 1);
        let mut col_idx = Vec::new();
        row_ptr.push(0);
        for (j, row) in rows.iter().enumerate() {
            let mut entries = row.clone();
            entries.sort_unstable();
            entries.dedup();
            for &c in &entries {
                assert!(c < cols, "column {c} out of bounds in row {j}");
            }
            col_idx.extend_from_slice(&entries);
            row_ptr.push(col_idx.len());
        }

        Self {
            rows: rows.len(),
            cols,
            row_ptr,
            col_idx,
        }
    }

    /// The n×n identity matrix.
    pub fn identity(n: usize) -> Self {
        Self {
            rows: n,
            cols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
        }
    }

    /// Number of rows (checks).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (variables).
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of nonzero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    /// The ordered column indices of row `j`.
    #[inline]
    pub fn row(&self, j: usize) -> &[usize] {
        &self.col_idx[self.row_ptr[j]..self.row_ptr[j + 1]]
    }

    /// The CSR row-pointer array (length `rows + 1`).
    #[inline]
    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    /// The CSR column-index array (length `nnz`).
    #[inline]
    pub fn col_indices(&self) -> &[usize] {
        &self.col_idx
    }

    /// Whether entry (j, i) is 1.
    pub fn get(&self, j: usize, i: usize) -> bool {
        self.row(j).binary_search(&i).is_ok()
    }

    /// Builds the two Tanner-graph adjacency lists `(A, B)`:
    /// `A[i]` is the ordered set of checks touching variable i, `B[j]` the
    /// ordered set of variables touching check j. Both follow the matrix's
    /// native row-major nonzero iteration order, so
    /// `j ∈ A[i] ⟺ i ∈ B[j] ⟺ H[j][i] = 1`.
    pub fn adjacency(&self) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
        let mut a = vec![Vec::new(); self.cols];
        let mut b = vec![Vec::new(); self.rows];
        for j in 0..self.rows {
            for &i in self.row(j) {
                b[j].push(i);
                a[i].push(j);
            }
        }
        (a, b)
    }

    /// Matrix-vector product over GF(2): the syndrome `H·x`.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != self.cols()`.
    pub fn mul_vec(&self, x: &[Gf2]) -> Vec<Gf2> {
        assert_eq!(x.len(), self.cols, "vector length must equal column count");
        let mut out = vec![Gf2::ZERO; self.rows];
        for j in 0..self.rows {
            let mut acc = Gf2::ZERO;
            for &i in self.row(j) {
                acc += x[i];
            }
            out[j] = acc;
        }
        out
    }

    /// Expands to a dense row-major 0/1 byte matrix.
    pub fn to_dense(&self) -> Vec<u8> {
        let mut dense = vec![0u8; self.rows * self.cols];
        for j in 0..self.rows {
            for &i in self.row(j) {
                dense[j * self.cols + i] = 1;
            }
        }
        dense
    }

    /// Returns `[H | I]`: the matrix extended on the right with an m×m
    /// identity block. Used to augment a code with one known parity bit
    /// per check before reconciliation.
    pub fn augment_with_identity(&self) -> SparseBitMatrix {
        let mut row_ptr = Vec::with_capacity(self.rows + 1);
        let mut col_idx = Vec::with_capacity(self.nnz() + self.rows);
        row_ptr.push(0);
        for j in 0..self.rows {
            col_idx.extend_from_slice(self.row(j));
            col_idx.push(self.cols + j);
            row_ptr.push(col_idx.len());
        }

        SparseBitMatrix {
            rows: self.rows,
            cols: self.cols + self.rows,
            row_ptr,
            col_idx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hamming_h() -> SparseBitMatrix {
        #[rustfmt::skip]
        let data: &[u8] = &[
            1, 0, 0, 1, 1, 0, 1,
            0, 1, 0, 1, 0, 1, 1,
            0, 0, 1, 0, 1, 1, 1,
        ];
        SparseBitMatrix::from_dense(3, 7, data)
    }

    #[test]
    fn test_from_dense_structure() {
        let h = hamming_h();
        assert_eq!(h.rows(), 3);
        assert_eq!(h.cols(), 7);
        assert_eq!(h.nnz(), 12);
        assert_eq!(h.row(0), &[0, 3, 4, 6]);
        assert_eq!(h.row(1), &[1, 3, 5, 6]);
        assert_eq!(h.row(2), &[2, 4, 5, 6]);
    }

    #[test]
    fn test_from_rows_matches_from_dense() {
        let h = hamming_h();
        let rows = vec![vec![0, 3, 4, 6], vec![6, 5, 3, 1], vec![2, 4, 5, 6]];
        let h2 = SparseBitMatrix::from_rows(7, &rows);
        assert_eq!(h, h2);
    }

    #[test]
    fn test_from_rows_dedups() {
        let h = SparseBitMatrix::from_rows(4, &[vec![1, 1, 3]]);
        assert_eq!(h.nnz(), 2);
        assert_eq!(h.row(0), &[1, 3]);
    }

    #[test]
    fn test_identity() {
        let i3 = SparseBitMatrix::identity(3);
        assert_eq!(i3.nnz(), 3);
        for j in 0..3 {
            assert_eq!(i3.row(j), &[j]);
        }
    }

    #[test]
    fn test_get() {
        let h = hamming_h();
        assert!(h.get(0, 0));
        assert!(h.get(0, 6));
        assert!(!h.get(0, 1));
        assert!(!h.get(2, 0));
    }

    #[test]
    fn test_adjacency_consistency() {
        let h = hamming_h();
        let (a, b) = h.adjacency();
        assert_eq!(a.len(), 7);
        assert_eq!(b.len(), 3);
        for (j, vars) in b.iter().enumerate() {
            for &i in vars {
                assert!(a[i].contains(&j), "A[{i}] must list check {j}");
                assert!(h.get(j, i));
            }
        }
        for (i, checks) in a.iter().enumerate() {
            for &j in checks {
                assert!(b[j].contains(&i), "B[{j}] must list variable {i}");
            }
        }
    }

    #[test]
    fn test_adjacency_preserves_row_major_order() {
        let h = hamming_h();
        let (a, b) = h.adjacency();
        assert_eq!(b[0], vec![0, 3, 4, 6]);
        // Variable 6 is touched by checks 0, 1, 2 — in row order.
        assert_eq!(a[6], vec![0, 1, 2]);
    }

    #[test]
    fn test_mul_vec_syndrome() {
        let h = hamming_h();
        // A valid Hamming codeword: parity [p0 p1 p2] + data [1 0 1 0].
        // p0 = d0^d1^d3 = 1, p1 = d0^d2^d3 = 0, p2 = d1^d2^d3 = 1.
        let cw: Vec<Gf2> = [1u8, 0, 1, 1, 0, 1, 0]
            .iter()
            .map(|&b| Gf2::try_from(b).unwrap())
            .collect();
        assert!(h.mul_vec(&cw).iter().all(|s| s.is_zero()));

        // Flipping one bit produces a nonzero syndrome.
        let mut bad = cw;
        bad[0] += Gf2::ONE;
        assert!(h.mul_vec(&bad).iter().any(|s| s.is_one()));
    }

    #[test]
    fn test_to_dense_round_trip() {
        let h = hamming_h();
        let dense = h.to_dense();
        assert_eq!(SparseBitMatrix::from_dense(3, 7, &dense), h);
    }

    #[test]
    fn test_augment_with_identity() {
        let h = hamming_h();
        let aug = h.augment_with_identity();
        assert_eq!(aug.rows(), 3);
        assert_eq!(aug.cols(), 10);
        assert_eq!(aug.nnz(), h.nnz() + 3);
        assert_eq!(aug.row(0), &[0, 3, 4, 6, 7]);
        assert_eq!(aug.row(1), &[1, 3, 5, 6, 8]);
        assert_eq!(aug.row(2), &[2, 4, 5, 6, 9]);
    }

    #[test]
    #[should_panic(expected = "data length must equal rows * cols")]
    fn test_from_dense_length_mismatch_panics() {
        SparseBitMatrix::from_dense(2, 2, &[1, 0, 1]);
    }

    #[test]
    #[should_panic(expected = "vector length must equal column count")]
    fn test_mul_vec_length_mismatch_panics() {
        hamming_h().mul_vec(&[Gf2::ZERO; 3]);
    }
}
