//! Pre-allocated message buffers for concurrent decoding.
//!
//! Monte-Carlo evaluation runs many decodes in parallel against one shared
//! parity-check matrix. Allocating the two message matrices inside the
//! decode loop would dominate the runtime, so [`MessageMemory`] allocates
//! everything up front: for a fixed number of slots it reserves one
//! contiguous arena holding a variable→check buffer and a check→variable
//! buffer of `nnz(H)` cells per slot, plus one shared copy of H's
//! compressed-row index structure.
//!
//! [`slot_views`] splits the arena into disjoint mutable views, one per
//! slot. Each view can be moved to its own worker; the borrow checker
//! guarantees no two views alias, and the shared index structure resolves
//! "coefficient at (check j, variable i)" to the same physical cell on
//! every iteration. Buffers are overwritten across sequential decodes in a
//! slot, never resized, and the manager must outlive every view.
//!
//! # Example
//!
//! ```rust
//! use qkr_core::memory::MessageMemory;
//! use qkr_core::sparse::SparseBitMatrix;
//!
//! let h = SparseBitMatrix::from_dense(2, 4, &[1, 1, 0, 1, 0, 1, 1, 1]);
//! let mut memory = MessageMemory::new(&h, 4);
//!
//! let views = memory.slot_views();
//! assert_eq!(views.len(), 4);
//! for view in &views {
//!     assert_eq!(view.nnz(), h.nnz());
//! }
//! ```
//!
//! [`slot_views`]: MessageMemory::slot_views

use crate::llr::Llr;
use crate::sparse::SparseBitMatrix;

/// Owner of the message buffers for a fixed number of concurrent decodes.
#[derive(Debug)]
pub struct MessageMemory {
    slots: usize,
    nnz: usize,
    /// H's row pointers, shared by every slot.
    row_ptr: Vec<usize>,
    /// H's column indices, shared by every slot.
    col_idx: Vec<usize>,
    /// Variable→check cells, `slots × nnz`, slot-major.
    m_cells: Vec<Llr>,
    /// Check→variable cells, `slots × nnz`, slot-major.
    e_cells: Vec<Llr>,
}

impl MessageMemory {
    /// Allocates buffers for `slots` concurrent decodes against `h`.
    ///
    /// The slot count must equal the maximum number of decodes issued
    /// concurrently; callers are responsible for never running two decodes
    /// in the same slot at the same time.
    ///
    /// # Panics
    ///
    /// Panics if `slots` is zero or `h` has no nonzero entries.
    pub fn new(h: &SparseBitMatrix, slots: usize) -> Self {
        assert!(slots > 0, "slot count must be at least 1");
        let nnz = h.nnz();
        assert!(nnz > 0, "matrix must have at least one nonzero entry");

        Self {
            slots,
            nnz,
            row_ptr: h.row_ptr().to_vec(),
            col_idx: h.col_indices().to_vec(),
            m_cells: vec![Llr::ZERO; slots * nnz],
            e_cells: vec![Llr::ZERO; slots * nnz],
        }
    }

    /// Number of slots.
    #[inline]
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Cells per message buffer (the nonzero count of H).
    #[inline]
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    /// Splits the arena into one disjoint mutable view per slot.
    ///
    /// Views borrow the manager, so it cannot be dropped or reallocated
    /// while any decode still holds one. Each view is independent and may
    /// be sent to a different thread.
    pub fn slot_views(&mut self) -> Vec<SlotView<'_>> {
        let row_ptr = &self.row_ptr[..];
        let col_idx = &self.col_idx[..];
        self.m_cells
            .chunks_exact_mut(self.nnz)
            .zip(self.e_cells.chunks_exact_mut(self.nnz))
            .enumerate()
            .map(|(index, (m, e))| SlotView {
                index,
                row_ptr,
                col_idx,
                m,
                e,
            })
            .collect()
    }
}

/// Exclusive view over one slot's message buffers.
///
/// `m` holds the variable→check messages, `e` the check→variable messages;
/// both share H's sparsity pattern. Cell `k` of either buffer is the
/// coefficient at row `j`, column `col_idx(k)`, where
/// `row_range(j)` gives the cell range of row j.
#[derive(Debug)]
pub struct SlotView<'a> {
    index: usize,
    row_ptr: &'a [usize],
    col_idx: &'a [usize],
    m: &'a mut [Llr],
    e: &'a mut [Llr],
}

impl SlotView<'_> {
    /// The slot index this view was created for.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of checks in the shared index structure.
    #[inline]
    pub fn checks(&self) -> usize {
        self.row_ptr.len() - 1
    }

    /// Cells per message buffer.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    /// Cell range of check `j`.
    #[inline]
    pub fn row_range(&self, j: usize) -> std::ops::Range<usize> {
        self.row_ptr[j]..self.row_ptr[j + 1]
    }

    /// Column (variable index) of cell `k`.
    #[inline]
    pub fn col(&self, k: usize) -> usize {
        self.col_idx[k]
    }

    /// Borrows the index structure and both buffers at once, for the decode
    /// inner loops.
    #[inline]
    pub fn parts(&mut self) -> (&[usize], &[usize], &mut [Llr], &mut [Llr]) {
        (self.row_ptr, self.col_idx, &mut *self.m, &mut *self.e)
    }
}
