//! Quasi-cyclic expansion of protograph base matrices.
//!
//! 5G-NR-style LDPC codes are built from a small binary base graph: each
//! nonzero entry of the protograph becomes a Z×Z identity block
//! ([`enhance_from_base`]), and each block is then cyclically shifted by a
//! per-entry amount ([`shift_eyes`]). The shift amounts come from a
//! lifting-size-class-indexed table for the two standard base graphs, from a
//! uniform random draw, or from the table with random fallback for entries
//! the table does not cover.
//!
//! The random source is passed in explicitly so that shift generation is
//! deterministic under a seeded generator.
//!
//! # Example
//!
//! ```rust
//! use qkr_core::lifting::{enhance_from_base, shift_eyes, BaseGraph, ShiftMode};
//! use qkr_core::sparse::SparseBitMatrix;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let bg = SparseBitMatrix::from_dense(1, 2, &[1, 1]);
//! let h = enhance_from_base(&bg, 4).unwrap();
//! assert_eq!((h.rows(), h.cols(), h.nnz()), (4, 8, 8));
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let shifted = shift_eyes(&h, 4, BaseGraph::Bg1, ShiftMode::Combine, &mut rng).unwrap();
//! assert_eq!(shifted.nnz(), h.nnz());
//! ```

use std::fmt;

use rand::Rng;

use crate::sparse::SparseBitMatrix;

/// Which shift table a lifted matrix follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseGraph {
    /// 5G-NR base graph 1 (large blocks, high rate range).
    Bg1,
    /// 5G-NR base graph 2 (small blocks, low rate range).
    Bg2,
    /// A matrix with no associated shift table.
    Not5g,
}

/// How the per-block shift amount is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftMode {
    /// Uniform draw from `[0, Z)` for every non-empty block.
    Random,
    /// Table lookup only; any lookup failure is an error.
    NoRandom,
    /// Table lookup with uniform random fallback on lookup failure.
    Combine,
}

/// Error raised by lifting and shifting operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiftError {
    /// The lifting factor Z must be at least 1.
    ZeroLiftingFactor,
    /// Matrix dimensions are not multiples of the lifting factor.
    DimensionMismatch {
        /// Row count of the matrix.
        rows: usize,
        /// Column count of the matrix.
        cols: usize,
        /// The offending lifting factor.
        z: usize,
    },
    /// Z belongs to no lifting-size class.
    UnknownLiftingSize(usize),
    /// The graph type has no shift table.
    UnsupportedGraphType,
    /// The table has no entry for this (row, column) position.
    ShiftNotTabulated {
        /// Block row of the missing entry.
        row: usize,
        /// Block column of the missing entry.
        col: usize,
    },
}

impl fmt::Display for LiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiftError::ZeroLiftingFactor => write!(f, "lifting factor Z must be at least 1"),
            LiftError::DimensionMismatch { rows, cols, z } => {
                write!(f, "matrix size {rows}x{cols} and Z = {z} incompatible")
            }
            LiftError::UnknownLiftingSize(z) => write!(f, "invalid lifting size Z = {z}"),
            LiftError::UnsupportedGraphType => write!(f, "invalid base graph type"),
            LiftError::ShiftNotTabulated { row, col } => {
                write!(f, "no tabulated shift for block ({row}, {col})")
            }
        }
    }
}

impl std::error::Error for LiftError {}

// ---------------------------------------------------------------------------
// Lifting-size classes and shift tables
// ---------------------------------------------------------------------------

/// Supported lifting sizes, grouped into the eight 5G-NR classes. The class
/// index selects one coefficient out of each table entry.
static ILS_TABLE: [&[usize]; 8] = [
    &[2, 4, 8, 16, 32, 64, 128, 256],
    &[3, 6, 12, 24, 48, 96, 192, 384],
    &[5, 10, 20, 40, 80, 160, 320],
    &[7, 14, 28, 56, 112, 224],
    &[9, 18, 36, 72, 144, 288],
    &[11, 22, 44, 88, 176, 352],
    &[13, 26, 52, 104, 208],
    &[15, 30, 60, 120, 240],
];

/// One table row: (block column, shift coefficient per lifting-size class).
type ShiftRow = &'static [(usize, [usize; 8])];

/// Shift coefficients for the leading rows of base graph 1, laid out as in
/// the 38.212 tables: one coefficient per lifting-size class, applied
/// modulo Z. Positions outside the table fall back to a random draw under
/// [`ShiftMode::Combine`].
static BG1_SHIFTS: &[ShiftRow] = &[
    &[
        (0, [250, 307, 73, 223, 211, 294, 0, 135]),
        (1, [69, 19, 15, 16, 198, 118, 45, 227]),
        (2, [226, 50, 103, 94, 188, 167, 35, 126]),
        (3, [159, 369, 49, 91, 186, 330, 48, 134]),
        (5, [100, 181, 240, 74, 219, 207, 9, 84]),
        (6, [10, 216, 39, 10, 4, 165, 65, 83]),
        (9, [59, 317, 15, 0, 29, 243, 75, 53]),
        (10, [229, 288, 162, 205, 144, 250, 103, 225]),
        (11, [110, 109, 215, 216, 116, 1, 49, 205]),
        (12, [191, 17, 164, 21, 216, 339, 153, 128]),
        (13, [9, 357, 133, 215, 115, 201, 222, 75]),
        (15, [195, 215, 298, 14, 233, 53, 219, 135]),
        (16, [23, 106, 110, 70, 144, 347, 94, 217]),
        (18, [190, 242, 113, 141, 95, 304, 140, 220]),
        (19, [35, 180, 16, 198, 216, 167, 45, 90]),
        (20, [239, 330, 189, 104, 73, 47, 228, 105]),
        (21, [31, 346, 32, 81, 261, 188, 156, 137]),
        (22, [1, 1, 1, 1, 1, 1, 1, 1]),
        (23, [0, 0, 0, 0, 0, 0, 0, 0]),
    ],
    &[
        (0, [2, 76, 303, 141, 179, 77, 22, 96]),
        (2, [239, 76, 294, 45, 162, 225, 11, 236]),
        (3, [117, 73, 27, 151, 223, 96, 124, 136]),
        (4, [124, 288, 261, 46, 256, 338, 0, 221]),
        (5, [71, 144, 161, 119, 160, 268, 10, 128]),
        (7, [222, 331, 133, 157, 76, 112, 0, 92]),
        (8, [104, 331, 4, 133, 202, 302, 0, 172]),
        (9, [173, 178, 80, 87, 117, 50, 2, 56]),
        (11, [220, 295, 129, 206, 109, 167, 16, 11]),
        (12, [102, 342, 300, 93, 15, 253, 60, 189]),
        (14, [109, 217, 76, 79, 72, 334, 0, 95]),
        (15, [132, 99, 266, 9, 152, 242, 6, 85]),
        (16, [142, 354, 72, 118, 158, 257, 30, 153]),
        (17, [155, 114, 83, 194, 147, 133, 0, 87]),
        (19, [255, 331, 260, 31, 156, 9, 168, 163]),
        (21, [28, 112, 301, 187, 119, 302, 31, 216]),
        (22, [0, 0, 0, 0, 0, 0, 105, 0]),
        (23, [0, 0, 0, 0, 0, 0, 0, 0]),
        (24, [0, 0, 0, 0, 0, 0, 0, 0]),
    ],
    &[
        (0, [106, 205, 68, 207, 258, 226, 132, 189]),
        (1, [111, 250, 7, 203, 167, 35, 37, 4]),
        (2, [185, 328, 80, 31, 220, 213, 21, 225]),
        (4, [63, 332, 280, 176, 133, 302, 180, 151]),
        (5, [117, 256, 38, 180, 243, 111, 4, 236]),
        (6, [93, 161, 227, 186, 202, 265, 149, 117]),
        (7, [229, 267, 202, 95, 218, 128, 48, 179]),
        (8, [177, 160, 200, 153, 63, 237, 38, 92]),
        (9, [95, 63, 71, 177, 0, 294, 122, 24]),
        (10, [39, 129, 106, 70, 3, 127, 195, 68]),
        (13, [142, 200, 295, 77, 74, 110, 155, 6]),
        (14, [225, 88, 283, 214, 229, 286, 28, 101]),
        (15, [225, 53, 301, 77, 0, 125, 85, 33]),
        (17, [245, 131, 184, 198, 216, 131, 47, 96]),
        (18, [205, 240, 246, 117, 269, 163, 179, 125]),
        (19, [251, 205, 230, 223, 200, 210, 42, 67]),
        (20, [117, 13, 276, 90, 234, 7, 66, 230]),
        (24, [0, 0, 0, 0, 0, 0, 0, 0]),
        (25, [0, 0, 0, 0, 0, 0, 0, 0]),
    ],
    &[
        (0, [121, 276, 220, 201, 187, 97, 4, 128]),
        (1, [89, 87, 208, 18, 145, 94, 6, 23]),
        (3, [84, 0, 30, 165, 166, 49, 33, 162]),
        (4, [20, 275, 197, 5, 108, 279, 113, 220]),
        (6, [150, 199, 61, 45, 82, 139, 49, 43]),
        (7, [131, 153, 175, 142, 296, 166, 21, 186]),
        (8, [243, 56, 79, 16, 32, 91, 6, 96]),
        (10, [136, 132, 281, 34, 100, 106, 151, 1]),
        (11, [86, 305, 303, 155, 180, 246, 83, 216]),
        (12, [246, 231, 253, 213, 232, 345, 154, 22]),
        (13, [219, 341, 164, 147, 0, 269, 87, 24]),
        (14, [211, 212, 53, 69, 302, 185, 5, 167]),
        (16, [240, 304, 44, 96, 191, 249, 92, 200]),
        (17, [76, 300, 28, 74, 205, 215, 173, 32]),
        (18, [244, 271, 77, 99, 51, 143, 120, 235]),
        (20, [144, 39, 319, 30, 120, 121, 2, 172]),
        (21, [12, 357, 68, 158, 321, 121, 142, 219]),
        (22, [1, 1, 1, 1, 1, 1, 0, 1]),
        (25, [0, 0, 0, 0, 0, 0, 0, 0]),
    ],
];

/// Shift coefficients for the leading rows of base graph 2, same layout as
/// [`BG1_SHIFTS`].
static BG2_SHIFTS: &[ShiftRow] = &[
    &[
        (0, [9, 174, 0, 72, 3, 156, 143, 145]),
        (1, [117, 97, 0, 110, 26, 143, 19, 131]),
        (2, [204, 166, 0, 23, 53, 14, 176, 71]),
        (3, [26, 66, 0, 181, 35, 3, 165, 21]),
        (6, [189, 71, 0, 95, 115, 40, 196, 23]),
        (9, [205, 172, 0, 8, 127, 123, 13, 112]),
        (10, [0, 0, 0, 1, 0, 0, 0, 1]),
        (11, [0, 0, 0, 0, 0, 0, 0, 0]),
    ],
    &[
        (0, [167, 27, 137, 53, 19, 17, 18, 142]),
        (3, [166, 36, 124, 156, 94, 65, 27, 174]),
        (4, [253, 48, 0, 115, 104, 63, 3, 183]),
        (5, [125, 92, 0, 156, 66, 1, 102, 27]),
        (6, [226, 31, 88, 115, 84, 55, 185, 96]),
        (7, [156, 187, 0, 200, 98, 37, 17, 23]),
        (8, [224, 185, 0, 29, 69, 171, 14, 9]),
        (9, [252, 3, 55, 31, 50, 133, 180, 167]),
        (11, [0, 0, 0, 0, 0, 0, 0, 0]),
        (12, [0, 0, 0, 0, 0, 0, 0, 0]),
    ],
    &[
        (0, [81, 25, 20, 152, 95, 98, 126, 74]),
        (1, [114, 114, 94, 131, 106, 168, 163, 31]),
        (3, [44, 117, 99, 46, 92, 107, 47, 3]),
        (4, [52, 110, 9, 191, 110, 82, 183, 53]),
        (8, [240, 114, 108, 91, 111, 142, 132, 155]),
        (10, [1, 1, 1, 0, 1, 1, 1, 0]),
        (12, [0, 0, 0, 0, 0, 0, 0, 0]),
        (13, [0, 0, 0, 0, 0, 0, 0, 0]),
    ],
    &[
        (1, [8, 136, 38, 185, 120, 53, 36, 239]),
        (2, [58, 175, 15, 6, 121, 174, 48, 171]),
        (4, [158, 113, 102, 36, 22, 174, 18, 95]),
        (5, [104, 72, 146, 124, 4, 127, 111, 110]),
        (6, [209, 123, 12, 124, 73, 17, 203, 159]),
        (7, [54, 118, 57, 110, 49, 89, 3, 199]),
        (8, [18, 28, 53, 156, 128, 17, 191, 43]),
        (9, [128, 186, 46, 133, 79, 105, 160, 75]),
        (10, [0, 0, 0, 1, 0, 0, 0, 1]),
        (13, [0, 0, 0, 0, 0, 0, 0, 0]),
    ],
];

/// Maps a lifting size to its lifting-size class index.
pub fn ils_class(z: usize) -> Result<usize, LiftError> {
    ILS_TABLE
        .iter()
        .position(|sizes| sizes.contains(&z))
        .ok_or(LiftError::UnknownLiftingSize(z))
}

/// Looks up the shift amount for block (row, col) of the given base graph
/// at lifting size `z`, reduced modulo `z`.
pub fn compute_shift(
    row: usize,
    col: usize,
    graph: BaseGraph,
    z: usize,
) -> Result<usize, LiftError> {
    let table = match graph {
        BaseGraph::Bg1 => BG1_SHIFTS,
        BaseGraph::Bg2 => BG2_SHIFTS,
        BaseGraph::Not5g => return Err(LiftError::UnsupportedGraphType),
    };
    let ils = ils_class(z)?;
    let entry = table
        .get(row)
        .and_then(|r| r.iter().find(|(c, _)| *c == col))
        .ok_or(LiftError::ShiftNotTabulated { row, col })?;
    Ok(entry.1[ils] % z)
}

// ---------------------------------------------------------------------------
// Lifting
// ---------------------------------------------------------------------------

/// Expands a protograph into a full-size matrix: every nonzero entry (i, j)
/// of `bg` becomes the Z×Z identity block at block position (i, j); all
/// other cells are zero.
pub fn enhance_from_base(bg: &SparseBitMatrix, z: usize) -> Result<SparseBitMatrix, LiftError> {
    if z == 0 {
        return Err(LiftError::ZeroLiftingFactor);
    }

    let mut rows = vec![Vec::new(); bg.rows() * z];
    for bi in 0..bg.rows() {
        for &bj in bg.row(bi) {
            for k in 0..z {
                rows[bi * z + k].push(bj * z + k);
            }
        }
    }
    Ok(SparseBitMatrix::from_rows(bg.cols() * z, &rows))
}

/// Rotates every row of block (br, bc) rightward by `shift` positions.
fn apply_block_shift(
    dense: &mut [u8],
    cols: usize,
    z: usize,
    br: usize,
    bc: usize,
    shift: usize,
) {
    let s = shift % z;
    if s == 0 {
        return;
    }
    for r in 0..z {
        let start = (br * z + r) * cols + bc * z;
        dense[start..start + z].rotate_right(s);
    }
}

/// Applies cyclic shifts to every non-empty Z×Z block of `h`.
///
/// The shift amount per block is chosen according to `mode`:
///
/// - [`ShiftMode::NoRandom`] — table lookup
///   `shift_table[graph][row][col][ils_class(z)] mod z`; fails for
///   [`BaseGraph::Not5g`], an unknown lifting size, or a position the table
///   does not cover.
/// - [`ShiftMode::Random`] — uniform draw from `[0, Z)`.
/// - [`ShiftMode::Combine`] — table lookup, falling back to a uniform draw
///   when the lookup fails.
///
/// Fails with [`LiftError::DimensionMismatch`] if the dimensions of `h` are
/// not multiples of `z`.
pub fn shift_eyes<R: Rng>(
    h: &SparseBitMatrix,
    z: usize,
    graph: BaseGraph,
    mode: ShiftMode,
    rng: &mut R,
) -> Result<SparseBitMatrix, LiftError> {
    if z == 0 {
        return Err(LiftError::ZeroLiftingFactor);
    }
    if h.rows() % z != 0 || h.cols() % z != 0 {
        return Err(LiftError::DimensionMismatch {
            rows: h.rows(),
            cols: h.cols(),
            z,
        });
    }

    let cols = h.cols();
    let mut dense = h.to_dense();
    let block_rows = h.rows() / z;
    let block_cols = cols / z;

    for br in 0..block_rows {
        for bc in 0..block_cols {
            if block_is_empty(&dense, cols, z, br, bc) {
                continue;
            }
            let shift = match mode {
                ShiftMode::Random => rng.gen_range(0..z),
                ShiftMode::NoRandom => compute_shift(br, bc, graph, z)?,
                ShiftMode::Combine => {
                    compute_shift(br, bc, graph, z).unwrap_or_else(|_| rng.gen_range(0..z))
                }
            };
            apply_block_shift(&mut dense, cols, z, br, bc, shift);
        }
    }

    Ok(SparseBitMatrix::from_dense(h.rows(), cols, &dense))
}

fn block_is_empty(dense: &[u8], cols: usize, z: usize, br: usize, bc: usize) -> bool {
    for r in 0..z {
        let start = (br * z + r) * cols + bc * z;
        if dense[start..start + z].iter().any(|&v| v != 0) {
            return false;
        }
    }
    true
}
