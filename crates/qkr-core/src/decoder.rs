//! Iterative message-passing decoders for LDPC codes.
//!
//! All variants share one skeleton over the Tanner graph of a parity-check
//! matrix **H**: initialize the variable→check messages from the channel
//! beliefs R, then alternate a check-node update, a variable-node update
//! with hard decision, and a termination test until the hard decision
//! satisfies the target (the zero syndrome for plain decoding, a supplied
//! syndrome for reconciliation) or the iteration cap is reached. Reaching
//! the cap is not an error: the last hard decision is returned and the
//! caller decides whether a mismatch counts as a failed trial.
//!
//! The variants differ in the check-node update:
//!
//! - **Sum-product** combines magnitudes through the kernel
//!   `Φ(x) = −ln(tanh(x/2))` (or, in the plain form, a tanh product) and
//!   signs through GF(2) addition.
//! - **Normalized min-sum** replaces the kernel with the minimum of the
//!   other incoming magnitudes times a scale factor; the fast formulation
//!   locates the two smallest magnitudes once per check and reuses them for
//!   every edge.
//! - **Layered normalized min-sum** updates checks in contiguous layers
//!   against a running belief vector, so later layers see earlier layers'
//!   results within the same iteration.
//!
//! Syndrome-based variants inject the target syndrome bit of each check as
//! an extra XOR term into that check's outgoing sign, steering the decoder
//! toward any vector with the requested syndrome.
//!
//! # Example
//!
//! ```rust
//! use qkr_core::decoder::{decode, Algorithm, DecodeOptions};
//! use qkr_core::llr::Llr;
//! use qkr_core::sparse::SparseBitMatrix;
//!
//! let h = SparseBitMatrix::from_dense(
//!     3, 7,
//!     &[
//!         1, 0, 0, 1, 1, 0, 1,
//!         0, 1, 0, 1, 0, 1, 1,
//!         0, 0, 1, 0, 1, 1, 1,
//!     ],
//! );
//!
//! // Strong all-zero beliefs decode to the zero codeword.
//! let r: Vec<Llr> = vec![Llr::from(5.0); 7];
//! let c = decode(&h, &r, Algorithm::SumProduct, &DecodeOptions::default()).unwrap();
//! assert!(c.iter().all(|bit| bit.is_zero()));
//! ```

use std::fmt;
use std::ops::Range;

use tracing::trace;

use crate::gf2::Gf2;
use crate::llr::Llr;
use crate::memory::SlotView;
use crate::sparse::SparseBitMatrix;

/// Default iteration cap shared by every variant.
pub const DEFAULT_MAX_ITERS: usize = 50;

/// Default tolerance for locating the minimum's position in the layered
/// min-sum formulation.
pub const DEFAULT_MIN_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Errors and selector
// ---------------------------------------------------------------------------

/// Error raised by a decoder variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The layer size does not evenly divide the check count.
    LayerSizeMismatch {
        /// Number of checks in H.
        checks: usize,
        /// The offending layer size.
        layer_size: usize,
    },
    /// No minimum-magnitude edge could be located for a check — the check
    /// has no incident edges or the adjacency is corrupt.
    MinPositionNotFound {
        /// The degenerate check index.
        check: usize,
    },
    /// A layered algorithm was selected without a layer size.
    MissingLayerSize,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::LayerSizeMismatch { checks, layer_size } => {
                write!(f, "layer size {layer_size} incompatible with {checks} checks")
            }
            DecodeError::MinPositionNotFound { check } => {
                write!(f, "minimum position not found for check {check}")
            }
            DecodeError::MissingLayerSize => {
                write!(f, "layered algorithm selected without a layer size")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// The closed set of decoding algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Sum-product (exact belief propagation, Φ-kernel form).
    SumProduct,
    /// Min-sum (normalized min-sum with scale 1).
    MinSum,
    /// Normalized min-sum with a configurable scale factor.
    NormalizedMinSum,
    /// Layered min-sum (layered normalized min-sum with scale 1).
    LayeredMinSum,
    /// Layered normalized min-sum with a configurable scale factor.
    LayeredNormalizedMinSum,
}

/// Options shared by the [`decode`] / [`decode_to_syndrome`] dispatchers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeOptions {
    /// Scale factor for the min-sum family (ignored by sum-product).
    pub scale: f64,
    /// Layer size for the layered variants; required when one is selected.
    pub layer_size: Option<usize>,
    /// Iteration cap.
    pub max_iters: usize,
    /// Tolerance for the layered min-position search.
    pub min_tolerance: f64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            layer_size: None,
            max_iters: DEFAULT_MAX_ITERS,
            min_tolerance: DEFAULT_MIN_TOLERANCE,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Hard decision per belief: negative → 1, otherwise 0.
pub fn hard_decision(llrs: &[f64]) -> Vec<Gf2> {
    llrs.iter().map(|&l| Gf2::from(l < 0.0)).collect()
}

/// The sum-product magnitude kernel Φ(x) = −ln(tanh(x/2)). Self-inverse.
fn phi(x: f64) -> f64 {
    -((x / 2.0).tanh()).ln()
}

/// Edge positions of each column, in row-major order. This is the
/// variable-side view of the CSR edge layout: `col_edges[i]` lists the
/// cells holding coefficients of variable i, ordered by check index.
fn column_edges(h: &SparseBitMatrix) -> Vec<Vec<usize>> {
    let mut edges = vec![Vec::new(); h.cols()];
    for (k, &i) in h.col_indices().iter().enumerate() {
        edges[i].push(k);
    }
    edges
}

/// Whether the hard decision satisfies the termination target: `H·c == s`
/// for syndrome decoding, `H·c == 0` otherwise.
fn syndrome_matches(h: &SparseBitMatrix, c: &[Gf2], target: Option<&[Gf2]>) -> bool {
    let s = h.mul_vec(c);
    match target {
        Some(t) => s.as_slice() == t,
        None => s.iter().all(|b| b.is_zero()),
    }
}

/// Two smallest incoming magnitudes of a check, with the column of the
/// smallest. Exact two-pass form: the first pass keeps the first minimum
/// encountered, the second pass excludes that column.
fn find_two_mins_tracked(
    msgs: &[Llr],
    range: Range<usize>,
    col_idx: &[usize],
    check: usize,
) -> Result<(f64, f64, usize), DecodeError> {
    if range.is_empty() {
        return Err(DecodeError::MinPositionNotFound { check });
    }

    let mut min_1 = f64::MAX;
    let mut min_1_pos = col_idx[range.start];
    for k in range.clone() {
        let b = msgs[k].beta();
        if b < min_1 {
            min_1 = b;
            min_1_pos = col_idx[k];
        }
    }

    let mut min_2 = f64::MAX;
    for k in range {
        let b = msgs[k].beta();
        if b < min_2 && col_idx[k] != min_1_pos {
            min_2 = b;
        }
    }

    Ok((min_1, min_2, min_1_pos))
}

/// Two smallest incoming magnitudes of a check in the layered formulation,
/// locating the minimum's position afterwards with tolerance `tol`. Fails
/// when no edge magnitude lies within tolerance of the minimum.
fn find_two_mins_tol(
    msgs: &[Llr],
    range: Range<usize>,
    col_idx: &[usize],
    tol: f64,
    check: usize,
) -> Result<(f64, f64, usize), DecodeError> {
    if range.is_empty() {
        return Err(DecodeError::MinPositionNotFound { check });
    }

    let seed = msgs[range.start].beta();
    let mut min_1 = seed;
    let mut min_2 = seed;
    for k in range.clone() {
        let b = msgs[k].beta();
        if b < min_1.max(min_2) {
            // Replace the larger of the two; on a tie, the first.
            if min_1 >= min_2 {
                min_1 = b;
            } else {
                min_2 = b;
            }
        }
    }
    let (lo, hi) = if min_1 <= min_2 {
        (min_1, min_2)
    } else {
        (min_2, min_1)
    };

    let mut pos = None;
    for k in range {
        if (msgs[k].beta() - lo).abs() < tol {
            pos = Some(col_idx[k]);
        }
    }
    let pos = pos.ok_or(DecodeError::MinPositionNotFound { check })?;

    Ok((lo, hi, pos))
}

/// GF(2) sum of the signs of every incoming message of a check.
fn overall_sign(msgs: &[Llr], range: Range<usize>) -> Gf2 {
    let mut sign = Gf2::ZERO;
    for k in range {
        sign += msgs[k].alpha();
    }
    sign
}

// ---------------------------------------------------------------------------
// Sum-product
// ---------------------------------------------------------------------------

/// Decodes with the plain sum-product algorithm on signed beliefs.
///
/// Check messages use the tanh-product rule directly; the hard decision
/// maps a total belief `<= 0` to bit 1.
///
/// # Panics
///
/// Panics if `r.len() != h.cols()`.
pub fn decode_sum_product(h: &SparseBitMatrix, r: &[f64], max_iters: usize) -> Vec<Gf2> {
    let m = h.rows();
    let n = h.cols();
    assert_eq!(r.len(), n, "belief length must match variable count");

    let row_ptr = h.row_ptr();
    let col_idx = h.col_indices();
    let col_edges = column_edges(h);

    let mut msgs_vc = vec![0.0f64; h.nnz()];
    let mut msgs_cv = vec![0.0f64; h.nnz()];
    for (k, &i) in col_idx.iter().enumerate() {
        msgs_vc[k] = r[i];
    }

    let mut iteration = 0usize;
    loop {
        trace!(iteration, "sum-product check update");
        for j in 0..m {
            let range = row_ptr[j]..row_ptr[j + 1];
            for k in range.clone() {
                let mut product = 1.0f64;
                for k_other in range.clone() {
                    if k_other != k {
                        product *= (msgs_vc[k_other] / 2.0).tanh();
                    }
                }
                msgs_cv[k] = ((1.0 + product) / (1.0 - product)).ln();
            }
        }

        let mut c = vec![Gf2::ZERO; n];
        let mut totals = vec![0.0f64; n];
        for i in 0..n {
            let mut sum = 0.0;
            for &k in &col_edges[i] {
                sum += msgs_cv[k];
            }
            totals[i] = sum + r[i];
            c[i] = Gf2::from(totals[i] <= 0.0);
        }

        if iteration == max_iters || syndrome_matches(h, &c, None) {
            return c;
        }

        for i in 0..n {
            for &k in &col_edges[i] {
                let mut sum = 0.0;
                for &k_other in &col_edges[i] {
                    if k_other != k {
                        sum += msgs_cv[k_other];
                    }
                }
                msgs_vc[k] = sum + r[i];
            }
        }
        iteration += 1;
    }
}

fn sum_product_llr_core(
    h: &SparseBitMatrix,
    r: &[Llr],
    syndrome: Option<&[Gf2]>,
    max_iters: usize,
) -> Vec<Gf2> {
    let m = h.rows();
    let n = h.cols();
    assert_eq!(r.len(), n, "belief length must match variable count");

    let row_ptr = h.row_ptr();
    let col_idx = h.col_indices();
    let col_edges = column_edges(h);

    let mut msgs_vc = vec![Llr::ZERO; h.nnz()];
    let mut msgs_cv = vec![Llr::ZERO; h.nnz()];
    for (k, &i) in col_idx.iter().enumerate() {
        msgs_vc[k] = r[i];
    }

    let mut iteration = 0usize;
    loop {
        trace!(iteration, "sum-product Φ-form check update");
        for j in 0..m {
            let range = row_ptr[j]..row_ptr[j + 1];
            let s_j = syndrome.map_or(Gf2::ZERO, |s| s[j]);
            for k in range.clone() {
                let mut sign = Gf2::ZERO;
                let mut val_sum = 0.0f64;
                for k_other in range.clone() {
                    if k_other != k {
                        val_sum += phi(msgs_vc[k_other].beta());
                        sign += msgs_vc[k_other].alpha();
                    }
                }
                sign += s_j;
                msgs_cv[k] = Llr::new(sign, phi(val_sum));
            }
        }

        let mut c = vec![Gf2::ZERO; n];
        let mut totals = vec![Llr::ZERO; n];
        for i in 0..n {
            let mut sum = Llr::ZERO;
            for &k in &col_edges[i] {
                sum += msgs_cv[k];
            }
            totals[i] = sum + r[i];
            c[i] = totals[i].alpha();
        }

        if iteration == max_iters || syndrome_matches(h, &c, syndrome) {
            return c;
        }

        for i in 0..n {
            for &k in &col_edges[i] {
                let mut sum = Llr::ZERO;
                for &k_other in &col_edges[i] {
                    if k_other != k {
                        sum += msgs_cv[k_other];
                    }
                }
                msgs_vc[k] = sum + r[i];
            }
        }
        iteration += 1;
    }
}

/// Decodes with the sum-product algorithm in sign/magnitude form.
///
/// # Panics
///
/// Panics if `r.len() != h.cols()`.
pub fn decode_sum_product_llr(h: &SparseBitMatrix, r: &[Llr], max_iters: usize) -> Vec<Gf2> {
    sum_product_llr_core(h, r, None, max_iters)
}

/// Sum-product decoding toward a target syndrome: converges to a vector `c`
/// with `H·c == s` rather than to a codeword.
///
/// # Panics
///
/// Panics if `r.len() != h.cols()` or `s.len() != h.rows()`.
pub fn decode_sum_product_to_syndrome(
    h: &SparseBitMatrix,
    r: &[Llr],
    s: &[Gf2],
    max_iters: usize,
) -> Vec<Gf2> {
    assert_eq!(s.len(), h.rows(), "syndrome length must match check count");
    sum_product_llr_core(h, r, Some(s), max_iters)
}

// ---------------------------------------------------------------------------
// Normalized min-sum
// ---------------------------------------------------------------------------

/// Decodes with normalized min-sum in the direct per-edge form: for every
/// edge the minimum over the *other* incoming magnitudes is recomputed.
///
/// # Panics
///
/// Panics if `r.len() != h.cols()`.
pub fn decode_normalized_min_sum(
    h: &SparseBitMatrix,
    r: &[Llr],
    scale: f64,
    max_iters: usize,
) -> Vec<Gf2> {
    let m = h.rows();
    let n = h.cols();
    assert_eq!(r.len(), n, "belief length must match variable count");

    let row_ptr = h.row_ptr();
    let col_idx = h.col_indices();
    let col_edges = column_edges(h);

    let mut msgs_vc = vec![Llr::ZERO; h.nnz()];
    let mut msgs_cv = vec![Llr::ZERO; h.nnz()];
    for (k, &i) in col_idx.iter().enumerate() {
        msgs_vc[k] = r[i];
    }

    let mut iteration = 0usize;
    loop {
        trace!(iteration, "min-sum check update");
        for j in 0..m {
            let range = row_ptr[j]..row_ptr[j + 1];
            for k in range.clone() {
                let mut sign = Gf2::ZERO;
                // Seeded from the row's first incoming magnitude.
                let mut min_val = msgs_vc[range.start].beta();
                for k_other in range.clone() {
                    if k_other != k {
                        if msgs_vc[k_other].beta() < min_val {
                            min_val = msgs_vc[k_other].beta();
                        }
                        sign += msgs_vc[k_other].alpha();
                    }
                }
                msgs_cv[k] = Llr::new(sign, min_val * scale);
            }
        }

        let mut c = vec![Gf2::ZERO; n];
        let mut totals = vec![Llr::ZERO; n];
        for i in 0..n {
            let mut sum = Llr::ZERO;
            for &k in &col_edges[i] {
                sum += msgs_cv[k];
            }
            totals[i] = sum + r[i];
            c[i] = totals[i].alpha();
        }

        if iteration == max_iters || syndrome_matches(h, &c, None) {
            return c;
        }

        for i in 0..n {
            for &k in &col_edges[i] {
                let mut sum = Llr::ZERO;
                for &k_other in &col_edges[i] {
                    if k_other != k {
                        sum += msgs_cv[k_other];
                    }
                }
                msgs_vc[k] = sum + r[i];
            }
        }
        iteration += 1;
    }
}

/// The fast check-update formulation shared by the flooding min-sum
/// variants: the two smallest magnitudes and the overall sign are found
/// once per check per iteration and reused for every outgoing edge.
fn nms_fast_core(
    h: &SparseBitMatrix,
    row_ptr: &[usize],
    col_idx: &[usize],
    msgs_vc: &mut [Llr],
    msgs_cv: &mut [Llr],
    r: &[Llr],
    syndrome: Option<&[Gf2]>,
    scale: f64,
    max_iters: usize,
) -> Result<Vec<Gf2>, DecodeError> {
    let m = row_ptr.len() - 1;
    let n = r.len();

    for (k, &i) in col_idx.iter().enumerate() {
        msgs_vc[k] = r[i];
    }

    let mut iteration = 0usize;
    loop {
        trace!(iteration, "min-sum two-minima check update");
        for j in 0..m {
            let range = row_ptr[j]..row_ptr[j + 1];
            let (min_1, min_2, min_1_pos) =
                find_two_mins_tracked(msgs_vc, range.clone(), col_idx, j)?;
            let sign_all = overall_sign(msgs_vc, range.clone());
            let s_j = syndrome.map_or(Gf2::ZERO, |s| s[j]);
            for k in range {
                let base = if col_idx[k] == min_1_pos { min_2 } else { min_1 };
                // Adding the edge's own sign removes it from the overall sum.
                msgs_cv[k] = Llr::new(msgs_vc[k].alpha() + sign_all + s_j, base * scale);
            }
        }

        let mut totals = vec![Llr::ZERO; n];
        for (k, &i) in col_idx.iter().enumerate() {
            totals[i] += msgs_cv[k];
        }
        for (total, &belief) in totals.iter_mut().zip(r.iter()) {
            *total += belief;
        }
        let c: Vec<Gf2> = totals.iter().map(|l| l.alpha()).collect();

        if iteration == max_iters || syndrome_matches(h, &c, syndrome) {
            return Ok(c);
        }

        // Extrinsic update: the column total minus the edge's own message.
        for (k, &i) in col_idx.iter().enumerate() {
            msgs_vc[k] = totals[i] - msgs_cv[k];
        }
        iteration += 1;
    }
}

/// Decodes with normalized min-sum using the two-minima formulation.
///
/// Fails with [`DecodeError::MinPositionNotFound`] if a check has no
/// incident edges.
///
/// # Panics
///
/// Panics if `r.len() != h.cols()`.
pub fn decode_normalized_min_sum_fast(
    h: &SparseBitMatrix,
    r: &[Llr],
    scale: f64,
    max_iters: usize,
) -> Result<Vec<Gf2>, DecodeError> {
    assert_eq!(r.len(), h.cols(), "belief length must match variable count");
    let mut msgs_vc = vec![Llr::ZERO; h.nnz()];
    let mut msgs_cv = vec![Llr::ZERO; h.nnz()];
    nms_fast_core(
        h,
        h.row_ptr(),
        h.col_indices(),
        &mut msgs_vc,
        &mut msgs_cv,
        r,
        None,
        scale,
        max_iters,
    )
}

/// Normalized min-sum decoding toward a target syndrome.
///
/// # Panics
///
/// Panics if `r.len() != h.cols()` or `s.len() != h.rows()`.
pub fn decode_nms_to_syndrome(
    h: &SparseBitMatrix,
    r: &[Llr],
    s: &[Gf2],
    scale: f64,
    max_iters: usize,
) -> Result<Vec<Gf2>, DecodeError> {
    assert_eq!(r.len(), h.cols(), "belief length must match variable count");
    assert_eq!(s.len(), h.rows(), "syndrome length must match check count");
    let mut msgs_vc = vec![Llr::ZERO; h.nnz()];
    let mut msgs_cv = vec![Llr::ZERO; h.nnz()];
    nms_fast_core(
        h,
        h.row_ptr(),
        h.col_indices(),
        &mut msgs_vc,
        &mut msgs_cv,
        r,
        Some(s),
        scale,
        max_iters,
    )
}

/// Normalized min-sum decoding toward a target syndrome inside one
/// memory-manager slot: no allocation happens for the message matrices,
/// which live in the slot's pre-allocated buffers and are overwritten on
/// every call.
///
/// # Panics
///
/// Panics if the belief or syndrome length does not match `h`, or if the
/// slot was allocated for a matrix with a different sparsity pattern.
pub fn decode_nms_to_syndrome_in_slot(
    h: &SparseBitMatrix,
    r: &[Llr],
    s: &[Gf2],
    slot: &mut SlotView<'_>,
    scale: f64,
    max_iters: usize,
) -> Result<Vec<Gf2>, DecodeError> {
    assert_eq!(r.len(), h.cols(), "belief length must match variable count");
    assert_eq!(s.len(), h.rows(), "syndrome length must match check count");
    assert_eq!(
        slot.nnz(),
        h.nnz(),
        "slot was allocated for a different matrix"
    );
    assert_eq!(
        slot.checks(),
        h.rows(),
        "slot was allocated for a different matrix"
    );

    let (row_ptr, col_idx, msgs_vc, msgs_cv) = slot.parts();
    nms_fast_core(
        h, row_ptr, col_idx, msgs_vc, msgs_cv, r, Some(s), scale, max_iters,
    )
}

// ---------------------------------------------------------------------------
// Layered normalized min-sum
// ---------------------------------------------------------------------------

pub(crate) fn layered_core(
    h: &SparseBitMatrix,
    r: &[Llr],
    syndrome: Option<&[Gf2]>,
    layer_size: usize,
    scale: f64,
    max_iters: usize,
    tol: f64,
) -> Result<Vec<Gf2>, DecodeError> {
    let m = h.rows();
    let n = h.cols();
    assert_eq!(r.len(), n, "belief length must match variable count");

    if layer_size == 0 || m % layer_size != 0 {
        return Err(DecodeError::LayerSizeMismatch {
            checks: m,
            layer_size,
        });
    }
    let layers = m / layer_size;

    let row_ptr = h.row_ptr();
    let col_idx = h.col_indices();

    // Layer messages over H's sparsity pattern, and the running belief
    // that every layer reads and writes in turn.
    let mut msgs = vec![Llr::ZERO; h.nnz()];
    let mut belief: Vec<Llr> = r.to_vec();

    let mut iteration = 0usize;
    loop {
        for layer in 0..layers {
            let checks = layer * layer_size..(layer + 1) * layer_size;
            trace!(iteration, layer, "layered min-sum layer update");

            // Subtract the layer's previous contribution.
            for j in checks.clone() {
                for k in row_ptr[j]..row_ptr[j + 1] {
                    belief[col_idx[k]] -= msgs[k];
                }
            }

            // Re-initialize the layer from the updated running belief.
            for j in checks.clone() {
                for k in row_ptr[j]..row_ptr[j + 1] {
                    msgs[k] = belief[col_idx[k]];
                }
            }

            // Min kernel.
            for j in checks.clone() {
                let range = row_ptr[j]..row_ptr[j + 1];
                let (min_1, min_2, min_1_pos) =
                    find_two_mins_tol(&msgs, range.clone(), col_idx, tol, j)?;
                let sign_all = overall_sign(&msgs, range.clone());
                let s_j = syndrome.map_or(Gf2::ZERO, |s| s[j]);
                for k in range {
                    let base = if col_idx[k] == min_1_pos { min_2 } else { min_1 };
                    msgs[k] = Llr::new(msgs[k].alpha() + sign_all + s_j, base * scale);
                }
            }

            // Add the new contribution back.
            for j in checks.clone() {
                for k in row_ptr[j]..row_ptr[j + 1] {
                    belief[col_idx[k]] += msgs[k];
                }
            }

            // Hard decision and termination after every layer, so a
            // mid-iteration match returns immediately.
            let c: Vec<Gf2> = belief.iter().map(|l| l.alpha()).collect();
            if iteration == max_iters || syndrome_matches(h, &c, syndrome) {
                return Ok(c);
            }
        }
        iteration += 1;
    }
}

/// Decodes with layered normalized min-sum: checks are processed in
/// contiguous layers of `layer_size` rows, each layer seeing the running
/// belief already updated by the layers before it.
///
/// Fails with [`DecodeError::LayerSizeMismatch`] if `layer_size` does not
/// evenly divide the check count.
///
/// # Panics
///
/// Panics if `r.len() != h.cols()`.
pub fn decode_layered_normalized_min_sum(
    h: &SparseBitMatrix,
    r: &[Llr],
    layer_size: usize,
    scale: f64,
    max_iters: usize,
) -> Result<Vec<Gf2>, DecodeError> {
    layered_core(
        h,
        r,
        None,
        layer_size,
        scale,
        max_iters,
        DEFAULT_MIN_TOLERANCE,
    )
}

/// Layered normalized min-sum decoding toward a target syndrome.
///
/// # Panics
///
/// Panics if `r.len() != h.cols()` or `s.len() != h.rows()`.
pub fn decode_lnms_to_syndrome(
    h: &SparseBitMatrix,
    r: &[Llr],
    s: &[Gf2],
    layer_size: usize,
    scale: f64,
    max_iters: usize,
) -> Result<Vec<Gf2>, DecodeError> {
    assert_eq!(s.len(), h.rows(), "syndrome length must match check count");
    layered_core(
        h,
        r,
        Some(s),
        layer_size,
        scale,
        max_iters,
        DEFAULT_MIN_TOLERANCE,
    )
}

// ---------------------------------------------------------------------------
// Selector dispatch
// ---------------------------------------------------------------------------

/// Decodes toward the zero codeword with the selected algorithm.
///
/// `MinSum` and `LayeredMinSum` run the normalized kernels with scale 1;
/// the layered selectors require `opts.layer_size` and fail with
/// [`DecodeError::MissingLayerSize`] without one.
///
/// # Panics
///
/// Panics if `r.len() != h.cols()`.
pub fn decode(
    h: &SparseBitMatrix,
    r: &[Llr],
    algorithm: Algorithm,
    opts: &DecodeOptions,
) -> Result<Vec<Gf2>, DecodeError> {
    match algorithm {
        Algorithm::SumProduct => Ok(decode_sum_product_llr(h, r, opts.max_iters)),
        Algorithm::MinSum => decode_normalized_min_sum_fast(h, r, 1.0, opts.max_iters),
        Algorithm::NormalizedMinSum => {
            decode_normalized_min_sum_fast(h, r, opts.scale, opts.max_iters)
        }
        Algorithm::LayeredMinSum => {
            let layer_size = opts.layer_size.ok_or(DecodeError::MissingLayerSize)?;
            layered_core(h, r, None, layer_size, 1.0, opts.max_iters, opts.min_tolerance)
        }
        Algorithm::LayeredNormalizedMinSum => {
            let layer_size = opts.layer_size.ok_or(DecodeError::MissingLayerSize)?;
            layered_core(
                h,
                r,
                None,
                layer_size,
                opts.scale,
                opts.max_iters,
                opts.min_tolerance,
            )
        }
    }
}

/// Decodes toward the target syndrome `s` with the selected algorithm.
///
/// # Panics
///
/// Panics if `r.len() != h.cols()` or `s.len() != h.rows()`.
pub fn decode_to_syndrome(
    h: &SparseBitMatrix,
    r: &[Llr],
    s: &[Gf2],
    algorithm: Algorithm,
    opts: &DecodeOptions,
) -> Result<Vec<Gf2>, DecodeError> {
    assert_eq!(s.len(), h.rows(), "syndrome length must match check count");
    match algorithm {
        Algorithm::SumProduct => Ok(decode_sum_product_to_syndrome(h, r, s, opts.max_iters)),
        Algorithm::MinSum => decode_nms_to_syndrome(h, r, s, 1.0, opts.max_iters),
        Algorithm::NormalizedMinSum => {
            decode_nms_to_syndrome(h, r, s, opts.scale, opts.max_iters)
        }
        Algorithm::LayeredMinSum => {
            let layer_size = opts.layer_size.ok_or(DecodeError::MissingLayerSize)?;
            layered_core(h, r, Some(s), layer_size, 1.0, opts.max_iters, opts.min_tolerance)
        }
        Algorithm::LayeredNormalizedMinSum => {
            let layer_size = opts.layer_size.ok_or(DecodeError::MissingLayerSize)?;
            layered_core(
                h,
                r,
                Some(s),
                layer_size,
                opts.scale,
                opts.max_iters,
                opts.min_tolerance,
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llr::llrs_from_bits;
    use crate::memory::MessageMemory;

    fn hamming_h() -> SparseBitMatrix {
        #[rustfmt::skip]
        let data: &[u8] = &[
            1, 0, 0, 1, 1, 0, 1,
            0, 1, 0, 1, 0, 1, 1,
            0, 0, 1, 0, 1, 1, 1,
        ];
        SparseBitMatrix::from_dense(3, 7, data)
    }

    /// Systematic Hamming(7,4) encoding: parity in positions 0-2, data in 3-6.
    fn hamming_encode(msg: [u8; 4]) -> Vec<Gf2> {
        let d = msg;
        let bits = [
            d[0] ^ d[1] ^ d[3],
            d[0] ^ d[2] ^ d[3],
            d[1] ^ d[2] ^ d[3],
            d[0],
            d[1],
            d[2],
            d[3],
        ];
        bits.iter().map(|&b| Gf2::try_from(b).unwrap()).collect()
    }

    fn beliefs_for(word: &[Gf2], strength: f64) -> Vec<Llr> {
        word.iter()
            .map(|b| Llr::from(if b.is_one() { -strength } else { strength }))
            .collect()
    }

    fn all_variants_plain(h: &SparseBitMatrix, r: &[Llr], max_iters: usize) -> Vec<Vec<Gf2>> {
        let r_f64: Vec<f64> = r.iter().map(|l| l.to_f64()).collect();
        vec![
            decode_sum_product(h, &r_f64, max_iters),
            decode_sum_product_llr(h, r, max_iters),
            decode_normalized_min_sum(h, r, 0.8, max_iters),
            decode_normalized_min_sum_fast(h, r, 0.8, max_iters).unwrap(),
            decode_layered_normalized_min_sum(h, r, 1, 0.8, max_iters).unwrap(),
        ]
    }

    #[test]
    fn test_all_variants_decode_zero_word_in_one_round() {
        let h = hamming_h();
        let r = beliefs_for(&[Gf2::ZERO; 7], 5.0);
        // With the cap at zero every variant performs exactly one
        // check/variable round and must already be correct.
        for (v, c) in all_variants_plain(&h, &r, 0).into_iter().enumerate() {
            assert_eq!(c, vec![Gf2::ZERO; 7], "variant {v}");
        }
    }

    #[test]
    fn test_sum_product_decodes_nontrivial_codeword() {
        let h = hamming_h();
        let cw = hamming_encode([1, 0, 1, 0]);
        let r = beliefs_for(&cw, 5.0);

        assert_eq!(decode_sum_product_llr(&h, &r, 50), cw);
        let r_f64: Vec<f64> = r.iter().map(|l| l.to_f64()).collect();
        assert_eq!(decode_sum_product(&h, &r_f64, 50), cw);
    }

    #[test]
    fn test_sum_product_corrects_single_error() {
        let h = hamming_h();
        let cw = hamming_encode([1, 1, 0, 1]);
        let mut r = beliefs_for(&cw, 4.0);
        // Weak, wrong belief on one bit.
        r[2] = Llr::from(if cw[2].is_one() { 1.0 } else { -1.0 });

        assert_eq!(decode_sum_product_llr(&h, &r, 50), cw);
    }

    #[test]
    fn test_min_sum_variants_correct_single_error() {
        let h = hamming_h();
        let cw = hamming_encode([0, 1, 1, 0]);
        let mut r = beliefs_for(&cw, 4.0);
        r[5] = Llr::from(if cw[5].is_one() { 1.5 } else { -1.5 });

        assert_eq!(decode_normalized_min_sum(&h, &r, 0.8, 50), cw);
        assert_eq!(decode_normalized_min_sum_fast(&h, &r, 0.8, 50).unwrap(), cw);
        assert_eq!(
            decode_layered_normalized_min_sum(&h, &r, 1, 0.8, 50).unwrap(),
            cw
        );
    }

    #[test]
    fn test_syndrome_decoding_recovers_message() {
        let h = hamming_h();
        // An arbitrary word, not a codeword: its syndrome is nonzero.
        let word: Vec<Gf2> = [1u8, 0, 0, 0, 1, 1, 0]
            .iter()
            .map(|&b| Gf2::try_from(b).unwrap())
            .collect();
        let s = h.mul_vec(&word);
        assert!(s.iter().any(|b| b.is_one()));

        let r = llrs_from_bits(&word, 0.02, 0);
        assert_eq!(decode_sum_product_to_syndrome(&h, &r, &s, 50), word);
        assert_eq!(decode_nms_to_syndrome(&h, &r, &s, 1.0, 50).unwrap(), word);
        assert_eq!(
            decode_lnms_to_syndrome(&h, &r, &s, 1, 1.0, 50).unwrap(),
            word
        );
    }

    #[test]
    fn test_syndrome_decoding_in_slot_matches_allocating_variant() {
        let h = hamming_h();
        let word: Vec<Gf2> = [0u8, 1, 1, 0, 1, 0, 1]
            .iter()
            .map(|&b| Gf2::try_from(b).unwrap())
            .collect();
        let s = h.mul_vec(&word);
        let r = llrs_from_bits(&word, 0.05, 0);

        let expected = decode_nms_to_syndrome(&h, &r, &s, 0.9, 50).unwrap();

        let mut memory = MessageMemory::new(&h, 2);
        let mut views = memory.slot_views();
        let got = decode_nms_to_syndrome_in_slot(&h, &r, &s, &mut views[1], 0.9, 50).unwrap();
        assert_eq!(got, expected);
        assert_eq!(got, word);
    }

    #[test]
    fn test_slot_reuse_across_sequential_trials() {
        let h = hamming_h();
        let mut memory = MessageMemory::new(&h, 1);
        for bits in 0u8..8 {
            let word: Vec<Gf2> = (0..7)
                .map(|i| Gf2::from((bits >> (i % 3)) & 1 == 1))
                .collect();
            let s = h.mul_vec(&word);
            let r = llrs_from_bits(&word, 0.03, 0);
            let mut views = memory.slot_views();
            let got = decode_nms_to_syndrome_in_slot(&h, &r, &s, &mut views[0], 1.0, 50).unwrap();
            assert_eq!(got, word, "trial {bits}");
        }
    }

    #[test]
    fn test_termination_guarantee_under_conflicting_beliefs() {
        let h = hamming_h();
        // Near-zero alternating beliefs give the decoders nothing to work
        // with; they must still return once the cap is hit.
        let r: Vec<Llr> = (0..7)
            .map(|i| Llr::from(if i % 2 == 0 { 0.01 } else { -0.01 }))
            .collect();
        for c in all_variants_plain(&h, &r, 3) {
            assert_eq!(c.len(), 7);
        }
    }

    #[test]
    fn test_layer_size_mismatch_is_config_error() {
        let h = hamming_h(); // 3 checks
        let r = beliefs_for(&[Gf2::ZERO; 7], 2.0);
        assert_eq!(
            decode_layered_normalized_min_sum(&h, &r, 2, 1.0, 50),
            Err(DecodeError::LayerSizeMismatch {
                checks: 3,
                layer_size: 2
            })
        );
        assert_eq!(
            decode_layered_normalized_min_sum(&h, &r, 0, 1.0, 50),
            Err(DecodeError::LayerSizeMismatch {
                checks: 3,
                layer_size: 0
            })
        );
        // A dividing layer size works.
        assert!(decode_layered_normalized_min_sum(&h, &r, 3, 1.0, 50).is_ok());
    }

    #[test]
    fn test_empty_check_is_degeneracy_error() {
        let h = SparseBitMatrix::from_rows(2, &[vec![0, 1], vec![]]);
        let r = vec![Llr::from(1.0); 2];
        assert_eq!(
            decode_normalized_min_sum_fast(&h, &r, 1.0, 10),
            Err(DecodeError::MinPositionNotFound { check: 1 })
        );
    }

    #[test]
    fn test_find_two_mins_with_tied_minima() {
        let msgs: Vec<Llr> = [3.0, 1.0, 1.0, 5.0].iter().map(|&v| Llr::from(v)).collect();
        let col_idx = [0usize, 1, 2, 3];

        let (m1, m2, pos) = find_two_mins_tracked(&msgs, 0..4, &col_idx, 0).unwrap();
        assert_eq!((m1, m2), (1.0, 1.0));
        assert!(pos == 1 || pos == 2, "position must point at a tied minimum");

        let (m1, m2, pos) =
            find_two_mins_tol(&msgs, 0..4, &col_idx, DEFAULT_MIN_TOLERANCE, 0).unwrap();
        assert_eq!((m1, m2), (1.0, 1.0));
        assert!(pos == 1 || pos == 2, "position must point at a tied minimum");
    }

    #[test]
    fn test_find_two_mins_distinct_values() {
        let msgs: Vec<Llr> = [4.0, 0.5, 2.0].iter().map(|&v| Llr::from(v)).collect();
        let col_idx = [5usize, 6, 7];

        let (m1, m2, pos) = find_two_mins_tracked(&msgs, 0..3, &col_idx, 0).unwrap();
        assert_eq!((m1, m2, pos), (0.5, 2.0, 6));

        let (m1, m2, pos) =
            find_two_mins_tol(&msgs, 0..3, &col_idx, DEFAULT_MIN_TOLERANCE, 0).unwrap();
        assert_eq!((m1, m2, pos), (0.5, 2.0, 6));
    }

    #[test]
    fn test_find_two_mins_empty_row_fails() {
        let msgs: Vec<Llr> = vec![];
        assert_eq!(
            find_two_mins_tracked(&msgs, 0..0, &[], 4),
            Err(DecodeError::MinPositionNotFound { check: 4 })
        );
        assert_eq!(
            find_two_mins_tol(&msgs, 0..0, &[], 1e-6, 4),
            Err(DecodeError::MinPositionNotFound { check: 4 })
        );
    }

    #[test]
    fn test_hard_decision_signs() {
        let bits = hard_decision(&[1.0, -2.0, 0.0, -0.001, 7.0]);
        let expected: Vec<Gf2> = [0u8, 1, 0, 1, 0]
            .iter()
            .map(|&b| Gf2::try_from(b).unwrap())
            .collect();
        assert_eq!(bits, expected);
    }

    #[test]
    fn test_dispatch_min_sum_equals_unit_scale_nms() {
        let h = hamming_h();
        let cw = hamming_encode([1, 0, 0, 1]);
        let r = beliefs_for(&cw, 3.0);

        let opts = DecodeOptions {
            scale: 1.0,
            ..DecodeOptions::default()
        };
        let ms = decode(&h, &r, Algorithm::MinSum, &opts).unwrap();
        let nms = decode(&h, &r, Algorithm::NormalizedMinSum, &opts).unwrap();
        assert_eq!(ms, nms);
        assert_eq!(ms, cw);
    }

    #[test]
    fn test_dispatch_layered_requires_layer_size() {
        let h = hamming_h();
        let r = beliefs_for(&[Gf2::ZERO; 7], 2.0);
        let opts = DecodeOptions::default();
        assert_eq!(
            decode(&h, &r, Algorithm::LayeredMinSum, &opts),
            Err(DecodeError::MissingLayerSize)
        );
        assert_eq!(
            decode(&h, &r, Algorithm::LayeredNormalizedMinSum, &opts),
            Err(DecodeError::MissingLayerSize)
        );

        let opts = DecodeOptions {
            layer_size: Some(1),
            scale: 0.75,
            ..DecodeOptions::default()
        };
        assert_eq!(
            decode(&h, &r, Algorithm::LayeredNormalizedMinSum, &opts).unwrap(),
            vec![Gf2::ZERO; 7]
        );
    }

    #[test]
    fn test_dispatch_to_syndrome_all_algorithms() {
        let h = hamming_h();
        let word: Vec<Gf2> = [1u8, 1, 0, 0, 1, 0, 1]
            .iter()
            .map(|&b| Gf2::try_from(b).unwrap())
            .collect();
        let s = h.mul_vec(&word);
        let r = llrs_from_bits(&word, 0.02, 0);

        let opts = DecodeOptions {
            layer_size: Some(1),
            scale: 0.9,
            ..DecodeOptions::default()
        };
        for algorithm in [
            Algorithm::SumProduct,
            Algorithm::MinSum,
            Algorithm::NormalizedMinSum,
            Algorithm::LayeredMinSum,
            Algorithm::LayeredNormalizedMinSum,
        ] {
            let c = decode_to_syndrome(&h, &r, &s, algorithm, &opts).unwrap();
            assert_eq!(c, word, "algorithm {algorithm:?}");
        }
    }

    #[test]
    fn test_scaled_min_sum_decodes() {
        let h = hamming_h();
        let cw = hamming_encode([1, 1, 1, 1]);
        let r = beliefs_for(&cw, 5.0);
        assert_eq!(decode_normalized_min_sum_fast(&h, &r, 0.75, 50).unwrap(), cw);
    }

    #[test]
    fn test_augmented_matrix_syndrome_decoding() {
        // Reconciliation over an identity-augmented code: the appended
        // columns carry one known parity bit per check.
        let h = hamming_h().augment_with_identity();
        let word: Vec<Gf2> = (0..10).map(|i| Gf2::from(i % 3 == 0)).collect();
        let s = h.mul_vec(&word);
        let r = llrs_from_bits(&word, 0.02, 0);
        assert_eq!(decode_nms_to_syndrome(&h, &r, &s, 1.0, 50).unwrap(), word);
    }

    #[test]
    #[should_panic(expected = "belief length must match variable count")]
    fn test_belief_length_mismatch_panics() {
        decode_sum_product_llr(&hamming_h(), &[Llr::from(1.0)], 10);
    }

    #[test]
    #[should_panic(expected = "syndrome length must match check count")]
    fn test_syndrome_length_mismatch_panics() {
        let h = hamming_h();
        let r = vec![Llr::from(1.0); 7];
        decode_nms_to_syndrome(&h, &r, &[Gf2::ZERO], 1.0, 10).unwrap();
    }
}
