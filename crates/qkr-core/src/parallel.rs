//! Parallel batch decoding over memory-manager slots.
//!
//! Enable with the `parallel` feature flag:
//!
//! ```toml
//! [dependencies]
//! qkr-core = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! A single decode is sequential; throughput comes from running independent
//! decodes concurrently, one per pre-allocated memory slot. Every worker
//! shares the read-only parity-check matrix and holds exclusive message
//! buffers, so no locking happens inside the decode loop.

use rayon::prelude::*;

use crate::decoder::{decode_nms_to_syndrome_in_slot, DecodeError};
use crate::gf2::Gf2;
use crate::llr::Llr;
use crate::memory::MessageMemory;
use crate::sparse::SparseBitMatrix;

/// Decodes a batch of (beliefs, syndrome) pairs in parallel with normalized
/// min-sum, one memory slot per job.
///
/// Results are returned in input order; a per-trial [`DecodeError`] does
/// not abort the rest of the batch.
///
/// # Panics
///
/// Panics if the batch lengths differ or the batch is larger than the
/// number of slots in `memory`.
pub fn decode_batch_to_syndrome(
    h: &SparseBitMatrix,
    beliefs: &[Vec<Llr>],
    syndromes: &[Vec<Gf2>],
    memory: &mut MessageMemory,
    scale: f64,
    max_iters: usize,
) -> Vec<Result<Vec<Gf2>, DecodeError>> {
    assert_eq!(
        beliefs.len(),
        syndromes.len(),
        "belief and syndrome batches must have equal length"
    );
    assert!(
        beliefs.len() <= memory.slots(),
        "batch of {} exceeds {} memory slots",
        beliefs.len(),
        memory.slots()
    );

    let views = memory.slot_views();
    views
        .into_par_iter()
        .zip(beliefs.par_iter().zip(syndromes.par_iter()))
        .map(|(mut slot, (r, s))| {
            decode_nms_to_syndrome_in_slot(h, r, s, &mut slot, scale, max_iters)
        })
        .collect()
}
