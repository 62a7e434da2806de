//! # QKR Core — LDPC decoding for key reconciliation
//!
//! This crate implements the decoding core of a quantum-key-distribution
//! reconciliation pipeline: sparse binary parity-check matrices and their
//! Tanner-graph adjacency, quasi-cyclic lifting of 5G-NR-style base graphs,
//! the alist interchange format, a pre-allocated message-buffer arena for
//! concurrent trials, and the iterative message-passing decoder family —
//! sum-product, normalized min-sum, layered normalized min-sum, and their
//! syndrome-targeted variants.
//!
//! ## Decoding flow
//!
//! ```text
//! alist file → SparseBitMatrix → (optional) lift + shift
//!            → adjacency + MessageMemory → decoder variant
//!            → decoded vector, checked against a syndrome or zero
//! ```
//!
//! ## Example
//!
//! ```rust
//! use qkr_core::prelude::*;
//!
//! // A small parity-check matrix and a noisy-key reconciliation round.
//! let h = SparseBitMatrix::from_dense(
//!     3, 7,
//!     &[
//!         1, 0, 0, 1, 1, 0, 1,
//!         0, 1, 0, 1, 0, 1, 1,
//!         0, 0, 1, 0, 1, 1, 1,
//!     ],
//! );
//!
//! // The remote side sends the syndrome of its key.
//! let key: Vec<Gf2> = (0..7).map(|i| Gf2::from(i % 2 == 0)).collect();
//! let syndrome = h.mul_vec(&key);
//!
//! // The local side decodes its beliefs toward that syndrome.
//! let beliefs = llrs_from_bits(&key, 0.02, 0);
//! let decoded = decode_to_syndrome(
//!     &h,
//!     &beliefs,
//!     &syndrome,
//!     Algorithm::NormalizedMinSum,
//!     &DecodeOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(decoded, key);
//! ```

pub mod alist;
pub mod decoder;
pub mod gf2;
pub mod lifting;
pub mod llr;
pub mod memory;
pub mod observe;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod sparse;

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::alist::{read_alist, write_alist, AlistMatrix};
    pub use crate::decoder::{
        decode, decode_to_syndrome, hard_decision, Algorithm, DecodeError, DecodeOptions,
    };
    pub use crate::gf2::Gf2;
    pub use crate::lifting::{enhance_from_base, shift_eyes, BaseGraph, ShiftMode};
    pub use crate::llr::{llrs_from_bits, Llr};
    pub use crate::memory::MessageMemory;
    pub use crate::sparse::SparseBitMatrix;
}
