//! # Rayon Utilities
//!
//! [`rayon`] powered wrappers for parallel batch decoding.

mod rayon_decoder;

pub use rayon_decoder::ParallelRayonDecoder;
