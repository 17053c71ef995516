//! Fixed-dimension vector quantizer used to build 16bpp and paletted
//! texture codebooks: a split-and-relocate variant of LBG/Lloyd clustering,
//! with a run-length compression pre-pass over near-duplicate samples.

mod quantizer;
mod vector;

pub use quantizer::{CodeUsage, VectorQuantizer};
pub use vector::{compress, Vector, WeightedVector};
