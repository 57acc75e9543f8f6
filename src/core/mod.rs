//! Sample decoding kernels

pub mod bfpq_lut;
pub mod half_complex;

// Re-export main types
pub use bfpq_lut::{decode_bfpq_generic, decode_bfpq_lut, LookupTable};
pub use half_complex::{widen, widen_complex32};
