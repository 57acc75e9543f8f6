//! Half-precision ("complex32") to complex64 widening

use crate::types::{ComplexHalf, SarComplex};
use ndarray::{ArrayD, ArrayViewD};

/// Widen a single complex32 sample to complex64.
///
/// Every finite f16 is exactly representable as f32, so this is lossless;
/// infinities and NaN carry over unchanged.
#[inline]
pub fn widen(z: ComplexHalf) -> SarComplex {
    SarComplex::new(z.re.to_f32(), z.im.to_f32())
}

/// Widen an array of complex32 samples to complex64
pub fn widen_complex32(samples: ArrayViewD<'_, ComplexHalf>) -> ArrayD<SarComplex> {
    log::debug!("Widening {} complex32 samples", samples.len());
    samples.mapv(widen)
}
