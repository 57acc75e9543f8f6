//! Block floating point quantization (BFPQ) lookup-table decoding
//!
//! Raw echoes stored with BFPQ encoding hold, per sample, a pair of integer
//! codes. Each code indexes a table of f32 amplitudes, and the decoded sample
//! is `table[r] + j * table[i]`.

use crate::types::{BfpqCode, SarComplex, SarError, SarResult};
use ndarray::{Array2, ArrayD, ArrayView2, ArrayViewD, Zip};
use std::sync::Arc;

/// Immutable dequantization table, cheap to clone and share between decoders
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    values: Arc<[f32]>,
}

impl LookupTable {
    pub fn new(values: impl Into<Arc<[f32]>>) -> Self {
        Self { values: values.into() }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Shared handle to the underlying buffer
    pub fn shared(&self) -> Arc<[f32]> {
        Arc::clone(&self.values)
    }

    /// Decode a single code pair. Caller guarantees both codes are in range.
    #[inline]
    fn lookup(&self, code: BfpqCode) -> SarComplex {
        SarComplex::new(self.values[code.r as usize], self.values[code.i as usize])
    }

    /// Make sure every code in `codes` indexes into the table
    fn check_codes<'a>(&self, codes: impl IntoIterator<Item = &'a BfpqCode>) -> SarResult<()> {
        let max_code = codes
            .into_iter()
            .map(|c| c.r.max(c.i))
            .max();

        match max_code {
            Some(code) if code as usize >= self.values.len() => Err(SarError::InvalidFormat(
                format!(
                    "BFPQ code {} out of range for lookup table of length {}",
                    code,
                    self.values.len()
                ),
            )),
            _ => Ok(()),
        }
    }
}

impl From<Vec<f32>> for LookupTable {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

/// Bulk decode of a 2D block of BFPQ codes.
///
/// This is the hot path for raw echo blocks (pulses x range samples); rows
/// are decoded in parallel when the `parallel` feature is enabled.
pub fn decode_bfpq_lut(
    table: &LookupTable,
    codes: ArrayView2<'_, BfpqCode>,
) -> SarResult<Array2<SarComplex>> {
    table.check_codes(codes.iter())?;

    let (rows, cols) = codes.dim();
    log::debug!("Decoding {}x{} BFPQ block with {}-entry table", rows, cols, table.len());

    #[cfg(feature = "parallel")]
    let decoded = {
        log::debug!("Using {} threads for BFPQ decode", rayon::current_num_threads());
        Zip::from(&codes).par_map_collect(|&code| table.lookup(code))
    };

    #[cfg(not(feature = "parallel"))]
    let decoded = Zip::from(&codes).map_collect(|&code| table.lookup(code));

    Ok(decoded)
}

/// Decode BFPQ codes of any rank by direct indexing.
///
/// Functionally identical to [`decode_bfpq_lut`]; used for slices that are
/// not two dimensional (e.g. a single pulse).
pub fn decode_bfpq_generic(
    table: &LookupTable,
    codes: ArrayViewD<'_, BfpqCode>,
) -> SarResult<ArrayD<SarComplex>> {
    table.check_codes(codes.iter())?;
    Ok(codes.mapv(|code| table.lookup(code)))
}
