//! Uniform complex64 access to raw echo datasets
//!
//! Raw data products store echoes as complex64, as half-precision pairs
//! ("complex32"), or as BFPQ codes with a lookup table kept next to the data.
//! [`RawDecoder`] hides the difference: every read returns complex64.

use crate::core::bfpq_lut::{decode_bfpq_generic, decode_bfpq_lut, LookupTable};
use crate::core::half_complex::widen_complex32;
use crate::io::raw_store::{RawArray, RawGroup, RawSamples, BFPQ_LUT_NAME};
use crate::types::{ElementType, SarComplex, SarError, SarResult};
use ndarray::{ArrayD, Ix2, SliceInfoElem};
use std::ops::Range;
use std::sync::Arc;

/// How stored samples are turned into complex64
#[derive(Debug, Clone, PartialEq)]
pub enum Decoding {
    /// Already complex64
    Passthrough,
    /// complex32 widened to complex64
    HalfPrecision,
    /// BFPQ codes resolved through the group's lookup table
    Table(LookupTable),
}

/// Decoder bound to a single raw dataset
pub struct RawDecoder {
    dataset: Arc<dyn RawArray>,
    decoding: Decoding,
    shape: Vec<usize>,
}

impl RawDecoder {
    /// Bind a decoder to `dataset`, picking the decoding from what is stored.
    ///
    /// A `BFPQLUT` dataset in `group` takes priority; it must be a 1D float32
    /// array. Otherwise the data must be complex32 or complex64.
    pub fn new(dataset: Arc<dyn RawArray>, group: &dyn RawGroup) -> SarResult<Self> {
        let decoding = if let Some(lut) = group.dataset(BFPQ_LUT_NAME) {
            let table = Self::load_table(lut.as_ref())?;
            if dataset.dtype() != ElementType::Bfpq {
                return Err(SarError::TypeMismatch(format!(
                    "raw data stored as {} cannot be decoded with a lookup table",
                    dataset.dtype()
                )));
            }
            log::info!("Decoding raw data with lookup table.");
            Decoding::Table(table)
        } else if dataset.dtype() == ElementType::Complex32 {
            log::info!("Decoding raw data from float16 encoding.");
            Decoding::HalfPrecision
        } else if dataset.dtype() == ElementType::Complex64 {
            log::info!("Decoding raw data not required");
            Decoding::Passthrough
        } else {
            return Err(SarError::TypeMismatch(format!(
                "raw data stored as {}, expected complex64, complex32 or BFPQ codes",
                dataset.dtype()
            )));
        };

        let shape = dataset.shape().to_vec();
        Ok(Self { dataset, decoding, shape })
    }

    fn load_table(lut: &dyn RawArray) -> SarResult<LookupTable> {
        if lut.dtype() != ElementType::Float32 {
            return Err(SarError::TypeMismatch(format!(
                "{} must be float32, found {}",
                BFPQ_LUT_NAME,
                lut.dtype()
            )));
        }
        if lut.ndim() != 1 {
            return Err(SarError::TypeMismatch(format!(
                "{} must be one dimensional, found shape {:?}",
                BFPQ_LUT_NAME,
                lut.shape()
            )));
        }

        match lut.read_all()? {
            RawSamples::Float32(values) => {
                log::debug!("Loaded {} entries from {}", values.len(), BFPQ_LUT_NAME);
                Ok(LookupTable::new(values.into_raw_vec()))
            }
            other => Err(SarError::Internal(format!(
                "{} declared float32 but read back {}",
                BFPQ_LUT_NAME,
                other.dtype()
            ))),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Logical element type of decoded data, always complex64
    pub fn dtype(&self) -> ElementType {
        ElementType::Complex64
    }

    /// Element type as stored on disk
    pub fn dtype_storage(&self) -> ElementType {
        self.dataset.dtype()
    }

    pub fn decoding(&self) -> &Decoding {
        &self.decoding
    }

    /// Lookup table in use, if the data is BFPQ coded
    pub fn table(&self) -> Option<&LookupTable> {
        match &self.decoding {
            Decoding::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Read and decode the samples picked out by `selection`
    pub fn read(&self, selection: &[SliceInfoElem]) -> SarResult<ArrayD<SarComplex>> {
        let raw = self.dataset.read(selection)?;

        match (&self.decoding, raw) {
            (Decoding::Passthrough, RawSamples::Complex64(z)) => Ok(z),
            (Decoding::HalfPrecision, RawSamples::Complex32(z)) => Ok(widen_complex32(z.view())),
            (Decoding::Table(table), RawSamples::Bfpq(codes)) => {
                if codes.ndim() == 2 {
                    let codes = codes
                        .into_dimensionality::<Ix2>()
                        .map_err(|e| SarError::Internal(format!("Shape error: {}", e)))?;
                    Ok(decode_bfpq_lut(table, codes.view())?.into_dyn())
                } else {
                    decode_bfpq_generic(table, codes.view())
                }
            }
            (decoding, other) => Err(SarError::Internal(format!(
                "storage returned {} for {:?} decoding",
                other.dtype(),
                decoding
            ))),
        }
    }

    /// Decode the entire dataset
    pub fn read_all(&self) -> SarResult<ArrayD<SarComplex>> {
        let full = vec![SliceInfoElem::from(..); self.ndim()];
        self.read(&full)
    }

    /// Decode a contiguous block along the first axis (e.g. a range of pulses)
    pub fn read_lines(&self, lines: Range<usize>) -> SarResult<ArrayD<SarComplex>> {
        if self.ndim() == 0 {
            return Err(SarError::InvalidSelection(
                "cannot read lines from a zero dimensional dataset".to_string(),
            ));
        }
        let mut selection = vec![SliceInfoElem::from(..); self.ndim()];
        selection[0] = SliceInfoElem::from(lines);
        self.read(&selection)
    }
}

impl std::fmt::Debug for RawDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDecoder")
            .field("shape", &self.shape)
            .field("dtype_storage", &self.dtype_storage())
            .field("decoding", &self.decoding)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::raw_store::{MemoryDataset, MemoryGroup};
    use crate::types::{BfpqCode, ComplexHalf};
    use half::f16;
    use ndarray::{s, Array, ArrayD, IxDyn};

    fn complex64_block(rows: usize, cols: usize) -> ArrayD<SarComplex> {
        Array::from_shape_fn(IxDyn(&[rows, cols]), |idx| {
            SarComplex::new(idx[0] as f32 + 0.25, -(idx[1] as f32) * 1e-3)
        })
    }

    #[test]
    fn test_passthrough() {
        let mut group = MemoryGroup::new();
        let data = complex64_block(4, 8);
        let ds = group.insert("HH", MemoryDataset::new(data.clone()));

        let decoder = RawDecoder::new(ds, &group).unwrap();
        assert_eq!(decoder.decoding(), &Decoding::Passthrough);
        assert_eq!(decoder.dtype(), ElementType::Complex64);
        assert_eq!(decoder.dtype_storage(), ElementType::Complex64);
        assert_eq!(decoder.shape(), &[4, 8]);
        assert!(decoder.table().is_none());

        let out = decoder.read(s![1..3, ..].as_ref()).unwrap();
        assert_eq!(out.shape(), &[2, 8]);
        for row in 0..2 {
            for col in 0..8 {
                assert_eq!(out[[row, col]], data[[row + 1, col]]);
            }
        }
    }

    #[test]
    fn test_half_precision() {
        let mut group = MemoryGroup::new();
        let data = Array::from_shape_fn(IxDyn(&[3, 5]), |idx| {
            ComplexHalf::new(f16::from_f32(idx[1] as f32 * 0.5), f16::from_f32(-1.5))
        });
        let ds = group.insert("HH", MemoryDataset::new(data));

        let decoder = RawDecoder::new(ds, &group).unwrap();
        assert_eq!(decoder.decoding(), &Decoding::HalfPrecision);
        assert_eq!(decoder.dtype(), ElementType::Complex64);
        assert_eq!(decoder.dtype_storage(), ElementType::Complex32);

        let out = decoder.read(s![2, ..].as_ref()).unwrap();
        assert_eq!(out.shape(), &[5]);
        assert_eq!(out[[4]], SarComplex::new(2.0, -1.5));
    }

    #[test]
    fn test_table_bound_and_shared() {
        let mut group = MemoryGroup::new();
        group.insert(BFPQ_LUT_NAME, MemoryDataset::new(Array::from_vec(vec![0.0f32, 1.0, 2.0]).into_dyn()));
        let codes = Array::from_elem(IxDyn(&[2, 2]), BfpqCode::new(1, 2));
        let ds = group.insert("HH", MemoryDataset::new(codes));

        let decoder = RawDecoder::new(ds, &group).unwrap();
        assert_eq!(decoder.dtype_storage(), ElementType::Bfpq);
        assert_eq!(decoder.table().map(|t| t.values().to_vec()), Some(vec![0.0, 1.0, 2.0]));

        let out = decoder.read_all().unwrap();
        assert!(out.iter().all(|&z| z == SarComplex::new(1.0, 2.0)));
    }

    #[test]
    fn test_table_must_be_float32() {
        let mut group = MemoryGroup::new();
        group.insert(BFPQ_LUT_NAME, MemoryDataset::new(Array::from_vec(vec![0.0f64, 1.0]).into_dyn()));
        let ds = group.insert("HH", MemoryDataset::new(Array::from_elem(IxDyn(&[2, 2]), BfpqCode::default())));

        let err = RawDecoder::new(ds, &group).unwrap_err();
        assert!(matches!(err, SarError::TypeMismatch(_)));
    }

    #[test]
    fn test_table_must_be_1d() {
        let mut group = MemoryGroup::new();
        group.insert(BFPQ_LUT_NAME, MemoryDataset::new(ArrayD::<f32>::zeros(IxDyn(&[2, 2]))));
        let ds = group.insert("HH", MemoryDataset::new(Array::from_elem(IxDyn(&[2]), BfpqCode::default())));

        assert!(matches!(RawDecoder::new(ds, &group), Err(SarError::TypeMismatch(_))));
    }

    #[test]
    fn test_unsupported_storage() {
        let mut group = MemoryGroup::new();
        let ds = group.insert("HH", MemoryDataset::new(ArrayD::<f32>::zeros(IxDyn(&[4, 4]))));
        assert!(matches!(RawDecoder::new(ds, &group), Err(SarError::TypeMismatch(_))));

        // Codes without a table are not decodable either
        let mut group = MemoryGroup::new();
        let ds = group.insert("HH", MemoryDataset::new(Array::from_elem(IxDyn(&[4]), BfpqCode::default())));
        assert!(matches!(RawDecoder::new(ds, &group), Err(SarError::TypeMismatch(_))));
    }

    #[test]
    fn test_read_lines() {
        let mut group = MemoryGroup::new();
        let data = complex64_block(10, 3);
        let ds = group.insert("HH", MemoryDataset::new(data.clone()));
        let decoder = RawDecoder::new(ds, &group).unwrap();

        let out = decoder.read_lines(4..7).unwrap();
        assert_eq!(out.shape(), &[3, 3]);
        assert_eq!(out[[0, 0]], data[[4, 0]]);

        assert!(matches!(decoder.read_lines(8..12), Err(SarError::InvalidSelection(_))));
    }
}
