//! Array-storage abstraction for raw sample datasets
//!
//! Product files keep raw echoes next to their dequantization table inside a
//! group. [`RawArray`] and [`RawGroup`] describe just enough of that layout for
//! decoding; [`MemoryDataset`] and [`MemoryGroup`] are in-memory backings.

use crate::types::{BfpqCode, ComplexHalf, ElementType, SarComplex, SarError, SarResult};
use ndarray::{ArrayD, SliceInfoElem};
use num_complex::Complex;
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the dequantization table dataset within a raw data group
pub const BFPQ_LUT_NAME: &str = "BFPQLUT";

/// Raw elements as read from storage, tagged by element type
#[derive(Debug, Clone, PartialEq)]
pub enum RawSamples {
    Complex64(ArrayD<SarComplex>),
    Complex32(ArrayD<ComplexHalf>),
    Complex128(ArrayD<Complex<f64>>),
    Bfpq(ArrayD<BfpqCode>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Int16(ArrayD<i16>),
}

impl RawSamples {
    pub fn dtype(&self) -> ElementType {
        match self {
            RawSamples::Complex64(_) => ElementType::Complex64,
            RawSamples::Complex32(_) => ElementType::Complex32,
            RawSamples::Complex128(_) => ElementType::Complex128,
            RawSamples::Bfpq(_) => ElementType::Bfpq,
            RawSamples::Float32(_) => ElementType::Float32,
            RawSamples::Float64(_) => ElementType::Float64,
            RawSamples::Int16(_) => ElementType::Int16,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            RawSamples::Complex64(a) => a.shape(),
            RawSamples::Complex32(a) => a.shape(),
            RawSamples::Complex128(a) => a.shape(),
            RawSamples::Bfpq(a) => a.shape(),
            RawSamples::Float32(a) => a.shape(),
            RawSamples::Float64(a) => a.shape(),
            RawSamples::Int16(a) => a.shape(),
        }
    }

    /// Slice every variant the same way. `selection` must already be checked.
    fn slice(&self, selection: &[SliceInfoElem]) -> RawSamples {
        fn cut<A: Clone>(a: &ArrayD<A>, selection: &[SliceInfoElem]) -> ArrayD<A> {
            a.slice(selection).to_owned()
        }

        match self {
            RawSamples::Complex64(a) => RawSamples::Complex64(cut(a, selection)),
            RawSamples::Complex32(a) => RawSamples::Complex32(cut(a, selection)),
            RawSamples::Complex128(a) => RawSamples::Complex128(cut(a, selection)),
            RawSamples::Bfpq(a) => RawSamples::Bfpq(cut(a, selection)),
            RawSamples::Float32(a) => RawSamples::Float32(cut(a, selection)),
            RawSamples::Float64(a) => RawSamples::Float64(cut(a, selection)),
            RawSamples::Int16(a) => RawSamples::Int16(cut(a, selection)),
        }
    }
}

impl From<ArrayD<SarComplex>> for RawSamples {
    fn from(a: ArrayD<SarComplex>) -> Self {
        RawSamples::Complex64(a)
    }
}

impl From<ArrayD<ComplexHalf>> for RawSamples {
    fn from(a: ArrayD<ComplexHalf>) -> Self {
        RawSamples::Complex32(a)
    }
}

impl From<ArrayD<BfpqCode>> for RawSamples {
    fn from(a: ArrayD<BfpqCode>) -> Self {
        RawSamples::Bfpq(a)
    }
}

impl From<ArrayD<f32>> for RawSamples {
    fn from(a: ArrayD<f32>) -> Self {
        RawSamples::Float32(a)
    }
}

impl From<ArrayD<f64>> for RawSamples {
    fn from(a: ArrayD<f64>) -> Self {
        RawSamples::Float64(a)
    }
}

/// A stored N-dimensional array of raw elements
pub trait RawArray: Send + Sync {
    fn shape(&self) -> &[usize];

    fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Element type as stored
    fn dtype(&self) -> ElementType;

    /// Read the elements picked out by `selection` (one entry per axis,
    /// `NewAxis` entries aside).
    fn read(&self, selection: &[SliceInfoElem]) -> SarResult<RawSamples>;

    /// Read the whole array
    fn read_all(&self) -> SarResult<RawSamples> {
        let full = vec![SliceInfoElem::from(..); self.ndim()];
        self.read(&full)
    }
}

/// Container holding raw datasets side by side
pub trait RawGroup {
    fn dataset(&self, name: &str) -> Option<Arc<dyn RawArray>>;

    fn contains(&self, name: &str) -> bool {
        self.dataset(name).is_some()
    }
}

/// Validate a selection against a shape, returning the rank of the result.
///
/// ndarray panics on out-of-bounds slicing; this turns the same checks into
/// errors.
pub fn check_selection(shape: &[usize], selection: &[SliceInfoElem]) -> SarResult<usize> {
    let in_ndim = selection
        .iter()
        .filter(|elem| !matches!(elem, SliceInfoElem::NewAxis))
        .count();
    if in_ndim != shape.len() {
        return Err(SarError::InvalidSelection(format!(
            "selection addresses {} axes but array has {}",
            in_ndim,
            shape.len()
        )));
    }

    let mut out_ndim = 0;
    let mut axis = 0;
    for elem in selection {
        match *elem {
            SliceInfoElem::NewAxis => out_ndim += 1,
            SliceInfoElem::Index(index) => {
                let len = shape[axis];
                let abs = if index < 0 { index + len as isize } else { index };
                if abs < 0 || abs as usize >= len {
                    return Err(SarError::InvalidSelection(format!(
                        "index {} out of bounds for axis {} of length {}",
                        index, axis, len
                    )));
                }
                axis += 1;
            }
            SliceInfoElem::Slice { start, end, step } => {
                let len = shape[axis];
                if step == 0 {
                    return Err(SarError::InvalidSelection(format!(
                        "zero step on axis {}",
                        axis
                    )));
                }
                let abs = |i: isize| if i < 0 { i + len as isize } else { i };
                let start_abs = abs(start);
                let end_abs = end.map(abs).unwrap_or(len as isize);
                if start_abs < 0 || start_abs as usize > len || end_abs < 0 || end_abs as usize > len {
                    return Err(SarError::InvalidSelection(format!(
                        "slice {}..{:?} out of bounds for axis {} of length {}",
                        start, end, axis, len
                    )));
                }
                out_ndim += 1;
                axis += 1;
            }
        }
    }

    Ok(out_ndim)
}

/// Raw dataset held entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryDataset {
    data: RawSamples,
}

impl MemoryDataset {
    pub fn new(data: impl Into<RawSamples>) -> Self {
        Self { data: data.into() }
    }
}

impl RawArray for MemoryDataset {
    fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    fn dtype(&self) -> ElementType {
        self.data.dtype()
    }

    fn read(&self, selection: &[SliceInfoElem]) -> SarResult<RawSamples> {
        check_selection(self.shape(), selection)?;
        Ok(self.data.slice(selection))
    }

    fn read_all(&self) -> SarResult<RawSamples> {
        Ok(self.data.clone())
    }
}

/// Group of named in-memory datasets
#[derive(Default, Clone)]
pub struct MemoryGroup {
    datasets: HashMap<String, Arc<dyn RawArray>>,
}

impl MemoryGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset, returning the shared handle stored in the group
    pub fn insert(&mut self, name: impl Into<String>, dataset: impl RawArray + 'static) -> Arc<dyn RawArray> {
        let handle: Arc<dyn RawArray> = Arc::new(dataset);
        self.datasets.insert(name.into(), Arc::clone(&handle));
        handle
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }
}

impl RawGroup for MemoryGroup {
    fn dataset(&self, name: &str) -> Option<Arc<dyn RawArray>> {
        self.datasets.get(name).cloned()
    }
}
