//! sarprep: raw SAR sample decoding and InSAR run-config validation
//!
//! Raw echo products store samples as complex64, as packed half-precision
//! pairs, or as BFPQ codes resolved through a lookup table. [`RawDecoder`]
//! reads any of these as complex64. The [`config`] module checks the
//! geocode-InSAR and rubbersheet run configs and fills their defaults.

pub mod types;
pub mod io;
pub mod core;
pub mod config;

// Re-export main types and functions for easier access
pub use types::{
    BfpqCode, ComplexHalf, ElementType, ErrorKind, FreqPols, Frequency, Polarization,
    SarComplex, SarError, SarResult,
};

pub use io::{Decoding, MemoryDataset, MemoryGroup, RawArray, RawDecoder, RawGroup, RawSamples};
pub use config::{GeocodeInsarRunConfig, RubbersheetRunConfig, RunConfig};

#[cfg(feature = "python")]
mod python {
    use crate::config::{GeocodeInsarRunConfig, RubbersheetRunConfig, RunConfig, StaticInventory};
    use crate::core::bfpq_lut::LookupTable;
    use crate::types::{BfpqCode, ErrorKind, SarError};
    use ndarray::Zip;
    use numpy::{Complex32, IntoPyArray, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
    use pyo3::exceptions::{PyAssertionError, PyIOError, PyRuntimeError, PyValueError};
    use pyo3::prelude::*;
    use std::collections::BTreeMap;

    fn to_py_err(err: SarError) -> PyErr {
        let msg = err.to_string();
        match err.kind() {
            ErrorKind::Value => PyValueError::new_err(msg),
            ErrorKind::Runtime => PyRuntimeError::new_err(msg),
            ErrorKind::TypeMismatch | ErrorKind::Internal => PyAssertionError::new_err(msg),
            ErrorKind::Io => PyIOError::new_err(msg),
        }
    }

    /// Decode 2D BFPQ codes, given as separate real and imaginary code arrays
    #[pyfunction]
    fn decode_bfpq_lut<'py>(
        py: Python<'py>,
        table: PyReadonlyArray1<'py, f32>,
        real: PyReadonlyArray2<'py, u16>,
        imag: PyReadonlyArray2<'py, u16>,
    ) -> PyResult<&'py PyArray2<Complex32>> {
        let (real, imag) = (real.as_array(), imag.as_array());
        if real.dim() != imag.dim() {
            return Err(PyValueError::new_err(format!(
                "real codes {:?} and imaginary codes {:?} differ in shape",
                real.dim(),
                imag.dim()
            )));
        }

        let codes = Zip::from(&real)
            .and(&imag)
            .map_collect(|&r, &i| BfpqCode::new(r, i));
        let table = LookupTable::from(table.as_array().to_vec());

        let decoded = py
            .allow_threads(|| crate::core::bfpq_lut::decode_bfpq_lut(&table, codes.view()))
            .map_err(to_py_err)?;
        Ok(decoded.into_pyarray(py))
    }

    /// Validate a geocode-InSAR run config; returns the normalized YAML
    #[pyfunction]
    fn validate_geocode_insar(
        run_config_path: String,
        product_freq_pols: BTreeMap<String, Vec<String>>,
    ) -> PyResult<String> {
        let inventory = StaticInventory::from_strings(&product_freq_pols).map_err(to_py_err)?;
        let cfg = RunConfig::from_path(&run_config_path).map_err(to_py_err)?;
        let checked = GeocodeInsarRunConfig::new(cfg, &inventory).map_err(to_py_err)?;
        checked.cfg.to_yaml_string().map_err(to_py_err)
    }

    /// Validate a rubbersheet run config; returns the normalized YAML
    #[pyfunction]
    fn validate_rubbersheet(run_config_path: String) -> PyResult<String> {
        let cfg = RunConfig::from_path(&run_config_path).map_err(to_py_err)?;
        let checked = RubbersheetRunConfig::new(cfg).map_err(to_py_err)?;
        checked.cfg.to_yaml_string().map_err(to_py_err)
    }

    /// Python module definition
    #[pymodule]
    fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(decode_bfpq_lut, m)?)?;
        m.add_function(wrap_pyfunction!(validate_geocode_insar, m)?)?;
        m.add_function(wrap_pyfunction!(validate_rubbersheet, m)?)?;
        Ok(())
    }
}
