use half::f16;
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Complex-valued SAR sample type (I + jQ), numpy `complex64`
pub type SarComplex = Complex<f32>;

/// Packed half-precision complex sample ("complex32" on disk)
pub type ComplexHalf = Complex<f16>;

/// Requested frequencies and their polarizations
pub type FreqPols = BTreeMap<Frequency, Vec<Polarization>>;

/// One BFPQ-coded sample: a pair of indices into the dequantization table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BfpqCode {
    /// Real-part code
    pub r: u16,
    /// Imaginary-part code
    pub i: u16,
}

impl BfpqCode {
    pub fn new(r: u16, i: u16) -> Self {
        Self { r, i }
    }
}

/// Element type of a stored dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Pair of f32 (numpy `complex64`)
    Complex64,
    /// Pair of f16 (`complex32`)
    Complex32,
    /// Pair of f64 (numpy `complex128`)
    Complex128,
    /// Structured `{r: u16, i: u16}` table codes
    Bfpq,
    Float32,
    Float64,
    Int16,
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementType::Complex64 => write!(f, "complex64"),
            ElementType::Complex32 => write!(f, "complex32"),
            ElementType::Complex128 => write!(f, "complex128"),
            ElementType::Bfpq => write!(f, "bfpq{{r:u16,i:u16}}"),
            ElementType::Float32 => write!(f, "float32"),
            ElementType::Float64 => write!(f, "float64"),
            ElementType::Int16 => write!(f, "int16"),
        }
    }
}

/// Radar center-frequency band identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Frequency {
    A,
    B,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::A => write!(f, "A"),
            Frequency::B => write!(f, "B"),
        }
    }
}

impl FromStr for Frequency {
    type Err = SarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(Frequency::A),
            "B" => Ok(Frequency::B),
            _ => Err(SarError::Constraint(format!(
                "frequency {} not valid. Only [A, B] allowed.",
                s
            ))),
        }
    }
}

/// Transmit/receive polarization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Polarization {
    HH,
    HV,
    VH,
    VV,
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarization::HH => write!(f, "HH"),
            Polarization::HV => write!(f, "HV"),
            Polarization::VH => write!(f, "VH"),
            Polarization::VV => write!(f, "VV"),
        }
    }
}

impl FromStr for Polarization {
    type Err = SarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HH" => Ok(Polarization::HH),
            "HV" => Ok(Polarization::HV),
            "VH" => Ok(Polarization::VH),
            "VV" => Ok(Polarization::VV),
            _ => Err(SarError::Constraint(format!(
                "polarization {} not valid. Only [HH, HV, VH, VV] allowed.",
                s
            ))),
        }
    }
}

/// Coarse classification of a [`SarError`], mirroring how callers react to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input: paths, missing fields, constraint violations
    Value,
    /// Inconsistent workflow setup
    Runtime,
    /// Unexpected element type in a source or table; not recoverable
    TypeMismatch,
    /// Programming defect
    Internal,
    /// Underlying I/O or parse failure
    Io,
}

/// Error types for raw decoding and run-config validation
#[derive(Debug, thiserror::Error)]
pub enum SarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("{0}")]
    InvalidPath(String),

    #[error("{0}")]
    MissingField(String),

    #[error("{0}")]
    Constraint(String),

    #[error("{0}")]
    Layout(String),

    #[error("{0}")]
    Runtime(String),

    #[error("Internal invariant violated: {0}")]
    Internal(String),
}

impl SarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SarError::Io(_) | SarError::Yaml(_) => ErrorKind::Io,
            SarError::TypeMismatch(_) => ErrorKind::TypeMismatch,
            SarError::InvalidFormat(_)
            | SarError::InvalidSelection(_)
            | SarError::InvalidPath(_)
            | SarError::MissingField(_)
            | SarError::Constraint(_)
            | SarError::Layout(_) => ErrorKind::Value,
            SarError::Runtime(_) => ErrorKind::Runtime,
            SarError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for decoding and validation
pub type SarResult<T> = Result<T, SarError>;
