//! I/O modules for raw sample datasets

pub mod raw_store;
pub mod raw_decoder;

pub use raw_store::{MemoryDataset, MemoryGroup, RawArray, RawGroup, RawSamples, BFPQ_LUT_NAME};
pub use raw_decoder::{Decoding, RawDecoder};
