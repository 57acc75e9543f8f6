//! InSAR workflow run-config loading and validation

pub mod runconfig;
pub mod helpers;
pub mod geocode_insar;
pub mod rubbersheet;

pub use runconfig::{OffsetsFilterType, RunConfig};
pub use helpers::{check_mode_directory_tree, check_product_freq_pols, FreqPolInventory, StaticInventory};
pub use geocode_insar::{GeocodeInsarRunConfig, GOFF_DATASETS, GUNW_DATASETS};
pub use rubbersheet::{OffsetsFilter, OffsetsSource, RubbersheetRunConfig};
