//! Typed InSAR run configuration
//!
//! Mirrors the `runconfig: groups:` layout of the InSAR workflow YAML. Only
//! the sections the validators look at are typed; every other key is kept in
//! an `extra` map so a normalized config serializes back without loss.

use crate::types::{FreqPols, SarResult};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Keys not modelled explicitly
pub type Extra = BTreeMap<String, Value>;

/// Whole run-config document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub runconfig: RunConfigRoot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfigRoot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub groups: Groups,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Groups {
    #[serde(default)]
    pub product_path_group: ProductPathGroup,
    #[serde(default)]
    pub processing: Processing,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPathGroup {
    /// Scratch directory shared by the InSAR steps
    #[serde(default = "default_scratch_path")]
    pub scratch_path: PathBuf,
    #[serde(flatten)]
    pub extra: Extra,
}

fn default_scratch_path() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ProductPathGroup {
    fn default() -> Self {
        Self {
            scratch_path: default_scratch_path(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Processing {
    #[serde(default)]
    pub input_subset: InputSubset,
    #[serde(default)]
    pub crossmul: Crossmul,
    #[serde(default)]
    pub geocode: Geocode,
    #[serde(default)]
    pub dense_offsets: DenseOffsets,
    #[serde(default)]
    pub offsets_product: OffsetsProduct,
    #[serde(default)]
    pub rubbersheet: Rubbersheet,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSubset {
    #[serde(default)]
    pub list_of_frequencies: FreqPols,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crossmul {
    #[serde(default = "one")]
    pub range_looks: u32,
    #[serde(default = "one")]
    pub azimuth_looks: u32,
    #[serde(flatten)]
    pub extra: Extra,
}

fn one() -> u32 {
    1
}

impl Default for Crossmul {
    fn default() -> Self {
        Self {
            range_looks: 1,
            azimuth_looks: 1,
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geocode {
    /// RUNW product to geocode when running standalone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runw_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gunw_datasets: Option<BTreeMap<String, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goff_datasets: Option<BTreeMap<String, bool>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DenseOffsets {
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetsProduct {
    #[serde(default)]
    pub enabled: bool,
    /// Everything else, including the `layer*` sections
    #[serde(flatten)]
    pub extra: Extra,
}

impl OffsetsProduct {
    /// Names of the configured offset layers (`layer1`, `layer2`, ...)
    pub fn layer_keys(&self) -> Vec<&str> {
        self.extra
            .keys()
            .filter(|key| key.starts_with("layer"))
            .map(String::as_str)
            .collect()
    }
}

/// Smoothing applied to offsets before rubbersheeting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetsFilterType {
    #[default]
    None,
    Median,
    Gaussian,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedianFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_size_range: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_size_azimuth: Option<u32>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaussianFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma_range: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma_azimuth: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rubbersheet {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub offsets_filter: OffsetsFilterType,
    #[serde(default)]
    pub median: MedianFilter,
    #[serde(default)]
    pub gaussian: GaussianFilter,
    #[serde(default)]
    pub dense_offsets_path: Option<PathBuf>,
    #[serde(default)]
    pub offsets_product_path: Option<PathBuf>,
    #[serde(default)]
    pub geo2rdr_offsets_path: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl RunConfig {
    pub fn from_yaml_str(yaml: &str) -> SarResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> SarResult<Self> {
        let path = path.as_ref();
        log::info!("Loading run config: {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> SarResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn processing(&self) -> &Processing {
        &self.runconfig.groups.processing
    }

    pub fn processing_mut(&mut self) -> &mut Processing {
        &mut self.runconfig.groups.processing
    }

    pub fn scratch_path(&self) -> &Path {
        &self.runconfig.groups.product_path_group.scratch_path
    }

    pub fn freq_pols(&self) -> &FreqPols {
        &self.processing().input_subset.list_of_frequencies
    }
}
