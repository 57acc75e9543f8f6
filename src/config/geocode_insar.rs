//! Geocode-InSAR run-config checks

use crate::config::helpers::{check_product_freq_pols, log_error, FreqPolInventory};
use crate::config::runconfig::RunConfig;
use crate::types::{FreqPols, SarError, SarResult};
use std::collections::BTreeMap;
use std::path::PathBuf;

const TARGET: &str = "geocode_insar::yaml_check";

/// GUNW layers that are geocoded unless switched off
pub const GUNW_DATASETS: [&str; 8] = [
    "connected_components",
    "coherence_magnitude",
    "ionosphere_phase_screen",
    "ionosphere_phase_screen_uncertainty",
    "unwrapped_phase",
    "along_track_offset",
    "slant_range_offset",
    "layover_shadow_mask",
];

/// GOFF layers that are geocoded unless switched off
pub const GOFF_DATASETS: [&str; 7] = [
    "along_track_offset",
    "snr",
    "along_track_offset_variance",
    "correlation_surface_peak",
    "cross_offset_variance",
    "slant_range_offset",
    "slant_range_offset_variance",
];

/// Validated geocode-InSAR configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeInsarRunConfig {
    /// Config tree with defaults filled in
    pub cfg: RunConfig,
    pub runw_path: PathBuf,
    pub freq_pols: FreqPols,
    pub gunw_datasets: BTreeMap<String, bool>,
    pub goff_datasets: BTreeMap<String, bool>,
    pub range_looks: u32,
    pub azimuth_looks: u32,
}

impl GeocodeInsarRunConfig {
    /// Validate `cfg` for standalone geocoding of a RUNW product.
    ///
    /// `inventory` describes the frequencies and polarizations present in
    /// the product at `runw_path`.
    pub fn new(mut cfg: RunConfig, inventory: &dyn FreqPolInventory) -> SarResult<Self> {
        let runw_path = cfg.processing().geocode.runw_path.clone().ok_or_else(|| {
            log_error(
                TARGET,
                SarError::MissingField(
                    "'runw_path' file path under `geocode' required for standalone execution with YAML"
                        .to_string(),
                ),
            )
        })?;

        if !runw_path.is_file() {
            return Err(log_error(
                TARGET,
                SarError::InvalidPath(format!(
                    "{} is invalid; needs to be a file",
                    runw_path.display()
                )),
            ));
        }

        let freq_pols = cfg.freq_pols().clone();
        check_product_freq_pols(&runw_path, inventory, &freq_pols)?;

        let geocode = &mut cfg.processing_mut().geocode;
        let gunw_datasets = fill_dataset_defaults(&mut geocode.gunw_datasets, &GUNW_DATASETS);
        let goff_datasets = fill_dataset_defaults(&mut geocode.goff_datasets, &GOFF_DATASETS);

        let crossmul = &cfg.processing().crossmul;
        check_odd_looks("azimuth", crossmul.azimuth_looks)?;
        check_odd_looks("range", crossmul.range_looks)?;
        let (range_looks, azimuth_looks) = (crossmul.range_looks, crossmul.azimuth_looks);

        log::info!(
            "Geocode run config valid: {} ({} GUNW / {} GOFF layers enabled, looks {}x{})",
            runw_path.display(),
            gunw_datasets.values().filter(|&&on| on).count(),
            goff_datasets.values().filter(|&&on| on).count(),
            azimuth_looks,
            range_looks
        );

        Ok(Self {
            cfg,
            runw_path,
            freq_pols,
            gunw_datasets,
            goff_datasets,
            range_looks,
            azimuth_looks,
        })
    }

    /// Whether GUNW layer `name` should be geocoded
    pub fn geocode_gunw(&self, name: &str) -> bool {
        self.gunw_datasets.get(name).copied().unwrap_or(false)
    }

    /// Whether GOFF layer `name` should be geocoded
    pub fn geocode_goff(&self, name: &str) -> bool {
        self.goff_datasets.get(name).copied().unwrap_or(false)
    }
}

/// Create the toggle map if missing and switch on every unlisted dataset.
/// Returns a copy of the completed map.
fn fill_dataset_defaults(
    toggles: &mut Option<BTreeMap<String, bool>>,
    names: &[&str],
) -> BTreeMap<String, bool> {
    let toggles = toggles.get_or_insert_with(BTreeMap::new);
    for name in names {
        toggles.entry((*name).to_string()).or_insert(true);
    }
    toggles.clone()
}

/// Multilook factors above one must be odd so the output stays centered
fn check_odd_looks(direction: &str, looks: u32) -> SarResult<()> {
    if looks > 1 && looks % 2 == 0 {
        return Err(log_error(
            TARGET,
            SarError::Constraint(format!("{} looks = {} not an odd integer.", direction, looks)),
        ));
    }
    Ok(())
}
