//! Rubbersheet run-config checks

use crate::config::helpers::{check_mode_directory_tree, log_error};
use crate::config::runconfig::{OffsetsFilterType, RunConfig};
use crate::types::{FreqPols, Frequency, SarError, SarResult};
use std::path::PathBuf;

const TARGET: &str = "rubbersheet::yaml_check";

/// Default median filter half-size, in pixels
pub const DEFAULT_MEDIAN_SIZE: u32 = 5;

/// Default Gaussian filter sigma, in pixels
pub const DEFAULT_GAUSSIAN_SIGMA: f64 = 1.0;

/// Offset smoothing with every parameter resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OffsetsFilter {
    None,
    Median { size_range: u32, size_azimuth: u32 },
    Gaussian { sigma_range: f64, sigma_azimuth: f64 },
}

/// Upstream step that produced the offsets to rubbersheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetsSource {
    DenseOffsets,
    OffsetsProduct,
}

impl OffsetsSource {
    /// Directory name the step writes under its output path
    pub fn mode(&self) -> &'static str {
        match self {
            OffsetsSource::DenseOffsets => "dense_offsets",
            OffsetsSource::OffsetsProduct => "offsets_product",
        }
    }
}

/// Validated rubbersheet configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RubbersheetRunConfig {
    /// Config tree with defaults filled in
    pub cfg: RunConfig,
    pub filter: OffsetsFilter,
    /// Offsets to rubbersheet and where they live
    pub offsets: (OffsetsSource, PathBuf),
    pub geo2rdr_offsets_path: PathBuf,
}

impl RubbersheetRunConfig {
    pub fn new(mut cfg: RunConfig) -> SarResult<Self> {
        let scratch_path = cfg.scratch_path().to_path_buf();
        let freq_pols: FreqPols = cfg.freq_pols().clone();
        let frequencies: Vec<Frequency> = freq_pols.keys().copied().collect();

        let processing = cfg.processing_mut();
        let dense_offsets = processing.dense_offsets.enabled;
        let offsets_product = processing.offsets_product.enabled;

        if !(dense_offsets || offsets_product) && processing.rubbersheet.enabled {
            return Err(log_error(
                TARGET,
                SarError::Runtime("Dense_offsets must be enabled to run rubbersheet".to_string()),
            ));
        }

        if offsets_product && processing.offsets_product.layer_keys().is_empty() {
            return Err(log_error(
                TARGET,
                SarError::MissingField(
                    "No offset layer specified; at least one layer is required".to_string(),
                ),
            ));
        }

        let rubbersheet = &mut processing.rubbersheet;
        let filter = match rubbersheet.offsets_filter {
            OffsetsFilterType::Median => {
                let median = &mut rubbersheet.median;
                OffsetsFilter::Median {
                    size_range: *median.filter_size_range.get_or_insert(DEFAULT_MEDIAN_SIZE),
                    size_azimuth: *median.filter_size_azimuth.get_or_insert(DEFAULT_MEDIAN_SIZE),
                }
            }
            OffsetsFilterType::Gaussian => {
                let gaussian = &mut rubbersheet.gaussian;
                OffsetsFilter::Gaussian {
                    sigma_range: *gaussian.sigma_range.get_or_insert(DEFAULT_GAUSSIAN_SIGMA),
                    sigma_azimuth: *gaussian.sigma_azimuth.get_or_insert(DEFAULT_GAUSSIAN_SIGMA),
                }
            }
            OffsetsFilterType::None => OffsetsFilter::None,
        };

        // Running inside the full InSAR workflow, upstream outputs land in scratch
        if dense_offsets && rubbersheet.dense_offsets_path.is_none() {
            rubbersheet.dense_offsets_path = Some(scratch_path.clone());
        }
        if offsets_product && rubbersheet.offsets_product_path.is_none() {
            rubbersheet.offsets_product_path = Some(scratch_path.clone());
        }
        let geo2rdr_offsets_path = rubbersheet
            .geo2rdr_offsets_path
            .get_or_insert_with(|| scratch_path.clone())
            .clone();

        let dense_offsets_path = rubbersheet.dense_offsets_path.clone().filter(|_| dense_offsets);
        let offsets_product_path = rubbersheet
            .offsets_product_path
            .clone()
            .filter(|_| offsets_product);

        let offsets = pick_offsets_source(
            dense_offsets_path,
            offsets_product_path,
            &frequencies,
            &freq_pols,
        )?;

        if !geo2rdr_offsets_path.is_dir() {
            return Err(log_error(
                TARGET,
                SarError::InvalidPath(format!(
                    "{} is invalid; needs to be a directory",
                    geo2rdr_offsets_path.display()
                )),
            ));
        }
        check_mode_directory_tree(&geo2rdr_offsets_path, "geo2rdr", &frequencies, None)?;

        log::info!(
            "Rubbersheet run config valid: {} offsets at {}, filter {:?}, geo2rdr {}",
            offsets.0.mode(),
            offsets.1.display(),
            filter,
            geo2rdr_offsets_path.display()
        );

        Ok(Self {
            cfg,
            filter,
            offsets,
            geo2rdr_offsets_path,
        })
    }
}

/// Dense offsets win when enabled and present on disk; otherwise fall back to
/// the offsets product. With neither stage usable the config is rejected.
fn pick_offsets_source(
    dense_path: Option<PathBuf>,
    product_path: Option<PathBuf>,
    frequencies: &[Frequency],
    freq_pols: &FreqPols,
) -> SarResult<(OffsetsSource, PathBuf)> {
    let candidates = [
        (OffsetsSource::DenseOffsets, dense_path.as_deref()),
        (OffsetsSource::OffsetsProduct, product_path.as_deref()),
    ];

    for (source, path) in candidates {
        if let Some(path) = path.filter(|p| p.is_dir()) {
            check_mode_directory_tree(path, source.mode(), frequencies, Some(freq_pols))?;
            return Ok((source, path.to_path_buf()));
        }
    }

    // Report the path the user most likely meant
    let reported = dense_path
        .as_deref()
        .or(product_path.as_deref())
        .map_or_else(|| "None".to_string(), |p| p.display().to_string());
    Err(log_error(
        TARGET,
        SarError::InvalidPath(format!("{} is invalid; needs to be a directory", reported)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config(scratch: &Path, body: &str) -> RunConfig {
        let yaml = format!(
            r#"
runconfig:
    groups:
        product_path_group:
            scratch_path: {}
        processing:
            input_subset:
                list_of_frequencies:
                    A: [HH]
{}
"#,
            scratch.display(),
            body
        );
        RunConfig::from_yaml_str(&yaml).unwrap()
    }

    fn make_tree(root: &Path, mode: &str) {
        fs::create_dir_all(root.join(mode).join("freqA/HH")).unwrap();
    }

    #[test]
    fn test_rubbersheet_needs_offsets() {
        let tmp = TempDir::new().unwrap();
        let cfg = config(tmp.path(), "            rubbersheet:\n                enabled: true\n");
        let err = RubbersheetRunConfig::new(cfg).unwrap_err();
        assert!(matches!(err, SarError::Runtime(_)));
        assert_eq!(err.to_string(), "Dense_offsets must be enabled to run rubbersheet");
    }

    #[test]
    fn test_offsets_product_needs_layer() {
        let tmp = TempDir::new().unwrap();
        let body = "            offsets_product:\n                enabled: true\n                margin: 32\n            rubbersheet:\n                enabled: true\n";
        let err = RubbersheetRunConfig::new(config(tmp.path(), body)).unwrap_err();
        assert!(matches!(err, SarError::MissingField(_)));
        assert!(err.to_string().starts_with("No offset layer specified"));
    }

    #[test]
    fn test_defaults_from_scratch() {
        let tmp = TempDir::new().unwrap();
        make_tree(tmp.path(), "dense_offsets");
        make_tree(tmp.path(), "geo2rdr");

        let body = "            dense_offsets:\n                enabled: true\n            rubbersheet:\n                enabled: true\n                offsets_filter: median\n                median:\n                    filter_size_range: 9\n";
        let checked = RubbersheetRunConfig::new(config(tmp.path(), body)).unwrap();

        assert_eq!(
            checked.filter,
            OffsetsFilter::Median { size_range: 9, size_azimuth: DEFAULT_MEDIAN_SIZE }
        );
        assert_eq!(
            checked.offsets,
            (OffsetsSource::DenseOffsets, tmp.path().to_path_buf())
        );
        assert_eq!(checked.geo2rdr_offsets_path, tmp.path());

        let rubbersheet = &checked.cfg.processing().rubbersheet;
        assert_eq!(rubbersheet.dense_offsets_path.as_deref(), Some(tmp.path()));
        assert!(rubbersheet.offsets_product_path.is_none());
        assert_eq!(rubbersheet.median.filter_size_azimuth, Some(DEFAULT_MEDIAN_SIZE));
    }

    #[test]
    fn test_gaussian_defaults() {
        let tmp = TempDir::new().unwrap();
        make_tree(tmp.path(), "offsets_product");
        make_tree(tmp.path(), "geo2rdr");

        let body = "            offsets_product:\n                enabled: true\n                layer1: {}\n            rubbersheet:\n                enabled: true\n                offsets_filter: gaussian\n";
        let checked = RubbersheetRunConfig::new(config(tmp.path(), body)).unwrap();
        assert_eq!(
            checked.filter,
            OffsetsFilter::Gaussian { sigma_range: 1.0, sigma_azimuth: 1.0 }
        );
        assert_eq!(checked.offsets.0, OffsetsSource::OffsetsProduct);
    }

    #[test]
    fn test_stage_path_must_be_directory() {
        let tmp = TempDir::new().unwrap();
        let not_a_dir = tmp.path().join("offsets.h5");
        fs::write(&not_a_dir, b"").unwrap();

        let body = format!(
            "            dense_offsets:\n                enabled: true\n            rubbersheet:\n                enabled: true\n                dense_offsets_path: {}\n",
            not_a_dir.display()
        );
        let err = RubbersheetRunConfig::new(config(tmp.path(), &body)).unwrap_err();
        assert!(matches!(err, SarError::InvalidPath(_)));
        assert!(err.to_string().contains("offsets.h5 is invalid; needs to be a directory"));
    }

    #[test]
    fn test_geo2rdr_layout_checked() {
        let tmp = TempDir::new().unwrap();
        make_tree(tmp.path(), "dense_offsets");

        let body = "            dense_offsets:\n                enabled: true\n            rubbersheet:\n                enabled: true\n";
        let err = RubbersheetRunConfig::new(config(tmp.path(), body)).unwrap_err();
        assert!(matches!(err, SarError::Layout(_)));
        assert!(err.to_string().contains("geo2rdr"));
    }

    #[test]
    fn test_nothing_enabled() {
        let tmp = TempDir::new().unwrap();
        make_tree(tmp.path(), "geo2rdr");
        let err = RubbersheetRunConfig::new(config(tmp.path(), "")).unwrap_err();
        assert!(matches!(err, SarError::InvalidPath(_)));
        assert_eq!(err.to_string(), "None is invalid; needs to be a directory");
    }

    #[test]
    fn test_nothing_enabled_missing_geo2rdr() {
        let body = "            rubbersheet:\n                geo2rdr_offsets_path: /definitely/missing/geo2rdr\n";
        let err = RubbersheetRunConfig::new(config(Path::new("/definitely/missing/scratch"), body))
            .unwrap_err();
        assert!(matches!(err, SarError::InvalidPath(_)));
        assert!(err.to_string().ends_with("is invalid; needs to be a directory"));
    }
}
