//! Shared checks used by the workflow run-config validators

use crate::types::{FreqPols, Frequency, Polarization, SarError, SarResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Log `err` under `target` and hand it back, so failures leave an audit trail
pub(crate) fn log_error(target: &str, err: SarError) -> SarError {
    log::error!(target: target, "{}", err);
    err
}

/// Check that `parent` holds the directory tree a processing step writes:
///
/// ```text
/// parent/
/// └── mode/
///     └── freqA, freqB
///         └── HH, HV, VH, VV   (only when `pols` is given)
/// ```
pub fn check_mode_directory_tree(
    parent: &Path,
    mode: &str,
    frequencies: &[Frequency],
    pols: Option<&FreqPols>,
) -> SarResult<()> {
    const TARGET: &str = "helpers::check_mode_directory_tree";

    if !parent.is_dir() {
        return Err(log_error(
            TARGET,
            SarError::Layout(format!("{} not a valid path", parent.display())),
        ));
    }

    let mode_dir = parent.join(mode);
    if !mode_dir.is_dir() {
        return Err(log_error(
            TARGET,
            SarError::Layout(format!("{} not a valid path", mode_dir.display())),
        ));
    }

    if !(1..=2).contains(&frequencies.len()) {
        return Err(log_error(
            TARGET,
            SarError::Layout(format!(
                "{} is an invalid number of frequencies. Only 1 or 2 frequencies allowed",
                frequencies.len()
            )),
        ));
    }

    for freq in frequencies {
        let freq_dir = mode_dir.join(format!("freq{}", freq));
        if !freq_dir.is_dir() {
            return Err(log_error(
                TARGET,
                SarError::Layout(format!("{} not a valid path", freq_dir.display())),
            ));
        }

        let pols = match pols {
            Some(pols) if !pols.is_empty() => pols,
            _ => continue,
        };

        let freq_pols = pols.get(freq).ok_or_else(|| {
            log_error(
                TARGET,
                SarError::Layout(format!("No key in polarization dict for frequency: {}", freq)),
            )
        })?;

        for pol in freq_pols {
            let pol_dir = freq_dir.join(pol.to_string());
            if !pol_dir.is_dir() {
                return Err(log_error(
                    TARGET,
                    SarError::Layout(format!("{} not a valid path", pol_dir.display())),
                ));
            }
        }
    }

    log::debug!("{} layout verified under {}", mode, parent.display());
    Ok(())
}

/// Frequencies and polarizations available in an input product
pub trait FreqPolInventory {
    fn frequencies(&self) -> Vec<Frequency>;

    fn polarizations(&self, frequency: Frequency) -> Vec<Polarization>;
}

/// Inventory known up front, e.g. from product metadata already read elsewhere
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticInventory {
    contents: FreqPols,
}

impl StaticInventory {
    pub fn new(contents: FreqPols) -> Self {
        Self { contents }
    }

    /// Build from string keys as they come from Python or JSON
    pub fn from_strings(contents: &BTreeMap<String, Vec<String>>) -> SarResult<Self> {
        let mut parsed = FreqPols::new();
        for (freq, pols) in contents {
            let pols = pols
                .iter()
                .map(|p| p.parse())
                .collect::<SarResult<Vec<Polarization>>>()?;
            parsed.insert(freq.parse()?, pols);
        }
        Ok(Self::new(parsed))
    }
}

impl FreqPolInventory for StaticInventory {
    fn frequencies(&self) -> Vec<Frequency> {
        self.contents.keys().copied().collect()
    }

    fn polarizations(&self, frequency: Frequency) -> Vec<Polarization> {
        self.contents.get(&frequency).cloned().unwrap_or_default()
    }
}

/// Check that every requested frequency and polarization exists in a product
pub fn check_product_freq_pols(
    product: &Path,
    inventory: &dyn FreqPolInventory,
    requested: &FreqPols,
) -> SarResult<()> {
    const TARGET: &str = "helpers::check_product_freq_pols";

    let available = inventory.frequencies();
    for (freq, pols) in requested {
        if !available.contains(freq) {
            return Err(log_error(
                TARGET,
                SarError::Layout(format!(
                    "frequency{} not found in {}",
                    freq,
                    product.display()
                )),
            ));
        }

        let product_pols = inventory.polarizations(*freq);
        for pol in pols {
            if !product_pols.contains(pol) {
                return Err(log_error(
                    TARGET,
                    SarError::Layout(format!(
                        "{} not found in frequency{} of {}",
                        pol,
                        freq,
                        product.display()
                    )),
                ));
            }
        }
    }

    Ok(())
}
