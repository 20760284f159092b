//! Input validation that runs before any header read or text generation.

use super::params::{Contrast, FirstLevelParameters, HigherLevelParameters, Orthogonalization};
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Paths of a first-level design after resolution against the working directory.
#[derive(Debug, Clone)]
pub(crate) struct FirstLevelPaths {
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub confound_file: Option<PathBuf>,
    pub alternative_reference: Option<PathBuf>,
    pub ev_files: Vec<PathBuf>,
}

/// Paths of a higher-level design after resolution against the working directory.
#[derive(Debug, Clone)]
pub(crate) struct HigherLevelPaths {
    pub output_dir: PathBuf,
    pub inputs: Vec<PathBuf>,
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn require_exists(path: PathBuf) -> Result<PathBuf> {
    match path.try_exists() {
        Ok(true) => Ok(path),
        _ => Err(Error::PathNotFound(path)),
    }
}

fn resolve_existing(base: &Path, path: &Path) -> Result<PathBuf> {
    require_exists(resolve(base, path))
}

/// Check every declared path, then the shape of the design.
///
/// Paths are checked in declaration order (working directory, input file,
/// output directory, confound file, alternative reference, EV files) and
/// the first missing one is reported.
pub(crate) fn first_level(params: &FirstLevelParameters) -> Result<FirstLevelPaths> {
    let base = require_exists(params.working_dir.clone())?;

    let input_file = resolve_existing(&base, &params.input_file)?;
    let output_dir = resolve_existing(&base, &params.output_dir)?;
    let confound_file = params
        .confound_file
        .as_deref()
        .map(|p| resolve_existing(&base, p))
        .transpose()?;
    let alternative_reference = params
        .alternative_reference
        .as_deref()
        .map(|p| resolve_existing(&base, p))
        .transpose()?;
    let ev_files = params
        .ev_files
        .iter()
        .map(|p| resolve_existing(&base, p))
        .collect::<Result<Vec<_>>>()?;

    if params.ev_files.len() != params.ev_names.len() {
        return Err(Error::ParameterMismatch(format!(
            "{} EV files but {} EV names",
            params.ev_files.len(),
            params.ev_names.len()
        )));
    }

    let n_evs = params.ev_names.len();
    check_contrasts(&params.contrasts, n_evs)?;
    check_orthogonalization(&params.orthogonalization, n_evs)?;

    if let Some(tr) = params.repetition_time {
        if !tr.is_finite() || tr <= 0.0 {
            return Err(Error::Configuration(format!(
                "repetition time must be finite and > 0, got {}",
                tr
            )));
        }
    }
    check_non_negative("spatial smoothing", params.spatial_smoothing)?;
    check_non_negative("high-pass cutoff", params.high_pass_cutoff)?;
    check_finite("cluster Z threshold", params.cluster_z)?;
    check_finite("cluster P threshold", params.cluster_p)?;
    check_weights(&params.contrasts)?;

    Ok(FirstLevelPaths {
        input_file,
        output_dir,
        confound_file,
        alternative_reference,
        ev_files,
    })
}

pub(crate) fn higher_level(params: &HigherLevelParameters) -> Result<HigherLevelPaths> {
    let base = require_exists(params.working_dir.clone())?;

    let output_dir = resolve_existing(&base, &params.output_dir)?;
    let inputs = params
        .inputs
        .iter()
        .map(|p| resolve_existing(&base, p))
        .collect::<Result<Vec<_>>>()?;

    let n_inputs = params.inputs.len();
    let n_evs = params.ev_names.len();

    if params.ev_values.len() != n_inputs {
        return Err(Error::ParameterMismatch(format!(
            "{} inputs but {} design-matrix rows",
            n_inputs,
            params.ev_values.len()
        )));
    }
    if let Some((row, values)) = params
        .ev_values
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() != n_evs)
    {
        return Err(Error::ParameterMismatch(format!(
            "design-matrix row {} has {} values for {} EVs",
            row + 1,
            values.len(),
            n_evs
        )));
    }
    if !params.group_membership.is_empty() && params.group_membership.len() != n_inputs {
        return Err(Error::ParameterMismatch(format!(
            "{} inputs but {} group memberships",
            n_inputs,
            params.group_membership.len()
        )));
    }
    if params.group_membership.contains(&0) {
        return Err(Error::Configuration(
            "group membership numbers start at 1".to_string(),
        ));
    }

    check_contrasts(&params.contrasts, n_evs)?;

    for (row, values) in params.ev_values.iter().enumerate() {
        for (e, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(Error::Configuration(format!(
                    "design-matrix entry for input {} and EV {} must be finite, got {}",
                    row + 1,
                    e + 1,
                    value
                )));
            }
        }
    }
    check_finite("cluster Z threshold", params.cluster_z)?;
    check_finite("cluster P threshold", params.cluster_p)?;
    check_weights(&params.contrasts)?;

    Ok(HigherLevelPaths { output_dir, inputs })
}

/// Every contrast carries one weight per EV and has a unique name.
fn check_contrasts(contrasts: &[Contrast], n_evs: usize) -> Result<()> {
    let mut seen = HashSet::with_capacity(contrasts.len());
    for contrast in contrasts {
        if contrast.weights.len() != n_evs {
            return Err(Error::ParameterMismatch(format!(
                "contrast '{}' has {} weights for {} EVs",
                contrast.name,
                contrast.weights.len(),
                n_evs
            )));
        }
        if !seen.insert(contrast.name.as_str()) {
            return Err(Error::ParameterMismatch(format!(
                "contrast '{}' is defined twice",
                contrast.name
            )));
        }
    }
    Ok(())
}

fn check_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::Configuration(format!("{} must be finite, got {}", field, value)))
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(Error::Configuration(format!("{} must be >= 0, got {}", field, value)));
    }
    Ok(())
}

fn check_weights(contrasts: &[Contrast]) -> Result<()> {
    for contrast in contrasts {
        if let Some((k, w)) = contrast
            .weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite())
        {
            return Err(Error::Configuration(format!(
                "contrast '{}' weight {} must be finite, got {}",
                contrast.name,
                k + 1,
                w
            )));
        }
    }
    Ok(())
}

fn check_orthogonalization(entries: &[Orthogonalization], n_evs: usize) -> Result<()> {
    for entry in entries {
        let in_range = (1..=n_evs).contains(&entry.ev) && entry.against <= n_evs;
        if !in_range || entry.ev == entry.against {
            return Err(Error::ParameterMismatch(format!(
                "cannot orthogonalise EV {} against EV {} with {} EVs",
                entry.ev, entry.against, n_evs
            )));
        }
    }
    Ok(())
}
