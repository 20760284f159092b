//! Parameter records for first-level and higher-level designs.
//!
//! Both records derive serde so they can be loaded from a YAML or JSON
//! parameter file (see [`super::config`]). Optional settings carry the same
//! defaults as the FEAT GUI; anything environment specific, such as the
//! standard-space template, must be supplied by the caller.

use super::options::{
    Dof, InputType, LinearSearch, MixedEffects, MotionCorrection, SliceTiming, Thresholding,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Standard-space template of a default FSL install.
///
/// Never applied implicitly. Pass it to [`FirstLevelParameters::new`] or
/// [`HigherLevelParameters::new`] only when the FSL install really lives there.
pub const DEFAULT_REGISTRATION_REFERENCE: &str =
    "/usr/local/fsl/data/standard/MNI152_T1_2mm_brain";

fn default_high_pass_cutoff() -> f64 {
    100.0
}

fn default_spatial_smoothing() -> f64 {
    5.0
}

fn default_cluster_z() -> f64 {
    3.1
}

fn default_cluster_p() -> f64 {
    0.05
}

fn default_cope_inputs() -> u32 {
    1
}

fn enabled() -> bool {
    true
}

/// A named weight vector over the explanatory variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contrast {
    pub name: String,
    pub weights: Vec<f64>,
}

impl Contrast {
    pub fn new(name: impl Into<String>, weights: impl Into<Vec<f64>>) -> Self {
        Self {
            name: name.into(),
            weights: weights.into(),
        }
    }
}

/// Orthogonalise EV `ev` with respect to EV `against` (both 1-based).
///
/// `against == 0` is FEAT's "no orthogonalisation" slot. Only entries the
/// caller supplies are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orthogonalization {
    pub ev: usize,
    pub against: usize,
    pub enabled: bool,
}

/// One design to render, tagged by analysis level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum AnalysisParameters {
    FirstLevel(FirstLevelParameters),
    HigherLevel(HigherLevelParameters),
}

impl AnalysisParameters {
    pub fn working_dir(&self) -> &Path {
        match self {
            Self::FirstLevel(p) => &p.working_dir,
            Self::HigherLevel(p) => &p.working_dir,
        }
    }

    pub fn output_dir(&self) -> &Path {
        match self {
            Self::FirstLevel(p) => &p.output_dir,
            Self::HigherLevel(p) => &p.output_dir,
        }
    }
}

impl From<FirstLevelParameters> for AnalysisParameters {
    fn from(params: FirstLevelParameters) -> Self {
        Self::FirstLevel(params)
    }
}

impl From<HigherLevelParameters> for AnalysisParameters {
    fn from(params: HigherLevelParameters) -> Self {
        Self::HigherLevel(params)
    }
}

/// Inputs of a single-run, first-level FEAT analysis.
///
/// Relative paths are resolved against `working_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstLevelParameters {
    pub working_dir: PathBuf,
    /// 4-D functional image.
    pub input_file: PathBuf,
    /// Directory FEAT writes into; `design.fsf` is written here too.
    pub output_dir: PathBuf,
    #[serde(default)]
    pub confound_file: Option<PathBuf>,
    /// Alternative reference image for motion correction / registration.
    #[serde(default)]
    pub alternative_reference: Option<PathBuf>,
    pub registration_reference: PathBuf,

    /// Seconds; read from the input header when unset.
    #[serde(default)]
    pub repetition_time: Option<f64>,
    /// Read from the input header when unset.
    #[serde(default)]
    pub total_volumes: Option<u64>,
    /// Informational `fmri(totalVoxels)`; omitted when unset.
    #[serde(default)]
    pub total_voxels: Option<u64>,
    /// Fill an unset `total_voxels` from the input header.
    #[serde(default)]
    pub count_voxels: bool,
    #[serde(default)]
    pub delete_volumes: u64,
    /// High-pass cutoff in seconds.
    #[serde(default = "default_high_pass_cutoff")]
    pub high_pass_cutoff: f64,
    /// Spatial smoothing FWHM in mm.
    #[serde(default = "default_spatial_smoothing")]
    pub spatial_smoothing: f64,

    #[serde(default)]
    pub motion_correction: MotionCorrection,
    #[serde(default)]
    pub slice_timing: SliceTiming,
    #[serde(default)]
    pub linear_search: LinearSearch,
    #[serde(default)]
    pub dof: Dof,
    #[serde(default)]
    pub thresholding: Thresholding,
    #[serde(default = "default_cluster_z")]
    pub cluster_z: f64,
    #[serde(default = "default_cluster_p")]
    pub cluster_p: f64,

    #[serde(default)]
    pub b0_unwarping: bool,
    #[serde(default)]
    pub brain_extraction: bool,
    #[serde(default)]
    pub intensity_normalization: bool,
    #[serde(default)]
    pub perfusion_subtraction: bool,
    #[serde(default = "enabled")]
    pub temporal_highpass: bool,
    #[serde(default)]
    pub melodic_ica: bool,
    #[serde(default = "enabled")]
    pub prewhitening: bool,
    #[serde(default)]
    pub timeseries_plots: bool,

    /// Three-column timing files, parallel to `ev_names`.
    #[serde(default)]
    pub ev_files: Vec<PathBuf>,
    #[serde(default)]
    pub ev_names: Vec<String>,
    /// Rendered in insertion order.
    #[serde(default)]
    pub contrasts: Vec<Contrast>,
    #[serde(default)]
    pub orthogonalization: Vec<Orthogonalization>,
}

impl FirstLevelParameters {
    /// Parameters with GUI defaults and no EVs or contrasts.
    pub fn new(
        working_dir: impl Into<PathBuf>,
        input_file: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        registration_reference: impl Into<PathBuf>,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            input_file: input_file.into(),
            output_dir: output_dir.into(),
            confound_file: None,
            alternative_reference: None,
            registration_reference: registration_reference.into(),
            repetition_time: None,
            total_volumes: None,
            total_voxels: None,
            count_voxels: false,
            delete_volumes: 0,
            high_pass_cutoff: default_high_pass_cutoff(),
            spatial_smoothing: default_spatial_smoothing(),
            motion_correction: MotionCorrection::default(),
            slice_timing: SliceTiming::default(),
            linear_search: LinearSearch::default(),
            dof: Dof::default(),
            thresholding: Thresholding::default(),
            cluster_z: default_cluster_z(),
            cluster_p: default_cluster_p(),
            b0_unwarping: false,
            brain_extraction: false,
            intensity_normalization: false,
            perfusion_subtraction: false,
            temporal_highpass: true,
            melodic_ica: false,
            prewhitening: true,
            timeseries_plots: false,
            ev_files: Vec::new(),
            ev_names: Vec::new(),
            contrasts: Vec::new(),
            orthogonalization: Vec::new(),
        }
    }

    /// Append an explanatory variable.
    pub fn ev(mut self, name: impl Into<String>, timing_file: impl Into<PathBuf>) -> Self {
        self.ev_names.push(name.into());
        self.ev_files.push(timing_file.into());
        self
    }

    /// Append a contrast.
    pub fn contrast(mut self, name: impl Into<String>, weights: impl Into<Vec<f64>>) -> Self {
        self.contrasts.push(Contrast::new(name, weights));
        self
    }

    pub fn confound_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.confound_file = Some(path.into());
        self
    }

    pub fn alternative_reference(mut self, path: impl Into<PathBuf>) -> Self {
        self.alternative_reference = Some(path.into());
        self
    }

    pub fn repetition_time(mut self, seconds: f64) -> Self {
        self.repetition_time = Some(seconds);
        self
    }

    pub fn total_volumes(mut self, volumes: u64) -> Self {
        self.total_volumes = Some(volumes);
        self
    }

    /// Write `fmri(totalVoxels)` from the input header unless already set.
    pub fn count_voxels(mut self) -> Self {
        self.count_voxels = true;
        self
    }

    pub fn orthogonalize(mut self, ev: usize, against: usize, enabled: bool) -> Self {
        self.orthogonalization.push(Orthogonalization {
            ev,
            against,
            enabled,
        });
        self
    }
}

/// Inputs of a group / cross-run (higher-level) FEAT analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HigherLevelParameters {
    pub working_dir: PathBuf,
    pub output_dir: PathBuf,
    pub registration_reference: PathBuf,
    #[serde(default)]
    pub input_type: InputType,
    /// Lower-level `.feat` directories or COPE images, one per design row.
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    /// Number of lower-level COPEs to carry up (`.feat` inputs only).
    #[serde(default = "default_cope_inputs")]
    pub cope_inputs: u32,
    #[serde(default)]
    pub ev_names: Vec<String>,
    /// Design matrix: one row per input, one column per EV.
    #[serde(default)]
    pub ev_values: Vec<Vec<f64>>,
    /// Variance group of each input; empty puts every input in group 1.
    #[serde(default)]
    pub group_membership: Vec<u32>,
    #[serde(default)]
    pub contrasts: Vec<Contrast>,
    #[serde(default)]
    pub mixed_effects: MixedEffects,
    #[serde(default)]
    pub thresholding: Thresholding,
    #[serde(default = "default_cluster_z")]
    pub cluster_z: f64,
    #[serde(default = "default_cluster_p")]
    pub cluster_p: f64,
}

impl HigherLevelParameters {
    pub fn new(
        working_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        registration_reference: impl Into<PathBuf>,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            output_dir: output_dir.into(),
            registration_reference: registration_reference.into(),
            input_type: InputType::default(),
            inputs: Vec::new(),
            cope_inputs: default_cope_inputs(),
            ev_names: Vec::new(),
            ev_values: Vec::new(),
            group_membership: Vec::new(),
            contrasts: Vec::new(),
            mixed_effects: MixedEffects::default(),
            thresholding: Thresholding::default(),
            cluster_z: default_cluster_z(),
            cluster_p: default_cluster_p(),
        }
    }

    /// Append an input together with its design-matrix row.
    pub fn input(mut self, path: impl Into<PathBuf>, ev_values: impl Into<Vec<f64>>) -> Self {
        self.inputs.push(path.into());
        self.ev_values.push(ev_values.into());
        self
    }

    pub fn ev(mut self, name: impl Into<String>) -> Self {
        self.ev_names.push(name.into());
        self
    }

    pub fn contrast(mut self, name: impl Into<String>, weights: impl Into<Vec<f64>>) -> Self {
        self.contrasts.push(Contrast::new(name, weights));
        self
    }
}
