//! Loading [`AnalysisParameters`] from YAML or JSON parameter files.
//!
//! The file format is chosen by extension (`.yaml` / `.yml` / `.json`). The
//! top-level `level` key selects the variant:
//!
//! ```yaml
//! level: first_level
//! working_dir: /data/sub-01
//! input_file: func/bold.nii.gz
//! output_dir: derivatives
//! registration_reference: /usr/local/fsl/data/standard/MNI152_T1_2mm_brain
//! ev_files: [events/taskA.txt, events/taskB.txt]
//! ev_names: [TaskA, TaskB]
//! contrasts:
//!   - { name: TaskA>Baseline, weights: [1, 0] }
//!   - { name: TaskB>Baseline, weights: [0, 1] }
//! ```

use super::params::AnalysisParameters;
use crate::error::{Error, Result};
use std::path::Path;

/// Serialization formats accepted for parameter files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterFormat {
    Yaml,
    Json,
}

impl ParameterFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Ok(Self::Yaml)
            }
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(Error::Configuration(format!(
                "cannot tell parameter format of '{}' (expected .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }
}

/// Parse parameters from text in the given format.
pub fn parse_parameters(text: &str, format: ParameterFormat) -> Result<AnalysisParameters> {
    match format {
        ParameterFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|e| Error::Configuration(e.to_string()))
        }
        ParameterFormat::Json => {
            serde_json::from_str(text).map_err(|e| Error::Configuration(e.to_string()))
        }
    }
}

/// Read and parse a parameter file.
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<AnalysisParameters> {
    let path = path.as_ref();
    let format = ParameterFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), ?format, "loading parameters");
    parse_parameters(&text, format).map_err(|e| match e {
        Error::Configuration(msg) => Error::Configuration(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Serialize parameters in the given format.
pub fn to_string(params: &AnalysisParameters, format: ParameterFormat) -> Result<String> {
    match format {
        ParameterFormat::Yaml => {
            serde_yaml::to_string(params).map_err(|e| Error::Configuration(e.to_string()))
        }
        ParameterFormat::Json => {
            serde_json::to_string_pretty(params).map_err(|e| Error::Configuration(e.to_string()))
        }
    }
}
