//! FEAT design (`.fsf`) generation.
//!
//! Rendering runs in three phases, each finishing before the next starts:
//!
//! 1. **validate**: every declared path must exist and list-shaped inputs
//!    must agree in length ([`Error::PathNotFound`], [`Error::ParameterMismatch`]).
//! 2. **default**: an unset repetition time or volume count is read from the
//!    input image header.
//! 3. **render**: the fixed sections are built in order and joined once.
//!
//! [`generate`] adds the write phase, replacing `<output_dir>/design.fsf`.
//!
//! [`Error::PathNotFound`]: crate::Error::PathNotFound
//! [`Error::ParameterMismatch`]: crate::Error::ParameterMismatch

pub mod config;
pub mod document;
mod first_level;
mod higher_level;
pub mod options;
pub mod params;
mod validate;
mod write;

pub use config::{load_parameters, parse_parameters, ParameterFormat};
pub use document::{RenderedDocument, Section, SectionKind};
pub use options::{
    Dof, InputType, LinearSearch, MixedEffects, MotionCorrection, SliceTiming, Thresholding,
};
pub use params::{
    AnalysisParameters, Contrast, FirstLevelParameters, HigherLevelParameters, Orthogonalization,
    DEFAULT_REGISTRATION_REFERENCE,
};

use crate::error::Result;

/// File name of every generated design.
pub const DESIGN_FILE_NAME: &str = "design.fsf";

/// Value written to `fmri(version)`.
pub const FEAT_VERSION: &str = "6.00";

/// Validate `params` and render the design without touching the filesystem
/// beyond existence checks and, when needed, one header read.
pub fn render(params: &AnalysisParameters) -> Result<RenderedDocument> {
    match params {
        AnalysisParameters::FirstLevel(p) => first_level::render(p),
        AnalysisParameters::HigherLevel(p) => higher_level::render(p),
    }
}

/// Render the design and write it to `<output_dir>/design.fsf`.
///
/// On any error no file is created and an existing design is left untouched.
pub fn generate(params: &AnalysisParameters) -> Result<RenderedDocument> {
    let document = render(params)?;
    document.write()?;
    Ok(document)
}
