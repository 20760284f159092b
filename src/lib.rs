//! # make-fsf
//!
//! Generate FSL FEAT design files (`design.fsf`) from a typed parameter record.
//!
//! The crate has two parts:
//!
//! - [`nifti`]: reads the header of a `.nii` / `.nii.gz` image to recover the
//!   repetition time, volume count and voxel count.
//! - [`fsf`]: validates analysis parameters, fills in unset timing values from
//!   the image header and renders the design in FEAT's fixed key order.
//!
//! ## Quick start
//!
//! ```no_run
//! use make_fsf::fsf::{self, FirstLevelParameters, DEFAULT_REGISTRATION_REFERENCE};
//!
//! let params = FirstLevelParameters::new(
//!     "/data/sub-01",
//!     "func/bold.nii.gz",
//!     "derivatives",
//!     DEFAULT_REGISTRATION_REFERENCE,
//! )
//! .ev("TaskA", "events/taskA.txt")
//! .ev("TaskB", "events/taskB.txt")
//! .contrast("TaskA>Baseline", [1.0, 0.0])
//! .contrast("TaskB>Baseline", [0.0, 1.0]);
//!
//! // TR and volume count come from the image header because they are unset.
//! let design = fsf::generate(&params.into())?;
//! println!("wrote {}", design.path().display());
//! # Ok::<(), make_fsf::Error>(())
//! ```

pub mod error;
pub mod fsf;
pub mod nifti;

pub use error::{Error, Result};
pub use fsf::{
    generate, render, AnalysisParameters, FirstLevelParameters, HigherLevelParameters,
    RenderedDocument,
};
pub use nifti::{read_metadata, read_repetition_time, read_volume_count, read_voxel_count};
