//! `NIfTI` header support.
//!
//! `NIfTI` (Neuroimaging Informatics Technology Initiative) is the standard format
//! for neuroimaging data. This module reads just enough of a `.nii` / `.nii.gz`
//! header to recover repetition time, volume count and voxel count.

pub(crate) mod header;
pub mod io;
pub mod metadata;

pub use header::{DataType, NiftiHeader, NiftiVersion, TemporalUnits};
pub use io::load_header;
pub use metadata::{
    read_metadata, read_repetition_time, read_volume_count, read_voxel_count, VolumeMetadata,
};
