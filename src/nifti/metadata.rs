//! Scalar facts a FEAT design needs from a functional image.
//!
//! Each `read_*` function opens the file on its own. [`read_metadata`] opens it
//! once and hands back a [`VolumeMetadata`] whose accessors keep the same
//! per-field failure behaviour, so a caller needing several values pays for a
//! single header read.

use super::header::NiftiHeader;
use super::io::load_header;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Header-derived metadata of one NIfTI file.
#[derive(Debug, Clone)]
pub struct VolumeMetadata {
    path: PathBuf,
    header: NiftiHeader,
}

impl VolumeMetadata {
    /// Path the header was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed header.
    pub fn header(&self) -> &NiftiHeader {
        &self.header
    }

    /// Repetition time in seconds, taken from `pixdim[4]`.
    ///
    /// Images without a time axis have no repetition time and yield
    /// [`Error::NotFound`]. A value that is not finite and strictly positive
    /// yields [`Error::InvalidValue`]. Millisecond and microsecond units are
    /// converted to seconds.
    pub fn repetition_time(&self) -> Result<f64> {
        if self.header.ndim < 4 {
            return Err(Error::NotFound {
                path: self.path.clone(),
                field: "repetition time (pixdim[4])",
            });
        }

        let raw = self.header.pixdim[4];
        if !raw.is_finite() || raw <= 0.0 {
            return Err(Error::InvalidValue {
                path: self.path.clone(),
                field: "repetition time (pixdim[4])",
                value: raw,
            });
        }

        let scale = self.header.temporal_units.seconds_per_unit();
        if scale == 1.0 {
            Ok(raw)
        } else {
            // Round through the shortest decimal so 720 ms reads as 0.72 s.
            let seconds = raw * scale;
            Ok(format!("{:.9}", seconds).parse().unwrap_or(seconds))
        }
    }

    /// Number of volumes: the extent of the fourth (time) axis, also for
    /// 5-D and higher images. A 3-D image is one volume.
    pub fn volume_count(&self) -> u64 {
        if self.header.ndim >= 4 {
            self.header.dim[3] as u64
        } else {
            1
        }
    }

    /// Total element count across every axis, time included.
    pub fn voxel_count(&self) -> u64 {
        self.header.num_voxels()
    }
}

/// Read the header of `path` once.
///
/// Any failure to open, decompress or parse the file is reported as
/// [`Error::FileAccess`] naming `path`.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<VolumeMetadata> {
    let path = path.as_ref();
    let header = load_header(path).map_err(|e| Error::file_access(path, e))?;
    tracing::debug!(
        path = %path.display(),
        shape = ?header.shape(),
        tr = header.pixdim[4],
        "read NIfTI header"
    );
    Ok(VolumeMetadata {
        path: path.to_path_buf(),
        header,
    })
}

/// Repetition time of the image at `path`, in seconds.
pub fn read_repetition_time<P: AsRef<Path>>(path: P) -> Result<f64> {
    read_metadata(path)?.repetition_time()
}

/// Number of volumes in the image at `path`.
pub fn read_volume_count<P: AsRef<Path>>(path: P) -> Result<u64> {
    Ok(read_metadata(path)?.volume_count())
}

/// Total voxel count (all axes) of the image at `path`.
pub fn read_voxel_count<P: AsRef<Path>>(path: P) -> Result<u64> {
    Ok(read_metadata(path)?.voxel_count())
}
