//! Header-only NIfTI reading.
//!
//! - Memory-mapped reading for uncompressed `.nii` files
//! - Streaming gzip decode of just the header bytes for `.nii.gz`

use super::header::NiftiHeader;
use crate::error::Result;
use flate2::bufread::MultiGzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub(crate) fn is_gzipped(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "gz")
}

/// Load only the header from a NIfTI file.
///
/// The voxel data is never touched, so this is cheap even for long 4-D runs.
/// Both NIfTI-1 and NIfTI-2 headers are recognised in either byte order.
///
/// # Example
/// ```ignore
/// let header = make_fsf::nifti::load_header("sub-01_task-rest_bold.nii.gz")?;
/// println!("{:?}", header.shape());
/// ```
#[allow(unsafe_code)]
pub fn load_header<P: AsRef<Path>>(path: P) -> Result<NiftiHeader> {
    let path = path.as_ref();

    if is_gzipped(path) {
        let file = File::open(path)?;
        let decoder = MultiGzDecoder::new(BufReader::new(file));
        // Large enough for either version; a NIfTI-1 file may hold fewer
        // decompressed bytes than a NIfTI-2 header.
        let mut header_buf = Vec::with_capacity(NiftiHeader::SIZE_V2);
        decoder
            .take(NiftiHeader::SIZE_V2 as u64)
            .read_to_end(&mut header_buf)?;
        NiftiHeader::from_bytes(&header_buf)
    } else {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return NiftiHeader::from_bytes(&[]);
        }
        // SAFETY: Memory mapping is safe - file just opened, read-only access
        let mmap = unsafe { Mmap::map(&file)? };
        NiftiHeader::from_bytes(&mmap)
    }
}
