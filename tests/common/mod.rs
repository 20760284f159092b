//! Shared fixtures for integration tests.
#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use make_fsf::fsf::{FirstLevelParameters, DEFAULT_REGISTRATION_REFERENCE};
use make_fsf::nifti::{NiftiHeader, NiftiVersion, TemporalUnits};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Header of a 4-D 64x64x32 series with the given TR and volume count.
pub fn bold_header(repetition_time: f64, volumes: i64) -> NiftiHeader {
    let mut header = NiftiHeader::default();
    header.ndim = 4;
    header.dim = [64, 64, 32, volumes, 1, 1, 1];
    header.pixdim = [1.0, 3.0, 3.0, 3.5, repetition_time, 0.0, 0.0, 0.0];
    header.temporal_units = TemporalUnits::Second;
    header
}

/// The same series stored as NIfTI-2.
pub fn bold_header_v2(repetition_time: f64, volumes: i64) -> NiftiHeader {
    let mut header = bold_header(repetition_time, volumes);
    header.version = NiftiVersion::Nifti2;
    header.vox_offset = NiftiVersion::Nifti2.default_vox_offset();
    header
}

/// Write `header` followed by padding up to `vox_offset`, gzipped for `.gz`.
pub fn write_image(path: &Path, header: &NiftiHeader) -> PathBuf {
    let mut bytes = header.to_bytes();
    bytes.resize(header.vox_offset as usize, 0);

    if path.extension().map_or(false, |e| e == "gz") {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(&bytes).unwrap();
        fs::write(path, encoder.finish().unwrap()).unwrap();
    } else {
        fs::write(path, bytes).unwrap();
    }
    path.to_path_buf()
}

/// A subject directory holding a BOLD series, two EV timing files,
/// a confound file and an output directory.
pub struct Subject {
    pub dir: TempDir,
}

impl Subject {
    pub fn new(repetition_time: f64, volumes: i64) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("func")).unwrap();
        fs::create_dir(root.join("events")).unwrap();
        fs::create_dir(root.join("out")).unwrap();
        write_image(
            &root.join("func/bold.nii.gz"),
            &bold_header(repetition_time, volumes),
        );
        fs::write(root.join("events/taskA.txt"), "0 20 1\n60 20 1\n").unwrap();
        fs::write(root.join("events/taskB.txt"), "30 20 1\n90 20 1\n").unwrap();
        fs::write(root.join("confounds.txt"), "0.1\n0.2\n").unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn design_path(&self) -> PathBuf {
        self.root().join("out").join("design.fsf")
    }

    /// Two EVs and two contrasts, timing left to the header.
    pub fn params(&self) -> FirstLevelParameters {
        FirstLevelParameters::new(
            self.root(),
            "func/bold.nii.gz",
            "out",
            DEFAULT_REGISTRATION_REFERENCE,
        )
        .ev("TaskA", "events/taskA.txt")
        .ev("TaskB", "events/taskB.txt")
        .contrast("TaskA>Baseline", [1.0, 0.0])
        .contrast("TaskB>Baseline", [0.0, 1.0])
    }
}
