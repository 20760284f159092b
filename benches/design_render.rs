//! Criterion benchmarks for design rendering and header reads.
//!
//! Run with: cargo bench --bench design_render

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flate2::write::GzEncoder;
use flate2::Compression;
use make_fsf::fsf::{self, AnalysisParameters, FirstLevelParameters};
use make_fsf::nifti::{self, NiftiHeader, TemporalUnits};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn bold_header() -> NiftiHeader {
    let mut header = NiftiHeader::default();
    header.ndim = 4;
    header.dim = [64, 64, 32, 240, 1, 1, 1];
    header.pixdim = [1.0, 3.0, 3.0, 3.5, 2.0, 0.0, 0.0, 0.0];
    header.temporal_units = TemporalUnits::Second;
    header
}

fn write_image(path: &Path, compressed: bool) {
    let mut bytes = bold_header().to_bytes();
    bytes.resize(352, 0);
    if compressed {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(&bytes).unwrap();
        fs::write(path, encoder.finish().unwrap()).unwrap();
    } else {
        fs::write(path, bytes).unwrap();
    }
}

/// Subject directory with `n_evs` timing files and a gzipped series.
fn subject(n_evs: usize) -> (TempDir, AnalysisParameters) {
    let dir = tempfile::tempdir().unwrap();
    write_image(&dir.path().join("bold.nii.gz"), true);
    fs::create_dir(dir.path().join("out")).unwrap();

    let mut params = FirstLevelParameters::new(
        dir.path(),
        "bold.nii.gz",
        "out",
        fsf::DEFAULT_REGISTRATION_REFERENCE,
    );
    for e in 0..n_evs {
        let file = format!("ev{}.txt", e + 1);
        fs::write(dir.path().join(&file), "0 20 1\n").unwrap();
        params = params.ev(format!("EV{}", e + 1), file);
    }
    for e in 0..n_evs {
        let mut weights = vec![0.0; n_evs];
        weights[e] = 1.0;
        params = params.contrast(format!("EV{}>Baseline", e + 1), weights);
    }
    (dir, params.into())
}

fn bench_read_metadata(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_metadata");
    let dir = tempfile::tempdir().unwrap();

    for (label, name, compressed) in [
        ("uncompressed", "bold.nii", false),
        ("gzip", "bold.nii.gz", true),
    ] {
        let path = dir.path().join(name);
        write_image(&path, compressed);
        group.bench_with_input(BenchmarkId::new("header", label), &path, |b, path| {
            b.iter(|| black_box(nifti::read_metadata(black_box(path)).unwrap()))
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_first_level");

    for &n_evs in &[2usize, 8, 32] {
        let (_dir, params) = subject(n_evs);
        group.bench_with_input(BenchmarkId::new("evs", n_evs), &params, |b, params| {
            b.iter(|| black_box(fsf::render(black_box(params)).unwrap()))
        });
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let (_dir, params) = subject(4);
    c.bench_function("generate_first_level", |b| {
        b.iter(|| black_box(fsf::generate(black_box(&params)).unwrap()))
    });
}

criterion_group!(benches, bench_read_metadata, bench_render, bench_generate);
criterion_main!(benches);
