//! End-to-end design generation against a temporary subject directory.

mod common;

use common::{bold_header, write_image, Subject};
use make_fsf::fsf::{self, AnalysisParameters, HigherLevelParameters, SectionKind};
use make_fsf::Error;
use std::fs;

fn generate(params: impl Into<AnalysisParameters>) -> make_fsf::Result<fsf::RenderedDocument> {
    fsf::generate(&params.into())
}

#[test]
fn test_two_conditions_with_explicit_timing() {
    let subject = Subject::new(3.0, 100);
    let params = subject.params().repetition_time(2.0).total_volumes(240);

    let document = generate(params).unwrap();
    assert_eq!(document.path(), subject.design_path());

    let body = fs::read_to_string(subject.design_path()).unwrap();
    assert_eq!(body, document.body());
    for line in [
        "set fmri(tr) 2.0",
        "set fmri(npts) 240",
        "set fmri(evs_orig) 2",
        "set fmri(ncon_orig) 2",
        "set fmri(evtitle1) \"TaskA\"",
        "set fmri(evtitle2) \"TaskB\"",
        "set fmri(conname_real.1) \"TaskA>Baseline\"",
        "set fmri(con_real1.1) 1",
        "set fmri(con_real1.2) 0",
        "set fmri(con_real2.1) 0",
        "set fmri(con_real2.2) 1",
    ] {
        assert!(body.lines().any(|l| l == line), "missing line: {}", line);
    }
}

#[test]
fn test_timing_defaults_from_header() {
    let subject = Subject::new(2.0, 180);

    let document = generate(subject.params()).unwrap();
    assert_eq!(document.value("fmri(tr)"), Some("2.0"));
    assert_eq!(document.value("fmri(npts)"), Some("180"));
}

#[test]
fn test_explicit_volume_count_keeps_header_tr() {
    let subject = Subject::new(1.5, 180);

    let document = generate(subject.params().total_volumes(170)).unwrap();
    assert_eq!(document.value("fmri(tr)"), Some("1.5"));
    assert_eq!(document.value("fmri(npts)"), Some("170"));
}

#[test]
fn test_non_positive_header_tr_writes_nothing() {
    let subject = Subject::new(0.0, 180);

    let err = generate(subject.params()).unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));
    assert!(!subject.design_path().exists());
}

#[test]
fn test_unreadable_input_when_timing_needed() {
    let subject = Subject::new(2.0, 180);
    fs::write(subject.root().join("func/bold.nii.gz"), "not gzip").unwrap();

    let err = generate(subject.params()).unwrap_err();
    assert!(matches!(err, Error::FileAccess { .. }));
    assert!(!subject.design_path().exists());

    // supplying both values means the header is never opened
    let params = subject.params().repetition_time(2.0).total_volumes(180);
    assert!(generate(params).is_ok());
}

#[test]
fn test_mismatched_ev_lists_write_nothing() {
    let subject = Subject::new(2.0, 180);
    let mut params = subject.params();
    params.ev_names.push("TaskC".to_string());

    let err = generate(params).unwrap_err();
    assert!(matches!(err, Error::ParameterMismatch(_)));
    assert!(!subject.design_path().exists());
}

#[test]
fn test_contrast_length_mismatch_writes_nothing() {
    let subject = Subject::new(2.0, 180);
    let params = subject.params().contrast("TaskA>TaskB", [1.0, -1.0, 0.0]);

    let err = generate(params).unwrap_err();
    assert!(matches!(err, Error::ParameterMismatch(_)));
    assert!(!subject.design_path().exists());
}

#[test]
fn test_non_finite_numbers_write_nothing() {
    let subject = Subject::new(2.0, 180);
    let mut params = subject.params().contrast("TaskA>TaskB", [f64::NAN, f64::INFINITY]);
    params.cluster_z = f64::NAN;
    params.spatial_smoothing = -5.0;

    let err = generate(params).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(!subject.design_path().exists());
}

#[test]
fn test_missing_paths_reported_by_kind() {
    let subject = Subject::new(2.0, 180);
    let root = subject.root().to_path_buf();

    let cases = [
        ("working directory", {
            let mut p = subject.params();
            p.working_dir = root.join("missing_subject");
            (p, root.join("missing_subject"))
        }),
        ("input file", {
            let mut p = subject.params();
            p.input_file = "func/missing.nii.gz".into();
            (p, root.join("func/missing.nii.gz"))
        }),
        ("output dir", {
            let mut p = subject.params();
            p.output_dir = "missing_out".into();
            (p, root.join("missing_out"))
        }),
        ("confound file", {
            let p = subject.params().confound_file("missing_confounds.txt");
            (p, root.join("missing_confounds.txt"))
        }),
        ("alternative reference", {
            let p = subject.params().alternative_reference("sbref.nii.gz");
            (p, root.join("sbref.nii.gz"))
        }),
        ("EV file", {
            let p = subject
                .params()
                .ev("TaskC", "events/taskC.txt")
                .contrast("TaskC>Baseline", [0.0, 0.0, 1.0]);
            (p, root.join("events/taskC.txt"))
        }),
    ];

    for (kind, (params, expected)) in cases {
        match generate(params) {
            Err(Error::PathNotFound(path)) => assert_eq!(path, expected, "{}", kind),
            other => panic!("{}: expected PathNotFound, got {:?}", kind, other),
        }
        assert!(!subject.design_path().exists(), "{}", kind);
    }
}

#[test]
fn test_generation_is_idempotent() {
    let subject = Subject::new(2.0, 180);
    let params: AnalysisParameters = subject.params().into();

    fsf::generate(&params).unwrap();
    let first = fs::read(subject.design_path()).unwrap();
    fsf::generate(&params).unwrap();
    let second = fs::read(subject.design_path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_existing_design_replaced_whole() {
    let subject = Subject::new(2.0, 180);
    let stale = "set fmri(level) 1\n".repeat(5000);
    fs::write(subject.design_path(), &stale).unwrap();

    let document = generate(subject.params()).unwrap();
    assert_eq!(
        fs::read_to_string(subject.design_path()).unwrap(),
        document.body()
    );
    // only the design itself in the output directory
    assert_eq!(fs::read_dir(subject.root().join("out")).unwrap().count(), 1);
}

#[test]
fn test_failed_run_leaves_previous_design() {
    let subject = Subject::new(2.0, 180);
    generate(subject.params()).unwrap();
    let before = fs::read_to_string(subject.design_path()).unwrap();

    let bad = subject.params().confound_file("missing.txt");
    assert!(generate(bad).is_err());
    assert_eq!(fs::read_to_string(subject.design_path()).unwrap(), before);
}

#[test]
fn test_flags_are_binary() {
    let subject = Subject::new(2.0, 180);
    let mut params = subject.params().confound_file("confounds.txt");
    params.brain_extraction = true;
    params.melodic_ica = true;

    let document = generate(params).unwrap();
    for key in [
        "fmri(inmelodic)",
        "fmri(mc)",
        "fmri(bet_yn)",
        "fmri(norm_yn)",
        "fmri(temphp_yn)",
        "fmri(melodic_yn)",
        "fmri(prewhiten_yn)",
        "fmri(confoundevs)",
        "fmri(alternateReference_yn)",
        "fmri(deriv_yn1)",
        "fmri(overwrite_yn)",
    ] {
        let value = document.value(key).unwrap_or_else(|| panic!("no {}", key));
        assert!(value == "1" || value == "0", "{} = {}", key, value);
    }
    assert_eq!(document.value("fmri(bet_yn)"), Some("1"));
    assert_eq!(document.value("fmri(melodic_yn)"), Some("1"));
}

#[test]
fn test_confounds_included_and_omitted() {
    let subject = Subject::new(2.0, 180);

    let without = generate(subject.params()).unwrap();
    assert_eq!(without.value("fmri(confoundevs)"), Some("0"));
    assert!(!without.body().contains("confoundev_files"));

    let with = generate(subject.params().confound_file("confounds.txt")).unwrap();
    assert_eq!(with.value("fmri(confoundevs)"), Some("1"));
    let expected = format!("\"{}\"", subject.root().join("confounds.txt").display());
    assert_eq!(with.value("confoundev_files(1)"), Some(expected.as_str()));
}

#[test]
fn test_sections_in_fixed_order() {
    let subject = Subject::new(2.0, 180);
    let document = generate(subject.params()).unwrap();

    let kinds: Vec<_> = document.sections().iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SectionKind::Global,
            SectionKind::Preprocessing,
            SectionKind::Registration,
            SectionKind::Statistics,
            SectionKind::Confounds,
            SectionKind::Inputs,
            SectionKind::ExplanatoryVariables,
            SectionKind::Contrasts,
            SectionKind::RunControl,
        ]
    );

    let body = document.body();
    let position = |key: &str| body.find(&format!("set {} ", key)).unwrap();
    assert!(position("fmri(version)") < position("fmri(mc)"));
    assert!(position("fmri(regstandard)") < position("fmri(prewhiten_yn)"));
    assert!(position("feat_files(1)") < position("fmri(evtitle1)"));
    assert!(position("fmri(evtitle2)") < position("fmri(conname_real.1)"));
    assert!(position("fmri(con_real2.2)") < position("fmri(overwrite_yn)"));
    assert!(body.ends_with("set fmri(overwrite_yn) 1\n"));
}

#[test]
fn test_yaml_parameters_end_to_end() {
    let subject = Subject::new(2.0, 180);
    let yaml = format!(
        "level: first_level
working_dir: {}
input_file: func/bold.nii.gz
output_dir: out
registration_reference: /opt/fsl/data/standard/MNI152_T1_2mm_brain
motion_correction: mcflirt
ev_files: [events/taskA.txt, events/taskB.txt]
ev_names: [TaskA, TaskB]
contrasts:
  - {{ name: TaskA>TaskB, weights: [1, -1] }}
",
        subject.root().display()
    );
    let path = subject.root().join("params.yaml");
    fs::write(&path, yaml).unwrap();

    let params = fsf::load_parameters(&path).unwrap();
    let document = fsf::generate(&params).unwrap();
    assert_eq!(document.value("fmri(mc)"), Some("1"));
    assert_eq!(document.value("fmri(con_real1.2)"), Some("-1"));
    assert_eq!(document.value("fmri(tr)"), Some("2.0"));
}

#[test]
fn test_higher_level_group_design() {
    let subject = Subject::new(2.0, 180);
    let root = subject.root();
    for run in ["run1.feat", "run2.feat", "run3.feat"] {
        fs::create_dir(root.join(run)).unwrap();
    }
    fs::create_dir(root.join("group")).unwrap();

    let mut params = HigherLevelParameters::new(
        root,
        "group",
        "/opt/fsl/data/standard/MNI152_T1_2mm_brain",
    )
    .ev("mean")
    .input("run1.feat", [1.0])
    .input("run2.feat", [1.0])
    .input("run3.feat", [1.0])
    .contrast("mean", [1.0]);
    params.cope_inputs = 2;

    let document = generate(params).unwrap();
    assert!(root.join("group/design.fsf").exists());
    assert_eq!(document.value("fmri(level)"), Some("2"));
    assert_eq!(document.value("fmri(npts)"), Some("3"));
    assert_eq!(document.value("fmri(ncopeinputs)"), Some("2"));
    assert_eq!(document.value("fmri(copeinput.2)"), Some("1"));
    assert_eq!(document.value("fmri(evg3.1)"), Some("1"));
    assert_eq!(document.value("fmri(groupmem.3)"), Some("1"));
    let expected = format!("\"{}\"", root.join("run2.feat").display());
    assert_eq!(document.value("feat_files(2)"), Some(expected.as_str()));
}

#[test]
fn test_higher_level_missing_input() {
    let subject = Subject::new(2.0, 180);
    fs::create_dir(subject.root().join("group")).unwrap();
    let params = HigherLevelParameters::new(subject.root(), "group", "/opt/std")
        .ev("mean")
        .input("run1.feat", [1.0]);

    match generate(params) {
        Err(Error::PathNotFound(path)) => assert_eq!(path, subject.root().join("run1.feat")),
        other => panic!("expected PathNotFound, got {:?}", other),
    }
}

#[test]
fn test_voxel_count_written_when_supplied() {
    let subject = Subject::new(2.0, 180);
    let image = subject.root().join("func/bold.nii.gz");
    write_image(&image, &bold_header(2.0, 10));

    let mut params = subject.params();
    params.total_voxels = Some(make_fsf::read_voxel_count(&image).unwrap());

    let document = generate(params).unwrap();
    assert_eq!(document.value("fmri(totalVoxels)"), Some("1310720"));
}

#[test]
fn test_voxel_count_read_with_timing() {
    let subject = Subject::new(2.0, 10);

    let document = generate(subject.params().count_voxels()).unwrap();
    assert_eq!(document.value("fmri(totalVoxels)"), Some("1310720"));
    assert_eq!(document.value("fmri(npts)"), Some("10"));

    let without = generate(subject.params()).unwrap();
    assert_eq!(without.value("fmri(totalVoxels)"), None);
}

#[test]
fn test_voxel_count_waits_for_validation() {
    let subject = Subject::new(2.0, 10);
    fs::write(subject.root().join("func/bold.nii.gz"), "not gzip").unwrap();
    let params = subject
        .params()
        .repetition_time(2.0)
        .total_volumes(10)
        .confound_file("missing.txt")
        .count_voxels();

    match generate(params) {
        Err(Error::PathNotFound(path)) => assert_eq!(path, subject.root().join("missing.txt")),
        other => panic!("expected PathNotFound, got {:?}", other),
    }
}
