//! Higher-level (group / cross-run) design rendering.

use super::document::{RenderedDocument, Section, SectionKind};
use super::first_level::contrasts;
use super::options::InputType;
use super::params::HigherLevelParameters;
use super::validate::{self, HigherLevelPaths};
use super::{DESIGN_FILE_NAME, FEAT_VERSION};
use crate::error::Result;

pub(crate) fn render(params: &HigherLevelParameters) -> Result<RenderedDocument> {
    let paths = validate::higher_level(params)?;

    let sections = vec![
        global(params, &paths),
        registration(params),
        statistics(params),
        inputs(&paths),
        explanatory_variables(params),
        contrasts(&params.contrasts),
        run_control(),
    ];

    Ok(RenderedDocument::new(
        paths.output_dir.join(DESIGN_FILE_NAME),
        sections,
    ))
}

fn global(params: &HigherLevelParameters, paths: &HigherLevelPaths) -> Section {
    let n_inputs = paths.inputs.len();
    let n_evs = params.ev_names.len();
    let n_contrasts = params.contrasts.len();

    let mut s = Section::new(SectionKind::Global);
    s.comment("FEAT version number").set("fmri(version)", FEAT_VERSION);
    s.comment("Are we in MELODIC?").set_flag("fmri(inmelodic)", false);
    s.comment("Analysis level").set("fmri(level)", 2);
    s.comment("Which stages to run: 2 = statistics only").set("fmri(analysis)", 2);
    s.comment("Use relative filenames").set_flag("fmri(relative_yn)", false);
    s.comment("Output directory").set_path("fmri(outputdir)", &paths.output_dir);
    s.comment("Number of inputs")
        .set("fmri(npts)", n_inputs)
        .set("fmri(multiple)", n_inputs);
    s.comment("Higher-level input type")
        .set_quoted("fmri(inputtype)", params.input_type);
    if params.input_type == InputType::FeatDirectories {
        s.comment("Number of lower-level copes feeding into higher-level analysis")
            .set("fmri(ncopeinputs)", params.cope_inputs);
        for cope in 1..=params.cope_inputs {
            s.set_flag(format_args!("fmri(copeinput.{})", cope), true);
        }
    }
    s.comment("Number of EVs")
        .set("fmri(evs_orig)", n_evs)
        .set("fmri(evs_real)", n_evs)
        .set("fmri(evs_vox)", 0);
    s.comment("Number of contrasts")
        .set("fmri(ncon_orig)", n_contrasts)
        .set("fmri(ncon_real)", n_contrasts);
    s.comment("Number of F-tests")
        .set("fmri(nftests_orig)", 0)
        .set("fmri(nftests_real)", 0);
    s
}

fn registration(params: &HigherLevelParameters) -> Section {
    let mut s = Section::new(SectionKind::Registration);
    s.comment("Standard image")
        .set_path("fmri(regstandard)", &params.registration_reference);
    s
}

fn statistics(params: &HigherLevelParameters) -> Section {
    let mut s = Section::new(SectionKind::Statistics);
    s.comment("Higher-level modelling")
        .set_quoted("fmri(mixed_yn)", params.mixed_effects);
    s.comment("Thresholding").set_quoted("fmri(thresh)", params.thresholding);
    s.comment("Z threshold").set_real("fmri(z_thresh)", params.cluster_z);
    s.comment("P threshold").set_real("fmri(prob_thresh)", params.cluster_p);
    s
}

fn inputs(paths: &HigherLevelPaths) -> Section {
    let mut s = Section::new(SectionKind::Inputs);
    for (i, input) in paths.inputs.iter().enumerate() {
        s.comment(format_args!("4D AVW data or FEAT directory ({})", i + 1))
            .set_path(format_args!("feat_files({})", i + 1), input);
    }
    s
}

fn explanatory_variables(params: &HigherLevelParameters) -> Section {
    let mut s = Section::new(SectionKind::ExplanatoryVariables);
    for (e, name) in params.ev_names.iter().enumerate() {
        let ev = e + 1;
        s.comment(format_args!("EV {} title", ev))
            .set_quoted(format_args!("fmri(evtitle{})", ev), name);
        // Custom (1 entry per volume), unconvolved.
        s.comment(format_args!("Basic waveform shape (EV {})", ev))
            .set(format_args!("fmri(shape{})", ev), 2);
        s.comment(format_args!("Convolution (EV {})", ev))
            .set(format_args!("fmri(convolve{})", ev), 0)
            .set(format_args!("fmri(convolve_phase{})", ev), 0)
            .set_flag(format_args!("fmri(tempfilt_yn{})", ev), false)
            .set_flag(format_args!("fmri(deriv_yn{})", ev), false)
            .set_quoted(format_args!("fmri(custom{})", ev), "dummy");
        for (i, row) in params.ev_values.iter().enumerate() {
            s.comment(format_args!("Higher-level EV value for EV {} and input {}", ev, i + 1))
                .set_weight(format_args!("fmri(evg{}.{})", i + 1, ev), row[e]);
        }
    }
    for i in 0..params.inputs.len() {
        let group = params.group_membership.get(i).copied().unwrap_or(1);
        s.comment(format_args!("Group membership for input {}", i + 1))
            .set(format_args!("fmri(groupmem.{})", i + 1), group);
    }
    s
}

fn run_control() -> Section {
    let mut s = Section::new(SectionKind::RunControl);
    s.comment("Run Featwatcher").set_flag("fmri(featwatcher_yn)", false);
    s.comment("Overwrite existing output").set_flag("fmri(overwrite_yn)", true);
    s
}
