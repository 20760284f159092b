//! First-level (single run) design rendering.

use super::document::{RenderedDocument, Section, SectionKind};
use super::params::{Contrast, FirstLevelParameters};
use super::validate::{self, FirstLevelPaths};
use super::{DESIGN_FILE_NAME, FEAT_VERSION};
use crate::error::Result;
use crate::nifti;
use std::path::Path;

/// Repetition time, volume count and voxel count after header defaulting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Timing {
    pub repetition_time: f64,
    pub total_volumes: u64,
    pub total_voxels: Option<u64>,
}

/// Fill in whichever header-derived values the caller left unset.
///
/// One header read serves all of them; reader errors propagate unchanged.
fn resolve_timing(params: &FirstLevelParameters, input_file: &Path) -> Result<Timing> {
    let needs_voxels = params.count_voxels && params.total_voxels.is_none();
    if let (Some(repetition_time), Some(total_volumes), false) =
        (params.repetition_time, params.total_volumes, needs_voxels)
    {
        return Ok(Timing {
            repetition_time,
            total_volumes,
            total_voxels: params.total_voxels,
        });
    }

    let metadata = nifti::read_metadata(input_file)?;
    let repetition_time = match params.repetition_time {
        Some(tr) => tr,
        None => metadata.repetition_time()?,
    };
    let total_volumes = params
        .total_volumes
        .unwrap_or_else(|| metadata.volume_count());
    let total_voxels = params
        .total_voxels
        .or_else(|| needs_voxels.then(|| metadata.voxel_count()));

    tracing::debug!(
        repetition_time,
        total_volumes,
        ?total_voxels,
        input = %input_file.display(),
        "resolved timing from input header"
    );

    Ok(Timing {
        repetition_time,
        total_volumes,
        total_voxels,
    })
}

pub(crate) fn render(params: &FirstLevelParameters) -> Result<RenderedDocument> {
    let paths = validate::first_level(params)?;
    let timing = resolve_timing(params, &paths.input_file)?;

    let sections = vec![
        global(params, &paths, timing),
        preprocessing(params),
        registration(params),
        statistics(params),
        confounds(&paths),
        inputs(&paths),
        explanatory_variables(params, &paths),
        contrasts(&params.contrasts),
        run_control(),
    ];

    Ok(RenderedDocument::new(
        paths.output_dir.join(DESIGN_FILE_NAME),
        sections,
    ))
}

fn global(params: &FirstLevelParameters, paths: &FirstLevelPaths, timing: Timing) -> Section {
    let n_evs = params.ev_names.len();
    let n_contrasts = params.contrasts.len();

    let mut s = Section::new(SectionKind::Global);
    s.comment("FEAT version number")
        .set("fmri(version)", FEAT_VERSION);
    s.comment("Are we in MELODIC?")
        .set_flag("fmri(inmelodic)", false);
    s.comment("Analysis level").set("fmri(level)", 1);
    s.comment("Which stages to run: 7 = full first-level analysis")
        .set("fmri(analysis)", 7);
    s.comment("Use relative filenames")
        .set_flag("fmri(relative_yn)", false);
    s.comment("Output directory")
        .set_path("fmri(outputdir)", &paths.output_dir);
    s.comment("TR(s)")
        .set_real("fmri(tr)", timing.repetition_time);
    s.comment("Total volumes")
        .set("fmri(npts)", timing.total_volumes);
    s.comment("Delete volumes")
        .set("fmri(ndelete)", params.delete_volumes);
    s.comment("Perfusion tag/control order")
        .set_flag("fmri(tagfirst)", true);
    s.comment("Number of first-level analyses")
        .set("fmri(multiple)", 1)
        .set_flag("fmri(multilev_yn)", false);
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
    s.comment("Number of parametric EVs").set("fmri(parevs)", 0);
    if let Some(voxels) = timing.total_voxels {
        s.comment("Total voxels").set("fmri(totalVoxels)", voxels);
    }
    s
}

fn preprocessing(params: &FirstLevelParameters) -> Section {
    let mut s = Section::new(SectionKind::Preprocessing);
    s.comment("Motion correction")
        .set_flag("fmri(mc)", params.motion_correction.is_enabled());
    s.comment("B0 unwarping")
        .set_flag("fmri(regunwarp_yn)", params.b0_unwarping);
    s.comment("Slice timing correction")
        .set("fmri(st)", params.slice_timing.code());
    s.comment("BET brain extraction")
        .set_flag("fmri(bet_yn)", params.brain_extraction);
    s.comment("Spatial smoothing FWHM (mm)")
        .set_real("fmri(smooth)", params.spatial_smoothing);
    s.comment("Intensity normalization")
        .set_flag("fmri(norm_yn)", params.intensity_normalization);
    s.comment("Perfusion subtraction")
        .set_flag("fmri(perfsub_yn)", params.perfusion_subtraction);
    s.comment("Highpass temporal filtering")
        .set_flag("fmri(temphp_yn)", params.temporal_highpass)
        .set_real("fmri(paradigm_hp)", params.high_pass_cutoff);
    s.comment("MELODIC ICA data exploration")
        .set_flag("fmri(melodic_yn)", params.melodic_ica);
    s
}

fn registration(params: &FirstLevelParameters) -> Section {
    let mut s = Section::new(SectionKind::Registration);
    s.comment("Registration to standard image")
        .set_flag("fmri(regstandard_yn)", true)
        .set_path("fmri(regstandard)", &params.registration_reference);
    s.comment("Search space for registration to standard space")
        .set_quoted("fmri(regstandard_search)", params.linear_search);
    s.comment("Degrees of Freedom for registration to standard space")
        .set_quoted("fmri(regstandard_dof)", params.dof);
    s
}

fn statistics(params: &FirstLevelParameters) -> Section {
    let mut s = Section::new(SectionKind::Statistics);
    s.comment("FILM prewhitening")
        .set_flag("fmri(prewhiten_yn)", params.prewhitening);
    s.comment("Thresholding")
        .set_quoted("fmri(thresh)", params.thresholding);
    s.comment("Z threshold")
        .set_real("fmri(z_thresh)", params.cluster_z);
    s.comment("P threshold")
        .set_real("fmri(prob_thresh)", params.cluster_p);
    s.comment("Create time series plots")
        .set_flag("fmri(tsplot_yn)", params.timeseries_plots);
    s
}

fn confounds(paths: &FirstLevelPaths) -> Section {
    let mut s = Section::new(SectionKind::Confounds);
    s.comment("Confound EVs text file");
    match &paths.confound_file {
        Some(file) => {
            s.set_flag("fmri(confoundevs)", true)
                .set_path("confoundev_files(1)", file);
        }
        None => {
            s.set_flag("fmri(confoundevs)", false);
        }
    }
    s.comment("Add motion parameters to model")
        .set("fmri(motionevs)", 0)
        .set_quoted("fmri(motionevsbeta)", "");
    s
}

fn inputs(paths: &FirstLevelPaths) -> Section {
    let mut s = Section::new(SectionKind::Inputs);
    s.comment("4D AVW data or FEAT directory (1)")
        .set_path("feat_files(1)", &paths.input_file);
    s.comment("Alternative (e.g. single-band) reference image");
    match &paths.alternative_reference {
        Some(reference) => {
            s.set_flag("fmri(alternateReference_yn)", true)
                .set_path("alt_ex_func(1)", reference);
        }
        None => {
            s.set_flag("fmri(alternateReference_yn)", false);
        }
    }
    s
}

fn explanatory_variables(params: &FirstLevelParameters, paths: &FirstLevelPaths) -> Section {
    let mut s = Section::new(SectionKind::ExplanatoryVariables);
    for (i, (name, file)) in params.ev_names.iter().zip(&paths.ev_files).enumerate() {
        let ev = i + 1;
        s.comment(format_args!("EV {} title", ev))
            .set_quoted(format_args!("fmri(evtitle{})", ev), name);
        // Custom (3 column format), convolved with a double-gamma HRF.
        s.comment(format_args!("Basic waveform shape (EV {})", ev))
            .set(format_args!("fmri(shape{})", ev), 3);
        s.comment(format_args!("Convolution (EV {})", ev))
            .set(format_args!("fmri(convolve{})", ev), 3)
            .set(format_args!("fmri(convolve_phase{})", ev), 0)
            .set_flag(format_args!("fmri(tempfilt_yn{})", ev), true);
        s.comment(format_args!("Add temporal derivative (EV {})", ev))
            .set_flag(format_args!("fmri(deriv_yn{})", ev), true);
        s.comment(format_args!("Custom EV file (EV {})", ev))
            .set_path(format_args!("fmri(custom{})", ev), file);

        for entry in params.orthogonalization.iter().filter(|o| o.ev == ev) {
            s.comment(format_args!(
                "Orthogonalise EV {} wrt EV {}",
                entry.ev, entry.against
            ))
            .set_flag(
                format_args!("fmri(ortho{}.{})", entry.ev, entry.against),
                entry.enabled,
            );
        }
    }
    s
}

/// Contrast block shared by both analysis levels.
pub(crate) fn contrasts(contrasts: &[Contrast]) -> Section {
    let mut s = Section::new(SectionKind::Contrasts);
    s.comment("Contrast & F-tests mode")
        .set("fmri(con_mode_old)", "real")
        .set("fmri(con_mode)", "real");
    for (j, contrast) in contrasts.iter().enumerate() {
        let con = j + 1;
        s.comment(format_args!("Display images for contrast_real {}", con))
            .set_flag(format_args!("fmri(conpic_real.{})", con), true);
        s.comment(format_args!("Title for contrast_real {}", con))
            .set_quoted(format_args!("fmri(conname_real.{})", con), &contrast.name);
        for (k, &w) in contrast.weights.iter().enumerate() {
            s.comment(format_args!(
                "Real contrast_real vector {} element {}",
                con,
                k + 1
            ))
            .set_weight(format_args!("fmri(con_real{}.{})", con, k + 1), w);
        }
    }
    s
}

fn run_control() -> Section {
    let mut s = Section::new(SectionKind::RunControl);
    s.comment("Run Featwatcher")
        .set_flag("fmri(featwatcher_yn)", false);
    s.comment("Cleanup first-level standard-space images")
        .set_flag("fmri(cleanup_firstlevel)", false);
    s.comment("Overwrite existing output")
        .set_flag("fmri(overwrite_yn)", true);
    s
}
