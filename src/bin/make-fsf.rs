use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use make_fsf::fsf::{
    self, config, AnalysisParameters, FirstLevelParameters, HigherLevelParameters,
    ParameterFormat, DEFAULT_REGISTRATION_REFERENCE,
};
use make_fsf::nifti;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "make-fsf", version, about = "Generate FSL FEAT design files")]
struct Cli {
    /// Log phase transitions and header reads
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a design from a YAML or JSON parameter file
    Render {
        /// Parameter file (.yaml, .yml or .json)
        params: PathBuf,
        /// Override the repetition time in seconds (first-level only)
        #[arg(long)]
        repetition_time: Option<f64>,
        /// Override the number of volumes (first-level only)
        #[arg(long)]
        volumes: Option<u64>,
        /// Print the design to stdout instead of writing design.fsf
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the timing metadata of a NIfTI image
    Inspect {
        /// .nii or .nii.gz image
        image: PathBuf,
    },
    /// Print an example parameter file
    Template {
        #[arg(long, value_enum, default_value_t = Level::First)]
        level: Level,
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Level {
    First,
    Higher,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<Format> for ParameterFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => ParameterFormat::Yaml,
            Format::Json => ParameterFormat::Json,
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let directive = if verbose { "make_fsf=debug" } else { "make_fsf=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Render {
            params,
            repetition_time,
            volumes,
            dry_run,
        } => {
            let mut parameters = fsf::load_parameters(&params)
                .with_context(|| format!("loading parameters from {}", params.display()))?;

            if let AnalysisParameters::FirstLevel(p) = &mut parameters {
                p.repetition_time = repetition_time.or(p.repetition_time);
                p.total_volumes = volumes.or(p.total_volumes);
                p.count_voxels = true;
            } else if repetition_time.is_some() || volumes.is_some() {
                tracing::warn!("--repetition-time and --volumes only apply to first-level designs");
            }

            if dry_run {
                let document = fsf::render(&parameters)?;
                print!("{}", document.body());
            } else {
                let document = fsf::generate(&parameters)?;
                println!("FSF file generated: {}", document.path().display());
            }
        }
        Commands::Inspect { image } => {
            let metadata = nifti::read_metadata(&image)?;
            println!("file:        {}", image.display());
            println!("shape:       {:?}", metadata.header().shape());
            match metadata.repetition_time() {
                Ok(tr) => println!("TR (s):      {:?}", tr),
                Err(e) => println!("TR (s):      unavailable ({})", e),
            }
            println!("volumes:     {}", metadata.volume_count());
            println!("voxels:      {}", metadata.voxel_count());
        }
        Commands::Template { level, format } => {
            let parameters: AnalysisParameters = match level {
                Level::First => FirstLevelParameters::new(
                    "/path/to/subject",
                    "func/bold.nii.gz",
                    "derivatives",
                    DEFAULT_REGISTRATION_REFERENCE,
                )
                .ev("TaskA", "events/taskA.txt")
                .ev("TaskB", "events/taskB.txt")
                .contrast("TaskA>Baseline", [1.0, 0.0])
                .contrast("TaskB>Baseline", [0.0, 1.0])
                .into(),
                Level::Higher => HigherLevelParameters::new(
                    "/path/to/study",
                    "group",
                    DEFAULT_REGISTRATION_REFERENCE,
                )
                .ev("mean")
                .input("sub-01/run1.feat", [1.0])
                .input("sub-02/run1.feat", [1.0])
                .contrast("mean", [1.0])
                .into(),
            };
            print!("{}", config::to_string(&parameters, format.into())?);
        }
    }

    Ok(())
}
