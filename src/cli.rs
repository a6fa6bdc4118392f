//! The command line interface for the program.
use crate::calculation::calculate;
use crate::codec;
use crate::configuration::ProcessConfiguration;
use crate::input::{CONFIGURATION_FILE_NAME, read_configuration_blob, read_dynamic_inputs};
use crate::log;
use crate::output::metadata::write_metadata;
use crate::output::{DataWriter, create_output_directory, get_output_dir};
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the program.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Calculate the material flow costs for a process.
    Run {
        /// Path to the process directory.
        process_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Manage example processes.
    Example {
        /// The available subcommands for managing example processes.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Validate a process directory.
    Validate {
        /// The path to the process directory.
        process_dir: PathBuf,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { process_dir, opts } => handle_run_command(&process_dir, &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate { process_dir } => handle_validate_command(&process_dir, None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ mfca --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Handle the `run` command.
pub fn handle_run_command(
    process_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(process_path)?;
        &pathbuf
    };

    // Overwriting can also be enabled in the settings file
    let allow_overwrite = opts.overwrite || settings.overwrite;
    let overwrite = create_output_directory(output_path, allow_overwrite).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_path.display()
        )
    })?;

    // Initialise program logger
    log::init(&settings.log_level, Some(output_path)).context("Failed to initialise logging.")?;
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    // A missing or malformed configuration means the process has not been set up yet
    let blob = read_configuration_blob(process_path).context("Failed to load process.")?;
    let config = codec::try_load(blob.as_deref());
    let dynamic_inputs =
        read_dynamic_inputs(process_path).context("Failed to load material inputs.")?;
    info!("Loaded process from {}", process_path.display());

    let output = calculate(config.as_ref(), dynamic_inputs)
        .context("Failed to calculate process costs.")?;

    let mut writer = DataWriter::create(output_path)?;
    writer.write_output(&output)?;
    writer.flush()?;
    write_metadata(
        output_path,
        process_path,
        config.as_ref().map(ProcessConfiguration::process),
    )
    .context("Failed to save metadata.")?;
    info!("Calculation complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(process_path: &Path, settings: Option<Settings>) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    // Unlike the run command, a process must be configured to pass validation
    let blob = read_configuration_blob(process_path)
        .and_then(|blob| blob.with_context(|| format!("Missing {CONFIGURATION_FILE_NAME} file")))
        .context("Failed to validate process.")?;
    let config = codec::decode(&blob).context("Failed to validate process.")?;
    let dynamic_inputs =
        read_dynamic_inputs(process_path).context("Failed to validate material inputs.")?;
    calculate(Some(&config), dynamic_inputs).context("Failed to validate material inputs.")?;
    info!("Process validation successful!");

    Ok(())
}
