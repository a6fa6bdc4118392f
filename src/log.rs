//! Program logging, built on `fern`.
//!
//! Messages at `info` level and below go to stdout, warnings and errors to stderr. When a run has
//! an output folder, the same messages are also written to `mfca_info.log` and `mfca_error.log`
//! inside it, so that the log of a calculation sits next to its results.
use anyhow::{Context, Result, bail};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::{Arguments, Display};
use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

/// A flag indicating whether the logger has been initialised
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// The environment variable which overrides the log level from the settings file
const LOG_LEVEL_ENV_VAR: &str = "MFCA_LOG_LEVEL";

/// The default log level for the program.
///
/// Used as a fallback if the user hasn't specified something else with the `MFCA_LOG_LEVEL`
/// environment variable or the settings file.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The file name for the log file containing messages about the ordinary operation of the program
const LOG_INFO_FILE_NAME: &str = "mfca_info.log";

/// The file name for the log file containing warnings and error messages
const LOG_ERROR_FILE_NAME: &str = "mfca_error.log";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Convert a log level string to a [`LevelFilter`]
fn parse_log_level(log_level: &str) -> Result<LevelFilter> {
    let level = match log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    };

    Ok(level)
}

/// Pick the log level, preferring the environment over the settings file
fn resolve_log_level(from_env: Option<&str>, from_settings: &str) -> Result<LevelFilter> {
    match from_env {
        Some(level) => parse_log_level(level)
            .with_context(|| format!("Invalid value for {LOG_LEVEL_ENV_VAR}")),
        None => parse_log_level(from_settings).context("Invalid log level in settings file"),
    }
}

/// Initialise the program logger.
///
/// The level is taken from the `MFCA_LOG_LEVEL` environment variable if set, otherwise from the
/// settings file (`log_level_from_settings`). Valid levels are `off`, `error`, `warn`, `info`,
/// `debug` and `trace`.
///
/// If `log_file_path` is given, log files are created (or truncated) in that folder. Fails if
/// the logger has already been initialised.
pub fn init(log_level_from_settings: &str, log_file_path: Option<&Path>) -> Result<()> {
    let from_env = env::var(LOG_LEVEL_ENV_VAR).ok();
    let log_level = resolve_log_level(from_env.as_deref(), log_level_from_settings)?;

    let mut dispatch = Dispatch::new()
        .chain(console_dispatch(log_level, false))
        .chain(console_dispatch(log_level, true));
    if let Some(log_file_path) = log_file_path {
        dispatch = dispatch.chain(log_files_dispatch(log_level, log_file_path)?);
    }

    dispatch.apply()?;
    let _ = LOGGER_INIT.set(());

    Ok(())
}

/// Terminal output, coloured when attached to a TTY.
///
/// With `errors` set, this is the stderr sink for warnings and errors; otherwise it is the stdout
/// sink for everything else.
fn console_dispatch(log_level: LevelFilter, errors: bool) -> Dispatch {
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    if errors {
        let use_colour = std::io::stderr().is_terminal();
        Dispatch::new()
            .format(move |out, message, record| {
                write_log_colour(out, message, record, use_colour, &colours);
            })
            .level(log_level.min(LevelFilter::Warn))
            .chain(std::io::stderr())
    } else {
        let use_colour = std::io::stdout().is_terminal();
        Dispatch::new()
            .filter(|metadata| metadata.level() > LevelFilter::Warn)
            .format(move |out, message, record| {
                write_log_colour(out, message, record, use_colour, &colours);
            })
            .level(log_level)
            .chain(std::io::stdout())
    }
}

/// Plain-text log files in the output folder.
///
/// The info file always records at least `info` messages, whatever the console level, and the
/// error file always records warnings and errors.
fn log_files_dispatch(log_level: LevelFilter, dir: &Path) -> Result<Dispatch> {
    let info_file = create_log_file(&dir.join(LOG_INFO_FILE_NAME))?;
    let error_file = create_log_file(&dir.join(LOG_ERROR_FILE_NAME))?;

    Ok(Dispatch::new()
        .format(write_log_plain)
        .chain(
            Dispatch::new()
                .filter(|metadata| metadata.level() > LevelFilter::Warn)
                .level(log_level.max(LevelFilter::Info))
                .chain(info_file),
        )
        .chain(Dispatch::new().level(LevelFilter::Warn).chain(error_file)))
}

fn create_log_file(file_path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .with_context(|| format!("Could not create log file {}", file_path.display()))
}

/// Write a single log line: `[HH:MM:SS LEVEL target] message`
fn write_log<T: Display>(out: FormatCallback, level: T, target: &str, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");

    out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
}

fn write_log_plain(out: FormatCallback, message: &Arguments, record: &Record) {
    write_log(out, record.level(), record.target(), message);
}

fn write_log_colour(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    use_colour: bool,
    colours: &ColoredLevelConfig,
) {
    if use_colour {
        write_log(out, colours.color(record.level()), record.target(), message);
    } else {
        write_log_plain(out, message, record);
    }
}
