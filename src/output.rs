//! The module responsible for writing output data to disk.
use crate::calculation::CalculationOutput;
use crate::item::{CalcResult, OutputRow, RawItem};
use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which process-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "mfca_results";

/// The output file name for the positive (good) product output
const POSITIVE_OUTPUTS_FILE_NAME: &str = "positive_outputs.csv";

/// The output file name for the negative (loss) product output
const NEGATIVE_OUTPUTS_FILE_NAME: &str = "negative_outputs.csv";

/// The output file name for the calculation summary
const CALCULATIONS_FILE_NAME: &str = "calculations.csv";

/// The output file name for the raw ledger
const RAW_ITEMS_FILE_NAME: &str = "raw_items.csv";

/// Get the output folder for the process in the specified directory
pub fn get_output_dir(process_dir: &Path) -> Result<PathBuf> {
    // Get the process name from the dir path. This ends up being convoluted because we need to
    // check for all possible errors.
    let process_dir = process_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to process")?;

    let process_name = process_dir
        .file_name()
        .context("Process cannot be in root folder")?
        .to_str()
        .context("Invalid chars in process dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, process_name].iter().collect())
}

/// Create a new output directory, returning whether an existing one will be overwritten.
///
/// Fails if the directory already exists and contains files, unless `allow_overwrite` is set, in
/// which case the old contents are removed.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Directory exists and is empty
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// An object for writing the calculation output streams to CSV files
pub struct DataWriter {
    positive_outputs_writer: csv::Writer<File>,
    negative_outputs_writer: csv::Writer<File>,
    calculations_writer: csv::Writer<File>,
    raw_items_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            positive_outputs_writer: new_writer(POSITIVE_OUTPUTS_FILE_NAME)?,
            negative_outputs_writer: new_writer(NEGATIVE_OUTPUTS_FILE_NAME)?,
            calculations_writer: new_writer(CALCULATIONS_FILE_NAME)?,
            raw_items_writer: new_writer(RAW_ITEMS_FILE_NAME)?,
        })
    }

    /// Write all four output streams
    pub fn write_output(&mut self, output: &CalculationOutput) -> Result<()> {
        self.write_positive_outputs(&output.positive_outputs)?;
        self.write_negative_outputs(&output.negative_outputs)?;
        self.write_calc_results(&output.calc_results)?;
        self.write_raw_items(&output.raw_items)?;

        Ok(())
    }

    /// Write the good units of each product output
    pub fn write_positive_outputs(&mut self, rows: &[OutputRow]) -> Result<()> {
        write_rows(&mut self.positive_outputs_writer, rows)
    }

    /// Write the defective units of each product output
    pub fn write_negative_outputs(&mut self, rows: &[OutputRow]) -> Result<()> {
        write_rows(&mut self.negative_outputs_writer, rows)
    }

    /// Write the process cost summaries
    pub fn write_calc_results(&mut self, rows: &[CalcResult]) -> Result<()> {
        write_rows(&mut self.calculations_writer, rows)
    }

    /// Write the raw ledger
    pub fn write_raw_items(&mut self, rows: &[RawItem]) -> Result<()> {
        write_rows(&mut self.raw_items_writer, rows)
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.positive_outputs_writer.flush()?;
        self.negative_outputs_writer.flush()?;
        self.calculations_writer.flush()?;
        self.raw_items_writer.flush()?;

        Ok(())
    }
}

/// Serialise rows to a CSV writer in order
fn write_rows<T: Serialize>(writer: &mut csv::Writer<File>, rows: &[T]) -> Result<()> {
    for row in rows {
        writer.serialize(row)?;
    }

    Ok(())
}
