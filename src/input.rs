//! Common routines for reading a process directory.
//!
//! A process directory contains the configuration blob (`process.toml`) and, optionally, a table
//! of dynamic material inputs (`material_inputs.csv`).
use crate::item::{DynamicMaterialRow, MaterialInputItem};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// The file name for the process configuration blob
pub const CONFIGURATION_FILE_NAME: &str = "process.toml";

/// The file name for dynamic material inputs
pub const DYNAMIC_INPUTS_FILE_NAME: &str = "material_inputs.csv";

/// Format an error message to include the file path
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Read the configuration blob from a process directory.
///
/// Returns `None` if the directory does not contain a configuration file.
pub fn read_configuration_blob(process_dir: &Path) -> Result<Option<Vec<u8>>> {
    let file_path = process_dir.join(CONFIGURATION_FILE_NAME);
    if !file_path.is_file() {
        return Ok(None);
    }

    let bytes = fs::read(&file_path).with_context(|| input_err_msg(&file_path))?;
    Ok(Some(bytes))
}

/// Read dynamic material inputs from a process directory.
///
/// The file is optional; if it is missing there are no dynamic inputs. Rows are returned in file
/// order.
pub fn read_dynamic_inputs(process_dir: &Path) -> Result<Vec<MaterialInputItem>> {
    let file_path = process_dir.join(DYNAMIC_INPUTS_FILE_NAME);
    if !file_path.is_file() {
        return Ok(Vec::new());
    }

    read_dynamic_inputs_from_path(&file_path).with_context(|| input_err_msg(&file_path))
}

fn read_dynamic_inputs_from_path(file_path: &Path) -> Result<Vec<MaterialInputItem>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)?;

    let mut items = Vec::new();
    for (idx, result) in reader.deserialize::<DynamicMaterialRow>().enumerate() {
        let row = result.with_context(|| format!("Invalid material input at row {idx}"))?;
        items.push(row.into());
    }

    Ok(items)
}
