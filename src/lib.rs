//! Common functionality for MFCA.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod calculation;
pub mod cli;
pub mod codec;
pub mod configuration;
pub mod error;
pub mod input;
pub mod item;
pub mod log;
pub mod output;
pub mod settings;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the directory in which program configuration files are stored.
///
/// Falls back to the current directory if the platform has no config directory.
pub fn get_mfca_config_dir() -> PathBuf {
    let Some(mut dir) = dirs::config_dir() else {
        return PathBuf::from(".");
    };
    dir.push("mfca");

    dir
}
