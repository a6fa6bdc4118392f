//! Common code for running regression tests.
use float_cmp::approx_eq;
use itertools::{EitherOrBoth, Itertools};
use mfca::cli::RunOpts;
use mfca::cli::example::handle_example_run_command;
use mfca::settings::Settings;
use std::fs::{self, read_dir};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const FLOAT_CMP_TOLERANCE: f64 = 1e-10;

/// Run a regression test for an example process
pub fn run_regression_test(example_name: &str) {
    unsafe { std::env::set_var("MFCA_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(tempdir.path().to_path_buf()),
        overwrite: false,
    };
    handle_example_run_command(example_name, &opts, Some(Settings::default())).unwrap();

    let test_data_dir = PathBuf::from(format!("tests/data/{example_name}"));
    compare_output_dirs(tempdir.path(), &test_data_dir);
}

fn compare_output_dirs(actual_dir: &Path, expected_dir: &Path) {
    let file_names = get_csv_file_names(actual_dir);

    // Check that output files haven't been added/removed
    assert_eq!(file_names, get_csv_file_names(expected_dir));

    let errors = file_names
        .iter()
        .flat_map(|file_name| compare_files(actual_dir, expected_dir, file_name))
        .collect_vec();
    assert!(
        errors.is_empty(),
        "The following errors occurred:\n  * {}",
        errors.join("\n  * ")
    );
}

/// Compare the lines of two CSV files, returning a description of each difference
fn compare_files(actual_dir: &Path, expected_dir: &Path, file_name: &str) -> Vec<String> {
    let actual = fs::read_to_string(actual_dir.join(file_name)).unwrap();
    let expected = fs::read_to_string(expected_dir.join(file_name)).unwrap();

    actual
        .lines()
        .zip_longest(expected.lines())
        .enumerate()
        .filter_map(|(num, pair)| match pair {
            EitherOrBoth::Both(line1, line2) => (!lines_match(line1, line2))
                .then(|| format!("{file_name}: line {num}:\n    + \"{line1}\"\n    - \"{line2}\"")),
            EitherOrBoth::Left(line) => Some(format!("{file_name}: extra line {num}: \"{line}\"")),
            EitherOrBoth::Right(line) => {
                Some(format!("{file_name}: missing line {num}: \"{line}\""))
            }
        })
        .collect()
}

/// Whether every field matches, comparing numeric fields with a tolerance
fn lines_match(line1: &str, line2: &str) -> bool {
    let fields1 = line1.split(',').collect_vec();
    let fields2 = line2.split(',').collect_vec();

    fields1.len() == fields2.len()
        && fields1
            .into_iter()
            .zip(fields2)
            .all(|(f1, f2)| try_compare_floats(f1, f2).unwrap_or_else(|| f1 == f2))
}

/// Parse a string into an `f64`, returning `None` if parsing fails or value is infinite/NaN
fn parse_finite(s: &str) -> Option<f64> {
    s.parse().ok().filter(|f: &f64| f.is_finite())
}

fn try_compare_floats(s1: &str, s2: &str) -> Option<bool> {
    let float1 = parse_finite(s1)?;
    let float2 = parse_finite(s2)?;

    Some(approx_eq!(
        f64,
        float1,
        float2,
        epsilon = FLOAT_CMP_TOLERANCE
    ))
}

/// Get the names of CSV files in the given folder
fn get_csv_file_names(dir_path: &Path) -> Vec<String> {
    read_dir(dir_path)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .filter(|file_name| file_name.ends_with(".csv"))
        .sorted()
        .collect()
}
