//! Conversion of a [`ProcessConfiguration`] to and from a persisted byte blob.
//!
//! The blob is a UTF-8 TOML document with a `schema_version` key, for example:
//!
//! ```toml
//! schema_version = 1
//! process = "Cutting"
//! energy_cost = 2.0
//! system_cost = 1.0
//!
//! [[material_inputs]]
//! part_no = "S-100"
//! part_name = "Steel sheet"
//! unit = "kg"
//! unit_price = 10.0
//! std_usage = 1.0
//! yield = 1.0
//! act_usage = 5.0
//!
//! [[product_outputs]]
//! part_no = "F-200"
//! part_name = "Bracket"
//! unit = "pcs"
//! unit_price = 6.0
//! quantity_pass = 8.0
//! quantity_ng = 0.0
//! ```
//!
//! Keys which are not used by the calculation (e.g. a `[dialog]` table holding UI state) are
//! ignored when decoding, so `encode(decode(blob))` need not reproduce the original blob.
use crate::configuration::ProcessConfiguration;
use crate::error::{MfcaError, MfcaResult};
use crate::item::{MaterialInputItem, ProductOutputItem};
use crate::units::Money;
use log::warn;
use serde::{Deserialize, Serialize};

/// The version of the blob format written by [`encode`]
pub const SCHEMA_VERSION: u32 = 1;

/// The on-disk representation of a configuration
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct ConfigurationBlob {
    schema_version: u32,
    process: String,
    energy_cost: Money,
    system_cost: Money,
    #[serde(default)]
    material_inputs: Vec<MaterialInputItem>,
    #[serde(default)]
    product_outputs: Vec<ProductOutputItem>,
}

impl From<&ProcessConfiguration> for ConfigurationBlob {
    fn from(config: &ProcessConfiguration) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            process: config.process.clone(),
            energy_cost: config.energy_cost,
            system_cost: config.system_cost,
            material_inputs: config.material_inputs.clone(),
            product_outputs: config.product_outputs.clone(),
        }
    }
}

/// Read a process configuration from a blob.
///
/// Fails with [`MfcaError::MalformedConfiguration`] if the blob is empty, cannot be parsed or
/// describes an invalid configuration.
pub fn decode(bytes: &[u8]) -> MfcaResult<ProcessConfiguration> {
    let malformed = MfcaError::MalformedConfiguration;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(malformed("Configuration is empty".into()));
    }

    let text = std::str::from_utf8(bytes)
        .map_err(|err| malformed(format!("Configuration is not valid UTF-8: {err}")))?;
    let blob: ConfigurationBlob = toml::from_str(text).map_err(|err| malformed(err.to_string()))?;

    if blob.schema_version != SCHEMA_VERSION {
        return Err(malformed(format!(
            "Unsupported schema version {} (expected {SCHEMA_VERSION})",
            blob.schema_version
        )));
    }

    let config = ProcessConfiguration {
        process: blob.process,
        energy_cost: blob.energy_cost,
        system_cost: blob.system_cost,
        material_inputs: blob.material_inputs,
        product_outputs: blob.product_outputs,
    };
    config.validate().map_err(|err| malformed(format!("{err:#}")))?;

    Ok(config)
}

/// Write a process configuration to a blob
pub fn encode(config: &ProcessConfiguration) -> MfcaResult<Vec<u8>> {
    let blob = ConfigurationBlob::from(config);
    let text = toml::to_string(&blob)
        .map_err(|err| MfcaError::MalformedConfiguration(err.to_string()))?;

    Ok(text.into_bytes())
}

/// Try to load a configuration from a stored blob, if there is one.
///
/// A missing or unusable blob means the process has not been configured yet, so this returns
/// `None` rather than an error.
pub fn try_load(bytes: Option<&[u8]>) -> Option<ProcessConfiguration> {
    let bytes = bytes?;
    match decode(bytes) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!("Process is not configured: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::configuration;
    use crate::item::MaterialSource;
    use crate::units::{Dimensionless, MoneyPerQuantity, Quantity};
    use rstest::rstest;

    const VALID_BLOB: &str = r#"
schema_version = 1
process = "Cutting"
energy_cost = 2.0
system_cost = 1.0

[[material_inputs]]
part_no = "S-100"
part_name = "Steel sheet"
unit = "kg"
unit_price = 10.0
std_usage = 1.0
yield = 1.0
act_usage = 5.0

[[product_outputs]]
part_no = "F-200"
part_name = "Bracket"
unit = "pcs"
unit_price = 6.0
quantity_pass = 8.0
quantity_ng = 2.0

[dialog]
column_widths = [120, 80]
"#;

    fn assert_malformed(result: MfcaResult<ProcessConfiguration>) {
        assert!(matches!(
            result,
            Err(MfcaError::MalformedConfiguration(_))
        ));
    }

    #[rstest]
    fn test_decode(configuration: ProcessConfiguration) {
        let config = decode(VALID_BLOB.as_bytes()).unwrap();
        assert_eq!(config, configuration);
        assert_eq!(config.material_inputs[0].source, MaterialSource::Static);
    }

    #[rstest]
    fn test_round_trip(configuration: ProcessConfiguration) {
        let bytes = encode(&configuration).unwrap();
        assert_eq!(decode(&bytes).unwrap(), configuration);
    }

    #[test]
    fn test_round_trip_awkward_floats() {
        let mut material = MaterialInputItem::dynamic(
            "X-1",
            "Résine époxy",
            "kg",
            MoneyPerQuantity(0.1 + 0.2),
            Quantity(1.0 / 3.0),
        );
        material.source = MaterialSource::Static;
        material.std_usage = Quantity(1e-12);
        material.yield_rate = Dimensionless(0.987_654_321);
        let config = ProcessConfiguration::new(
            "Mixing \"A\"",
            Money(1e15),
            Money(0.0),
            vec![material],
            vec![ProductOutputItem {
                part_no: "Y-1".into(),
                part_name: String::new(),
                unit: "L".into(),
                unit_price: MoneyPerQuantity(123.456),
                quantity_pass: Quantity(7.0),
                quantity_ng: Quantity(0.0),
            }],
        )
        .unwrap();

        let bytes = encode(&config).unwrap();
        assert_eq!(decode(&bytes).unwrap(), config);
    }

    #[test]
    fn test_decode_without_material_inputs() {
        let blob = r#"
schema_version = 1
process = "Assembly"
energy_cost = 0.0
system_cost = 0.0

[[product_outputs]]
part_no = "A-1"
part_name = "Assembly"
unit = "pcs"
unit_price = 1.0
quantity_pass = 1.0
quantity_ng = 0.0
"#;
        let config = decode(blob.as_bytes()).unwrap();
        assert!(config.material_inputs().is_empty());
    }

    #[rstest]
    #[case(b"")]
    #[case(b"  \n ")]
    #[case(b"\xff\xfe")]
    #[case(b"schema_version = 1\nprocess = ")]
    fn test_decode_unreadable(#[case] bytes: &[u8]) {
        assert_malformed(decode(bytes));
    }

    #[test]
    fn test_decode_wrong_version() {
        let blob = VALID_BLOB.replace("schema_version = 1", "schema_version = 2");
        assert_malformed(decode(blob.as_bytes()));
    }

    #[test]
    fn test_decode_missing_process_name() {
        let blob = VALID_BLOB.replace("process = \"Cutting\"", "process = \"\"");
        assert_malformed(decode(blob.as_bytes()));
    }

    #[test]
    fn test_decode_negative_cost() {
        let blob = VALID_BLOB.replace("energy_cost = 2.0", "energy_cost = -2.0");
        assert_malformed(decode(blob.as_bytes()));
    }

    #[test]
    fn test_decode_no_outputs() {
        let end = VALID_BLOB.find("[[product_outputs]]").unwrap();
        assert_malformed(decode(VALID_BLOB[..end].as_bytes()));
    }

    #[rstest]
    fn test_try_load(configuration: ProcessConfiguration) {
        assert_eq!(try_load(None), None);
        assert_eq!(try_load(Some("".as_bytes())), None);
        assert_eq!(try_load(Some(VALID_BLOB.as_bytes())), Some(configuration));
    }
}
