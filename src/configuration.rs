//! The static description of a single process step.
use crate::item::{MaterialInputItem, MaterialSource, ProductOutputItem};
use crate::units::Money;
use anyhow::{Context, Result, ensure};

/// A process, as authored by the user.
///
/// A configuration is only ever created by decoding a blob (see [`crate::codec`]) and is not
/// modified afterwards; loading a new blob produces a new configuration.
#[derive(PartialEq, Debug, Clone)]
pub struct ProcessConfiguration {
    /// The name of the process (e.g. "Cutting")
    pub(crate) process: String,
    /// Energy cost for the process
    pub(crate) energy_cost: Money,
    /// System (overhead) cost for the process
    pub(crate) system_cost: Money,
    /// Static material inputs, in the order in which they were configured
    pub(crate) material_inputs: Vec<MaterialInputItem>,
    /// Product outputs, in the order in which they were configured
    pub(crate) product_outputs: Vec<ProductOutputItem>,
}

impl ProcessConfiguration {
    /// Create a new configuration, checking that it is valid
    pub fn new(
        process: &str,
        energy_cost: Money,
        system_cost: Money,
        material_inputs: Vec<MaterialInputItem>,
        product_outputs: Vec<ProductOutputItem>,
    ) -> Result<Self> {
        let config = Self {
            process: process.into(),
            energy_cost,
            system_cost,
            material_inputs,
            product_outputs,
        };
        config.validate()?;

        Ok(config)
    }

    /// The name of the process
    pub fn process(&self) -> &str {
        &self.process
    }

    /// Energy cost for the process
    pub fn energy_cost(&self) -> Money {
        self.energy_cost
    }

    /// System (overhead) cost for the process
    pub fn system_cost(&self) -> Money {
        self.system_cost
    }

    /// Static material inputs
    pub fn material_inputs(&self) -> &[MaterialInputItem] {
        &self.material_inputs
    }

    /// Product outputs
    pub fn product_outputs(&self) -> &[ProductOutputItem] {
        &self.product_outputs
    }

    /// Check the structural constraints on a configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.process.trim().is_empty(),
            "Process name cannot be empty"
        );
        ensure!(
            self.energy_cost.is_non_negative(),
            "Invalid energy cost ({}). Must be >=0.",
            self.energy_cost
        );
        ensure!(
            self.system_cost.is_non_negative(),
            "Invalid system cost ({}). Must be >=0.",
            self.system_cost
        );
        ensure!(
            !self.product_outputs.is_empty(),
            "Process {} must have at least one product output",
            self.process
        );

        for (idx, item) in self.material_inputs.iter().enumerate() {
            ensure!(
                item.source == MaterialSource::Static,
                "Configured material input {} ({}) must be static",
                idx,
                item.part_no
            );
            item.validate()
                .with_context(|| format!("Invalid material input {} ({})", idx, item.part_no))?;
        }

        for (idx, item) in self.product_outputs.iter().enumerate() {
            item.validate()
                .with_context(|| format!("Invalid product output {idx}"))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, configuration, material_input, product_output};
    use crate::units::MoneyPerQuantity;
    use rstest::rstest;

    #[rstest]
    fn test_validate_ok(configuration: ProcessConfiguration) {
        assert!(configuration.validate().is_ok());
    }

    #[rstest]
    fn test_new(material_input: MaterialInputItem, product_output: ProductOutputItem) {
        let config = ProcessConfiguration::new(
            "Cutting",
            Money(2.0),
            Money(1.0),
            vec![material_input.clone()],
            vec![product_output.clone()],
        )
        .unwrap();
        assert_eq!(config.process(), "Cutting");
        assert_eq!(config.energy_cost(), Money(2.0));
        assert_eq!(config.system_cost(), Money(1.0));
        assert_eq!(config.material_inputs(), [material_input]);
        assert_eq!(config.product_outputs(), [product_output]);
    }

    #[rstest]
    fn test_validate_empty_name(mut configuration: ProcessConfiguration) {
        configuration.process = "  ".into();
        assert_error!(configuration.validate(), "Process name cannot be empty");
    }

    #[rstest]
    fn test_validate_negative_energy_cost(mut configuration: ProcessConfiguration) {
        configuration.energy_cost = Money(-2.0);
        assert_error!(
            configuration.validate(),
            "Invalid energy cost (-2). Must be >=0."
        );
    }

    #[rstest]
    fn test_validate_negative_system_cost(mut configuration: ProcessConfiguration) {
        configuration.system_cost = Money(-0.5);
        assert_error!(
            configuration.validate(),
            "Invalid system cost (-0.5). Must be >=0."
        );
    }

    #[rstest]
    fn test_validate_no_outputs(mut configuration: ProcessConfiguration) {
        configuration.product_outputs.clear();
        assert_error!(
            configuration.validate(),
            "Process Cutting must have at least one product output"
        );
    }

    #[rstest]
    fn test_validate_no_material_inputs(mut configuration: ProcessConfiguration) {
        configuration.material_inputs.clear();
        assert!(configuration.validate().is_ok());
    }

    #[rstest]
    fn test_validate_dynamic_material(mut configuration: ProcessConfiguration) {
        configuration.material_inputs[0].source = MaterialSource::Dynamic;
        assert_error!(
            configuration.validate(),
            "Configured material input 0 (S-100) must be static"
        );
    }

    #[rstest]
    fn test_validate_bad_material(mut configuration: ProcessConfiguration) {
        configuration.material_inputs[0].unit_price = MoneyPerQuantity(-1.0);
        assert_error!(
            configuration.validate(),
            "Invalid material input 0 (S-100)"
        );
    }
}
