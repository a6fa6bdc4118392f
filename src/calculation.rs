//! The material flow cost accounting calculation for a single process.
//!
//! The total cost entering a process (materials, energy and system costs) is split between the
//! positive output (good product), the negative output (defective product) and waste, i.e. the
//! part of the input which is not accounted for by any product output. Whatever remains after
//! this split is reported as the process's balance, which should be zero.
use crate::configuration::ProcessConfiguration;
use crate::error::{MfcaError, MfcaResult};
use crate::item::{
    CalcResult, MaterialInputItem, MaterialSource, OutputRow, ProductOutputItem, RawItem,
};
use crate::units::{Money, Quantity};
use log::{debug, info, warn};

/// The four record streams produced by a calculation
#[derive(PartialEq, Debug, Clone, Default)]
pub struct CalculationOutput {
    /// Good units of each product output
    pub positive_outputs: Vec<OutputRow>,
    /// Defective units of each product output
    pub negative_outputs: Vec<OutputRow>,
    /// One cost summary per process
    pub calc_results: Vec<CalcResult>,
    /// Ledger of every material and product record considered
    pub raw_items: Vec<RawItem>,
}

/// Calculate the cost breakdown for a process.
///
/// # Arguments
///
/// * `config` - The process configuration, if one has been loaded
/// * `dynamic_inputs` - Material inputs supplied at calculation time. These are consumed in a
///   single pass.
///
/// # Returns
///
/// All four output streams, or an error if the process is not configured or one of the dynamic
/// inputs is invalid. Nothing is returned on error.
pub fn calculate<I>(
    config: Option<&ProcessConfiguration>,
    dynamic_inputs: I,
) -> MfcaResult<CalculationOutput>
where
    I: IntoIterator<Item = MaterialInputItem>,
{
    let config = config.ok_or(MfcaError::NotConfigured)?;
    let dynamic_inputs = collect_dynamic_inputs(dynamic_inputs)?;
    info!(
        "Calculating costs for process {} ({} static and {} dynamic material inputs)",
        config.process(),
        config.material_inputs().len(),
        dynamic_inputs.len()
    );

    let calc_result = summarise(config, merge_material_inputs(config, &dynamic_inputs));
    if !calc_result.is_balanced() {
        warn!(
            "Costs for process {} do not balance (balance: {})",
            calc_result.process, calc_result.balance
        );
    }

    Ok(CalculationOutput {
        positive_outputs: positive_outputs(config),
        negative_outputs: negative_outputs(config),
        calc_results: vec![calc_result],
        raw_items: raw_items(config, &dynamic_inputs),
    })
}

/// Read the dynamic inputs, stopping at the first invalid one
fn collect_dynamic_inputs<I>(dynamic_inputs: I) -> MfcaResult<Vec<MaterialInputItem>>
where
    I: IntoIterator<Item = MaterialInputItem>,
{
    let mut items = Vec::new();
    for (row, item) in dynamic_inputs.into_iter().enumerate() {
        if item.source != MaterialSource::Dynamic {
            return Err(MfcaError::InvalidInputItem {
                row,
                reason: format!("Material input {} is not a dynamic input", item.part_no),
            });
        }
        item.validate()
            .map_err(|err| MfcaError::InvalidInputItem {
                row,
                reason: err.to_string(),
            })?;
        items.push(item);
    }

    Ok(items)
}

/// Iterate over the static material inputs followed by the dynamic ones.
///
/// Inputs sharing a part number are kept separate, as they may come from different batches.
fn merge_material_inputs<'a>(
    config: &'a ProcessConfiguration,
    dynamic_inputs: &'a [MaterialInputItem],
) -> impl Iterator<Item = &'a MaterialInputItem> {
    config.material_inputs().iter().chain(dynamic_inputs)
}

/// Calculate the cost summary for the process
fn summarise<'a, I>(config: &ProcessConfiguration, material_inputs: I) -> CalcResult
where
    I: Iterator<Item = &'a MaterialInputItem>,
{
    let mut material_input = Quantity(0.0);
    let mut material_cost = Money(0.0);
    for item in material_inputs {
        material_input += item.act_usage;
        material_cost += item.cost();
    }

    let outputs = config.product_outputs();
    let positive_product: Quantity = outputs.iter().map(|output| output.quantity_pass).sum();
    let positive_output_cost: Money = outputs.iter().map(ProductOutputItem::pass_cost).sum();
    let negative_loss: Quantity = outputs.iter().map(|output| output.quantity_ng).sum();
    let negative_loss_cost: Money = outputs.iter().map(ProductOutputItem::ng_cost).sum();

    let input_cost = material_cost + config.energy_cost() + config.system_cost();
    let output_cost = positive_output_cost + negative_loss_cost;
    let waste_quantity = (material_input - positive_product - negative_loss).floor_zero();
    let waste_cost = (input_cost - output_cost).floor_zero();
    let balance = input_cost - output_cost - waste_cost;
    debug!(
        "Process {}: input cost {input_cost}, output cost {output_cost}, waste cost {waste_cost}",
        config.process()
    );

    CalcResult {
        process: config.process().into(),
        material_input,
        material_cost,
        energy_cost: config.energy_cost(),
        system_cost: config.system_cost(),
        waste_quantity,
        waste_cost,
        positive_product,
        positive_output_cost,
        negative_loss,
        negative_loss_cost,
        balance,
    }
}

/// One row per product output for the good units
fn positive_outputs(config: &ProcessConfiguration) -> Vec<OutputRow> {
    config
        .product_outputs()
        .iter()
        .map(|output| OutputRow::new(output, output.quantity_pass))
        .collect()
}

/// One row per product output for the defective units
fn negative_outputs(config: &ProcessConfiguration) -> Vec<OutputRow> {
    config
        .product_outputs()
        .iter()
        .map(|output| OutputRow::new(output, output.quantity_ng))
        .collect()
}

/// The raw ledger: dynamic inputs, then static inputs, then the pass/NG split of every output
fn raw_items(config: &ProcessConfiguration, dynamic_inputs: &[MaterialInputItem]) -> Vec<RawItem> {
    let process = config.process();
    let materials = dynamic_inputs
        .iter()
        .chain(config.material_inputs())
        .map(|item| RawItem::from_material(process, item));
    let products = config.product_outputs().iter().flat_map(|output| {
        [
            RawItem::from_pass(process, output),
            RawItem::from_ng(process, output),
        ]
    });

    materials.chain(products).collect()
}
