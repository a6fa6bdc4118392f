//! Record types passed into and out of the calculation engine.
//!
//! These are plain values: material inputs and product outputs come from the process
//! configuration or from an external table, while the remaining records are produced fresh by
//! every call to [`crate::calculation::calculate`].
use crate::units::{Dimensionless, Money, MoneyPerQuantity, Quantity};
use anyhow::{Result, ensure};
use float_cmp::approx_eq;
use serde::{Deserialize, Serialize};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// Relative tolerance used when checking that a process balances
pub const BALANCE_TOLERANCE: f64 = 1e-6;

/// Where a material input came from
#[derive(
    PartialEq,
    Eq,
    Default,
    Debug,
    Clone,
    Copy,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum MaterialSource {
    /// Authored as part of the process configuration
    #[default]
    #[string = "static"]
    Static,
    /// Supplied at calculation time, e.g. the positive output of an upstream process
    #[string = "dynamic"]
    Dynamic,
}

/// A material consumed by the process
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MaterialInputItem {
    /// Whether the item is part of the configuration or was supplied dynamically
    #[serde(default)]
    pub source: MaterialSource,
    /// Part number (e.g. "S-100")
    pub part_no: String,
    /// Human-readable part name
    pub part_name: String,
    /// The unit in which both `std_usage` and `act_usage` are measured
    pub unit: String,
    /// Price per unit of material
    pub unit_price: MoneyPerQuantity,
    /// Standard quantity consumed per unit of production
    pub std_usage: Quantity,
    /// Fraction of the material which ends up in the product, in (0, 1]
    #[serde(rename = "yield")]
    pub yield_rate: Dimensionless,
    /// Quantity actually consumed, already including any yield loss
    pub act_usage: Quantity,
}

impl MaterialInputItem {
    /// Create a material input supplied at calculation time.
    ///
    /// Standard usage and yield are both 1, so `quantity` is taken directly as the consumed
    /// quantity.
    pub fn dynamic(
        part_no: &str,
        part_name: &str,
        unit: &str,
        unit_price: MoneyPerQuantity,
        quantity: Quantity,
    ) -> Self {
        Self {
            source: MaterialSource::Dynamic,
            part_no: part_no.into(),
            part_name: part_name.into(),
            unit: unit.into(),
            unit_price,
            std_usage: Quantity(1.0),
            yield_rate: Dimensionless(1.0),
            act_usage: quantity,
        }
    }

    /// The cost of the material actually consumed
    pub fn cost(&self) -> Money {
        self.unit_price * self.act_usage
    }

    /// Check the field constraints for a material input
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.unit.trim().is_empty(), "Unit cannot be empty");
        ensure!(
            self.unit_price.is_non_negative(),
            "Invalid unit price ({}). Must be >=0.",
            self.unit_price
        );
        ensure!(
            self.act_usage.is_non_negative(),
            "Invalid actual usage ({}). Must be >=0.",
            self.act_usage
        );
        ensure!(
            self.std_usage.value().is_finite() && self.std_usage > Quantity(0.0),
            "Invalid standard usage ({}). Must be >0.",
            self.std_usage
        );
        ensure!(
            self.yield_rate > Dimensionless(0.0) && self.yield_rate <= Dimensionless(1.0),
            "Invalid yield ({}). Must be in the range (0, 1].",
            self.yield_rate
        );

        Ok(())
    }
}

/// One SKU produced by the process, split into good and defective units
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ProductOutputItem {
    /// Part number of the product
    pub part_no: String,
    /// Human-readable product name
    pub part_name: String,
    /// The unit in which quantities are counted
    pub unit: String,
    /// Value of one unit of product
    pub unit_price: MoneyPerQuantity,
    /// Number of good units
    pub quantity_pass: Quantity,
    /// Number of defective (loss) units
    pub quantity_ng: Quantity,
}

impl ProductOutputItem {
    /// The value of the good units
    pub fn pass_cost(&self) -> Money {
        self.unit_price * self.quantity_pass
    }

    /// The value of the defective units
    pub fn ng_cost(&self) -> Money {
        self.unit_price * self.quantity_ng
    }

    /// Check the field constraints for a product output
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.part_no.trim().is_empty(),
            "Product part number cannot be empty"
        );
        ensure!(
            self.unit_price.is_non_negative(),
            "Invalid unit price ({}) for product {}. Must be >=0.",
            self.unit_price,
            self.part_no
        );
        ensure!(
            self.quantity_pass.is_non_negative(),
            "Invalid pass quantity ({}) for product {}. Must be >=0.",
            self.quantity_pass,
            self.part_no
        );
        ensure!(
            self.quantity_ng.is_non_negative(),
            "Invalid NG quantity ({}) for product {}. Must be >=0.",
            self.quantity_ng,
            self.part_no
        );

        Ok(())
    }
}

/// A row of the dynamic material input table.
///
/// This is the schema of an upstream process's positive output, minus the subtotal, so
/// processes can be chained.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DynamicMaterialRow {
    /// Part number
    pub part_no: String,
    /// Part name
    pub part_name: String,
    /// Unit of measurement
    pub unit: String,
    /// Price per unit
    pub unit_price: MoneyPerQuantity,
    /// Consumed quantity
    pub quantity: Quantity,
}

impl From<DynamicMaterialRow> for MaterialInputItem {
    fn from(row: DynamicMaterialRow) -> Self {
        MaterialInputItem::dynamic(
            &row.part_no,
            &row.part_name,
            &row.unit,
            row.unit_price,
            row.quantity,
        )
    }
}

/// A row in the positive or negative output stream
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputRow {
    /// Part number of the product
    pub part_no: String,
    /// Product name
    pub part_name: String,
    /// Unit of measurement
    pub unit: String,
    /// Value of one unit
    pub unit_price: MoneyPerQuantity,
    /// Good or defective quantity, depending on the stream
    pub quantity: Quantity,
    /// `unit_price × quantity`
    pub subtotal: Money,
}

impl OutputRow {
    /// Create a row for the given product and quantity
    pub fn new(product: &ProductOutputItem, quantity: Quantity) -> Self {
        Self {
            part_no: product.part_no.clone(),
            part_name: product.part_name.clone(),
            unit: product.unit.clone(),
            unit_price: product.unit_price,
            quantity,
            subtotal: product.unit_price * quantity,
        }
    }
}

impl From<&OutputRow> for MaterialInputItem {
    /// Feed the positive output of an upstream process into a downstream one
    fn from(row: &OutputRow) -> Self {
        MaterialInputItem::dynamic(
            &row.part_no,
            &row.part_name,
            &row.unit,
            row.unit_price,
            row.quantity,
        )
    }
}

/// The cost summary for a single process
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CalcResult {
    /// Process name
    pub process: String,
    /// Total quantity of material consumed
    pub material_input: Quantity,
    /// Total cost of material consumed
    pub material_cost: Money,
    /// Energy cost of the process
    pub energy_cost: Money,
    /// System (overhead) cost of the process
    pub system_cost: Money,
    /// Material not accounted for by any product output
    pub waste_quantity: Quantity,
    /// Input cost not accounted for by any product output
    pub waste_cost: Money,
    /// Total number of good units
    #[serde(rename = "positive_output")]
    pub positive_product: Quantity,
    /// Value of the good units
    pub positive_output_cost: Money,
    /// Total number of defective units
    pub negative_loss: Quantity,
    /// Value of the defective units
    pub negative_loss_cost: Money,
    /// Residual of the cost-conservation equation (ideally zero)
    pub balance: Money,
}

impl CalcResult {
    /// Total cost entering the process
    pub fn input_cost(&self) -> Money {
        self.material_cost + self.energy_cost + self.system_cost
    }

    /// Whether the balance is zero, relative to the total input cost
    pub fn is_balanced(&self) -> bool {
        let scale = self.input_cost().value().abs().max(1.0);
        approx_eq!(
            f64,
            self.balance.value() / scale,
            0.0,
            epsilon = BALANCE_TOLERANCE
        )
    }
}

/// The kind of entry in the raw ledger
#[derive(
    PartialEq, Eq, Debug, Clone, Copy, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum RawItemType {
    /// A material row supplied at calculation time
    #[string = "DYNAMIC_MATERIAL_INPUT"]
    DynamicMaterialInput,
    /// A material row from the process configuration
    #[string = "STATIC_MATERIAL_INPUT"]
    StaticMaterialInput,
    /// Good units of a product
    #[string = "PRODUCT_OUTPUT"]
    ProductOutput,
    /// Defective units of a product
    #[string = "NEGATIVE_OUTPUT"]
    NegativeOutput,
}

/// A flattened ledger entry, kept for auditing
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    /// Process name
    pub process: String,
    /// What kind of entry this is
    #[serde(rename = "type")] // NB: we can't name a field type as it's a reserved keyword
    pub kind: RawItemType,
    /// Part number
    pub item_no: String,
    /// Part name
    pub item_name: String,
    /// Unit of measurement
    pub unit: String,
    /// Quantity
    pub quantity: Quantity,
    /// Price per unit
    pub unit_price: MoneyPerQuantity,
    /// `quantity × unit_price`
    pub monetary: Money,
}

impl RawItem {
    /// Create a ledger entry for a material input
    pub fn from_material(process: &str, item: &MaterialInputItem) -> Self {
        let kind = match item.source {
            MaterialSource::Static => RawItemType::StaticMaterialInput,
            MaterialSource::Dynamic => RawItemType::DynamicMaterialInput,
        };

        Self {
            process: process.into(),
            kind,
            item_no: item.part_no.clone(),
            item_name: item.part_name.clone(),
            unit: item.unit.clone(),
            quantity: item.act_usage,
            unit_price: item.unit_price,
            monetary: item.cost(),
        }
    }

    /// Create a ledger entry for the good units of a product
    pub fn from_pass(process: &str, product: &ProductOutputItem) -> Self {
        Self::from_product(process, RawItemType::ProductOutput, product, product.quantity_pass)
    }

    /// Create a ledger entry for the defective units of a product
    pub fn from_ng(process: &str, product: &ProductOutputItem) -> Self {
        Self::from_product(process, RawItemType::NegativeOutput, product, product.quantity_ng)
    }

    fn from_product(
        process: &str,
        kind: RawItemType,
        product: &ProductOutputItem,
        quantity: Quantity,
    ) -> Self {
        Self {
            process: process.into(),
            kind,
            item_no: product.part_no.clone(),
            item_name: product.part_name.clone(),
            unit: product.unit.clone(),
            quantity,
            unit_price: product.unit_price,
            monetary: product.unit_price * quantity,
        }
    }
}
