//! Fixtures for tests

use crate::configuration::ProcessConfiguration;
use crate::item::{MaterialInputItem, MaterialSource, ProductOutputItem};
use crate::units::{Dimensionless, Money, MoneyPerQuantity, Quantity};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn material_input() -> MaterialInputItem {
    MaterialInputItem {
        source: MaterialSource::Static,
        part_no: "S-100".into(),
        part_name: "Steel sheet".into(),
        unit: "kg".into(),
        unit_price: MoneyPerQuantity(10.0),
        std_usage: Quantity(1.0),
        yield_rate: Dimensionless(1.0),
        act_usage: Quantity(5.0),
    }
}

#[fixture]
pub fn product_output() -> ProductOutputItem {
    ProductOutputItem {
        part_no: "F-200".into(),
        part_name: "Bracket".into(),
        unit: "pcs".into(),
        unit_price: MoneyPerQuantity(6.0),
        quantity_pass: Quantity(8.0),
        quantity_ng: Quantity(2.0),
    }
}

#[fixture]
pub fn configuration(
    material_input: MaterialInputItem,
    product_output: ProductOutputItem,
) -> ProcessConfiguration {
    ProcessConfiguration {
        process: "Cutting".into(),
        energy_cost: Money(2.0),
        system_cost: Money(1.0),
        material_inputs: vec![material_input],
        product_outputs: vec![product_output],
    }
}

#[fixture]
pub fn dynamic_inputs() -> Vec<MaterialInputItem> {
    vec![
        MaterialInputItem::dynamic(
            "C-300",
            "Coating powder",
            "kg",
            MoneyPerQuantity(2.0),
            Quantity(4.0),
        ),
        MaterialInputItem::dynamic("C-301", "Primer", "kg", MoneyPerQuantity(3.0), Quantity(6.0)),
    ]
}
