//! This module defines the unit types used in cost accounting and the arithmetic between them.
//!
//! Quantities of material and product are all stored as [`Quantity`], whatever their physical
//! unit (kg, pcs, L, ...). The unit itself is carried as a string on the record, so process-level
//! totals are only physically meaningful when the records share a unit.
use serde::{Deserialize, Serialize};

/// Represents a dimensionless quantity (e.g. a yield ratio).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Default,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::AddAssign,
    derive_more::Display,
)]
pub struct Dimensionless(pub f64);

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::Display,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the value is finite and not negative
            pub fn is_non_negative(self) -> bool {
                self.0.is_finite() && self.0 >= 0.0
            }

            /// Clamp negative values to zero
            pub fn floor_zero(self) -> Self {
                $name(self.0.max(0.0))
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                $name(iter.map(|x| x.0).sum())
            }
        }

        impl float_cmp::ApproxEq for $name {
            type Margin = float_cmp::F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                float_cmp::ApproxEq::approx_eq(self.0, other.0, margin)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ident) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                $Out(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                $Out(self.0 * lhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Money);
unit_struct!(Quantity);

// Derived quantities
unit_struct!(MoneyPerQuantity);

// Multiplication rules
impl_mul!(MoneyPerQuantity, Quantity, Money);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_price_times_quantity() {
        let cost = MoneyPerQuantity(6.0) * Quantity(8.0);
        assert_eq!(cost, Money(48.0));
        assert_eq!(Quantity(8.0) * MoneyPerQuantity(6.0), Money(48.0));
    }

    #[test]
    fn test_sum_and_floor() {
        let total: Money = [Money(1.5), Money(2.5), Money(-1.0)].into_iter().sum();
        assert_eq!(total, Money(3.0));
        assert_eq!((Money(1.0) - Money(2.0)).floor_zero(), Money(0.0));
        assert_eq!(Quantity(3.0).floor_zero(), Quantity(3.0));
    }

    #[test]
    fn test_is_non_negative() {
        assert!(Money(0.0).is_non_negative());
        assert!(!Money(-0.5).is_non_negative());
        assert!(!Money(f64::NAN).is_non_negative());
        assert!(!Quantity(f64::INFINITY).is_non_negative());
    }
}
