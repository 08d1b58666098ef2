//! This module defines the unit types used for costs, capacities and stored energy.
//!
//! Time series columns are kept as plain `f64` slices (MW) so they can be reduced cheaply; the
//! scalar quantities which flow between the profile engine and the cost model are wrapped in the
//! types below so that e.g. a capital cost per kW cannot be passed where a cost per MWh is expected.
use serde::{Deserialize, Serialize};

macro_rules! unit_struct {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
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
            derive_more::Display,
        )]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            /// Create a new instance of the unit type from an `f64` value.
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// The underlying `f64` value.
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is neither infinite nor NaN.
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
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
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

unit_struct!(
    /// A dimensionless quantity, e.g. a discount rate or capacity factor.
    Dimensionless
);

impl Dimensionless {
    /// Raise to an integer power
    pub fn powi(self, rhs: i32) -> Self {
        Dimensionless(self.0.powi(rhs))
    }
}

unit_struct!(
    /// An amount of money (in whatever currency the cost assumptions are given in)
    Money
);
unit_struct!(
    /// Installed generating capacity, in MW
    Capacity
);
unit_struct!(
    /// Stored energy, in GWh
    Energy
);
unit_struct!(
    /// Capital cost per unit of installed capacity (currency/kW)
    MoneyPerCapacity
);
unit_struct!(
    /// Recurring annual cost per unit of installed capacity (currency/kW/yr)
    MoneyPerCapacityPerYear
);
unit_struct!(
    /// Levelised cost of energy (currency/MWh)
    MoneyPerEnergy
);
unit_struct!(
    /// Cost of battery storage (currency/kWh)
    MoneyPerStorage
);

/// A rate applied once per year, e.g. a capital recovery factor
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PerYear(pub f64);

impl PerYear {
    /// Create a new [`PerYear`]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }
}

// Annualising a capital cost
impl_mul!(MoneyPerCapacity, PerYear, MoneyPerCapacityPerYear);

impl From<Dimensionless> for PerYear {
    fn from(value: Dimensionless) -> Self {
        Self(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_annual_capital_charge() {
        let cost = MoneyPerCapacity(1000.0) * PerYear(0.1);
        assert_approx_eq!(MoneyPerCapacityPerYear, cost, MoneyPerCapacityPerYear(100.0));
    }

    #[test]
    fn test_scale_by_dimensionless() {
        assert_eq!(Capacity(10.0) * Dimensionless(0.5), Capacity(5.0));
        assert_eq!(Money(10.0) / Dimensionless(4.0), Money(2.5));
    }

    #[test]
    fn test_deserialise_transparent() {
        #[derive(Deserialize)]
        struct Wrapper {
            cost: MoneyPerStorage,
        }

        let wrapper: Wrapper = toml::from_str("cost = 200.0").unwrap();
        assert_eq!(wrapper.cost, MoneyPerStorage(200.0));
    }
}
