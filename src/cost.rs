//! The cost model: sizes and prices the wind, solar and storage needed to meet demand.
use crate::error::{EngineError, EngineResult, ensure_input, ensure_param};
use crate::finance::{LcoeParams, lcoe};
use crate::profile::DerivedSeries;
use crate::series::{max, mean};
use crate::units::{Capacity, Energy, Money, MoneyPerEnergy, MoneyPerStorage};
use serde::Serialize;

/// kW in a MW
const KW_PER_MW: f64 = 1000.0;

/// kWh in a GWh
const KWH_PER_GWH: f64 = 1e6;

/// Capacity and cost of the generation and storage needed to meet demand
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostResult {
    /// Mean baseline demand (MW)
    pub mean_demand: f64,
    /// Mean demand after applying the demand multiplier (MW)
    pub mean_equivalent_demand: f64,
    /// Mean observed wind generation (MW)
    pub mean_wind: f64,
    /// Mean observed solar generation (MW)
    pub mean_solar: f64,
    /// Mean observed wind and solar generation (MW)
    pub mean_supply: f64,
    /// Wind capacity required to meet its share of demand
    pub wind_capacity: Capacity,
    /// Solar capacity required to meet its share of demand
    pub solar_capacity: Capacity,
    /// Levelised cost of wind, rounded to the nearest whole unit
    pub lcoe_wind: MoneyPerEnergy,
    /// Levelised cost of solar, rounded to the nearest whole unit
    pub lcoe_solar: MoneyPerEnergy,
    /// Capital cost of the wind capacity
    pub wind_capital_cost: Money,
    /// Capital cost of the solar capacity
    pub solar_capital_cost: Money,
    /// The largest amount of energy held in storage at any point
    pub peak_storage: Energy,
    /// Capital cost of enough batteries to hold the peak storage
    pub storage_capital_cost: Money,
}

/// Check that a battery unit cost is finite and non-negative
pub(crate) fn check_battery_unit_cost(battery_unit_cost: MoneyPerStorage) -> EngineResult<()> {
    ensure_param!(
        battery_unit_cost.is_finite() && battery_unit_cost >= MoneyPerStorage(0.0),
        "Battery unit cost must be a finite, non-negative number, got {battery_unit_cost}"
    );

    Ok(())
}

/// Compute generation and storage costs for a derived profile.
///
/// Each technology is given the share of (equivalent) demand that it contributes to the observed
/// generation mix, and is priced at its capital cost per kW. Storage is sized to the peak of the
/// storage balance.
///
/// # Arguments
///
/// * `derived` - Profile produced by [`crate::profile::derive`]
/// * `lcoe_params_wind` - Financial assumptions for wind
/// * `lcoe_params_solar` - Financial assumptions for solar
/// * `battery_unit_cost` - Cost of battery storage per kWh
pub fn compute_costs(
    derived: &DerivedSeries,
    lcoe_params_wind: &LcoeParams,
    lcoe_params_solar: &LcoeParams,
    battery_unit_cost: MoneyPerStorage,
) -> EngineResult<CostResult> {
    check_battery_unit_cost(battery_unit_cost)?;

    let mean_demand = mean(&derived.demand)?;
    let mean_equivalent_demand = mean(&derived.equivalent_demand)?;
    let mean_wind = mean(&derived.wind)?;
    let mean_solar = mean(&derived.solar)?;
    let mean_supply = mean(&derived.supply)?;
    ensure_input!(
        [mean_demand, mean_equivalent_demand, mean_supply]
            .iter()
            .all(|value| value.is_finite()),
        "Mean demand or supply is not finite"
    );
    if mean_supply <= 0.0 {
        return Err(EngineError::ZeroSupply);
    }

    // Shares of the raw generation mix
    let wind_fraction = mean_wind / mean_supply;
    let solar_fraction = mean_solar / mean_supply;

    let wind_capacity = Capacity(mean_equivalent_demand * wind_fraction);
    let solar_capacity = Capacity(mean_equivalent_demand * solar_fraction);

    let lcoe_wind = lcoe(lcoe_params_wind)?;
    let lcoe_solar = lcoe(lcoe_params_solar)?;

    let wind_capital_cost = Money(
        wind_capacity.value() * KW_PER_MW * lcoe_params_wind.capital_cost_per_kw.value(),
    );
    let solar_capital_cost = Money(
        solar_capacity.value() * KW_PER_MW * lcoe_params_solar.capital_cost_per_kw.value(),
    );

    let peak_storage = Energy(max(&derived.storage_balance)?);
    let storage_capital_cost =
        Money(peak_storage.value() * KWH_PER_GWH * battery_unit_cost.value());

    for (name, cost) in [
        ("wind", wind_capital_cost),
        ("solar", solar_capital_cost),
        ("storage", storage_capital_cost),
    ] {
        ensure_param!(
            cost.is_finite(),
            "Capital cost of {name} is not finite: unit cost is too large"
        );
    }

    Ok(CostResult {
        mean_demand,
        mean_equivalent_demand,
        mean_wind,
        mean_solar,
        mean_supply,
        wind_capacity,
        solar_capacity,
        lcoe_wind: MoneyPerEnergy(lcoe_wind.value().round()),
        lcoe_solar: MoneyPerEnergy(lcoe_solar.value().round()),
        wind_capital_cost,
        solar_capital_cost,
        peak_storage,
        storage_capital_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{derived_series, lcoe_params};
    use crate::units::{Dimensionless, MoneyPerCapacity};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_compute_costs(derived_series: DerivedSeries, lcoe_params: LcoeParams) {
        let solar = LcoeParams {
            capital_cost_per_kw: MoneyPerCapacity(1000.0),
            ..lcoe_params.clone()
        };
        let costs =
            compute_costs(&derived_series, &lcoe_params, &solar, MoneyPerStorage(200.0)).unwrap();

        // Mean wind is 35 MW and mean solar 15 MW out of a mean demand of 100 MW
        assert_approx_eq!(f64, costs.mean_demand, 100.0);
        assert_approx_eq!(f64, costs.mean_supply, 50.0);
        assert_approx_eq!(Capacity, costs.wind_capacity, Capacity(70.0), epsilon = 1e-9);
        assert_approx_eq!(Capacity, costs.solar_capacity, Capacity(30.0), epsilon = 1e-9);
        assert_eq!(costs.lcoe_wind, MoneyPerEnergy(50.0));
        assert_eq!(costs.lcoe_solar, MoneyPerEnergy(42.0));
        assert_approx_eq!(Money, costs.wind_capital_cost, Money(87_500_000.0), epsilon = 1e-3);
        assert_approx_eq!(Money, costs.solar_capital_cost, Money(30_000_000.0), epsilon = 1e-3);

        // Peak storage is 1.44 GWh
        assert_approx_eq!(Energy, costs.peak_storage, Energy(1.44), epsilon = 1e-12);
        assert_approx_eq!(
            Money,
            costs.storage_capital_cost,
            Money(288_000_000.0),
            epsilon = 1e-3
        );
    }

    #[rstest]
    fn test_compute_costs_uses_equivalent_demand(
        derived_series: DerivedSeries,
        lcoe_params: LcoeParams,
    ) {
        let mut derived = derived_series;
        derived.equivalent_demand = derived.demand.iter().map(|d| d * 2.0).collect();
        let costs =
            compute_costs(&derived, &lcoe_params, &lcoe_params, MoneyPerStorage(1.0)).unwrap();
        assert_approx_eq!(Capacity, costs.wind_capacity, Capacity(140.0), epsilon = 1e-9);
        assert_approx_eq!(Capacity, costs.solar_capacity, Capacity(60.0), epsilon = 1e-9);
    }

    #[rstest]
    fn test_compute_costs_doubling_battery_cost(
        derived_series: DerivedSeries,
        lcoe_params: LcoeParams,
    ) {
        let cost_of = |unit_cost| {
            compute_costs(
                &derived_series,
                &lcoe_params,
                &lcoe_params,
                MoneyPerStorage(unit_cost),
            )
            .unwrap()
            .storage_capital_cost
        };

        assert_eq!(cost_of(350.0), cost_of(175.0) * Dimensionless(2.0));
    }

    #[rstest]
    fn test_compute_costs_empty_series(mut derived_series: DerivedSeries, lcoe_params: LcoeParams) {
        derived_series.timestamps.clear();
        derived_series.demand.clear();
        derived_series.equivalent_demand.clear();
        derived_series.wind.clear();
        derived_series.solar.clear();
        derived_series.supply.clear();
        derived_series.storage_balance.clear();

        assert_eq!(
            compute_costs(
                &derived_series,
                &lcoe_params,
                &lcoe_params,
                MoneyPerStorage(200.0)
            ),
            Err(EngineError::EmptySeries)
        );
    }

    #[rstest]
    fn test_compute_costs_invalid_lcoe_params(
        derived_series: DerivedSeries,
        lcoe_params: LcoeParams,
    ) {
        let bad = LcoeParams {
            capacity_factor: Dimensionless(0.0),
            ..lcoe_params.clone()
        };
        assert!(matches!(
            compute_costs(&derived_series, &lcoe_params, &bad, MoneyPerStorage(200.0)),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[rstest]
    fn test_compute_costs_overflowing_capital_cost(
        derived_series: DerivedSeries,
        lcoe_params: LcoeParams,
    ) {
        // Finite LCOE but the capital cost of 70 MW overflows
        let wind = LcoeParams {
            capital_cost_per_kw: MoneyPerCapacity(1e304),
            capacity_factor: Dimensionless(1e10),
            ..lcoe_params.clone()
        };
        assert!(lcoe(&wind).unwrap().is_finite());
        assert!(matches!(
            compute_costs(&derived_series, &wind, &lcoe_params, MoneyPerStorage(200.0)),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[rstest]
    fn test_compute_costs_overflowing_storage_cost(
        derived_series: DerivedSeries,
        lcoe_params: LcoeParams,
    ) {
        // 1.44 GWh at 1e303 per kWh
        assert!(matches!(
            compute_costs(
                &derived_series,
                &lcoe_params,
                &lcoe_params,
                MoneyPerStorage(1e303)
            ),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_compute_costs_invalid_battery_cost(
        derived_series: DerivedSeries,
        lcoe_params: LcoeParams,
        #[case] unit_cost: f64,
    ) {
        assert!(matches!(
            compute_costs(
                &derived_series,
                &lcoe_params,
                &lcoe_params,
                MoneyPerStorage(unit_cost)
            ),
            Err(EngineError::InvalidParameter(_))
        ));
    }
}
