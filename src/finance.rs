//! General functions related to finance.
use crate::error::{EngineError, EngineResult, ensure_param};
use crate::units::{
    Dimensionless, MoneyPerCapacity, MoneyPerCapacityPerYear, MoneyPerEnergy, PerYear,
};
use log::warn;
use serde::{Deserialize, Serialize};

/// Hours in a (non-leap) year
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// kW in a MW, used to turn a cost per kWh into a cost per MWh
const KW_PER_MW: f64 = 1000.0;

/// Financial assumptions for one generating technology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LcoeParams {
    /// Project life (years)
    pub periods: u32,
    /// Discount rate applied to capital
    pub discount_rate: Dimensionless,
    /// Total capital cost of the plant per kW of installed capacity
    pub capital_cost_per_kw: MoneyPerCapacity,
    /// Fraction of the time the plant produces at full power
    pub capacity_factor: Dimensionless,
    /// Fixed cost of operating and maintaining the plant per kW each year
    pub fixed_om_cost_per_kw_yr: MoneyPerCapacityPerYear,
}

impl LcoeParams {
    /// Check that the parameters give a well-defined LCOE.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `periods` is 0.
    /// - `discount_rate` is not finite or is -1 or less.
    /// - `capacity_factor` is not finite or is not positive.
    /// - either cost is not finite or is negative.
    ///
    /// # Warnings
    ///
    /// Logs a warning if `discount_rate` or `capacity_factor` is greater than 1.
    pub fn validate(&self) -> EngineResult<()> {
        check_periods(self.periods)?;
        check_discount_rate(self.discount_rate)?;
        ensure_param!(
            self.capacity_factor.is_finite() && self.capacity_factor > Dimensionless(0.0),
            "Capacity factor must be a finite number greater than zero, got {}",
            self.capacity_factor
        );
        ensure_param!(
            self.capital_cost_per_kw.is_finite() && self.capital_cost_per_kw >= MoneyPerCapacity(0.0),
            "Capital cost must be a finite, non-negative number, got {}",
            self.capital_cost_per_kw
        );
        ensure_param!(
            self.fixed_om_cost_per_kw_yr.is_finite()
                && self.fixed_om_cost_per_kw_yr >= MoneyPerCapacityPerYear(0.0),
            "Fixed O&M cost must be a finite, non-negative number, got {}",
            self.fixed_om_cost_per_kw_yr
        );

        if self.discount_rate > Dimensionless(1.0) {
            warn!("Discount rate is greater than 1: {}", self.discount_rate);
        }
        if self.capacity_factor > Dimensionless(1.0) {
            warn!("Capacity factor is greater than 1: {}", self.capacity_factor);
        }

        Ok(())
    }
}

fn check_periods(periods: u32) -> EngineResult<()> {
    ensure_param!(periods > 0, "Project life must be greater than 0");

    Ok(())
}

fn check_discount_rate(discount_rate: Dimensionless) -> EngineResult<()> {
    ensure_param!(
        discount_rate.is_finite() && discount_rate > Dimensionless(-1.0),
        "Discount rate must be a finite number greater than -1, got {discount_rate}"
    );

    Ok(())
}

/// Calculates the capital recovery factor (CRF) for a given lifetime and discount rate.
///
/// The CRF is used to annualise capital costs over the lifetime of an asset. A zero discount rate
/// is handled as the limiting case, `1 / periods`.
pub fn capital_recovery_factor(periods: u32, discount_rate: Dimensionless) -> EngineResult<PerYear> {
    check_periods(periods)?;
    check_discount_rate(discount_rate)?;

    if discount_rate == Dimensionless(0.0) {
        return Ok(PerYear::new(1.0 / periods as f64));
    }

    let exponent = i32::try_from(periods).map_err(|_| {
        EngineError::InvalidParameter(format!("Project life is too long: {periods}"))
    })?;
    let factor = (Dimensionless(1.0) + discount_rate).powi(exponent);
    ensure_param!(
        factor.is_finite() && factor != Dimensionless(1.0),
        "Capital recovery factor is undefined for discount rate {discount_rate} over {periods} periods"
    );

    Ok(((discount_rate * factor) / (factor - Dimensionless(1.0))).into())
}

/// Calculates the equivalent annual cost per kW: annualised capital plus fixed O&M
pub fn annual_cost(params: &LcoeParams) -> EngineResult<MoneyPerCapacityPerYear> {
    let crf = capital_recovery_factor(params.periods, params.discount_rate)?;
    Ok(params.capital_cost_per_kw * crf + params.fixed_om_cost_per_kw_yr)
}

/// Calculates the levelised cost of energy (currency/MWh) for the given parameters.
///
/// This is the average price per unit of electricity which would be needed to recover the costs of
/// building and running the plant over its life at the assumed capacity factor.
pub fn lcoe(params: &LcoeParams) -> EngineResult<MoneyPerEnergy> {
    params.validate()?;

    let annual_cost = annual_cost(params)?;

    // kWh generated per kW of capacity each year
    let annual_energy_per_kw = HOURS_PER_YEAR * params.capacity_factor.value();

    let lcoe = MoneyPerEnergy(KW_PER_MW * annual_cost.value() / annual_energy_per_kw);
    ensure_param!(
        lcoe.is_finite(),
        "LCOE is not finite: capital or O&M cost is too large"
    );

    Ok(lcoe)
}
