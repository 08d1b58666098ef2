//! The profile engine: scales wind and solar output to match demand and works out how much storage
//! is needed to cover the shortfalls.
use crate::error::{EngineError, EngineResult, ensure_input, ensure_param};
use crate::series::{RawSeries, cumulative_sum, mean, min};
use chrono::NaiveDateTime;
use log::{debug, warn};

/// The largest difference (MW) tolerated between mean scaled supply and mean demand
const SCALING_TOLERANCE: f64 = 1.0;

/// MWh in a GWh
const MWH_PER_GWH: f64 = 1000.0;

/// A raw series annotated with demand-matched supply and the resulting storage balance.
///
/// All power columns are in MW and have one value per period. `storage_balance` is in GWh and its
/// smallest value is always exactly zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    /// The start of each period
    pub timestamps: Vec<NaiveDateTime>,
    /// The length of each period in hours
    pub hours_per_period: f64,
    /// Baseline demand
    pub demand: Vec<f64>,
    /// Demand after applying the demand multiplier
    pub equivalent_demand: Vec<f64>,
    /// Observed wind generation
    pub wind: Vec<f64>,
    /// Observed solar generation
    pub solar: Vec<f64>,
    /// Combined wind and solar generation
    pub supply: Vec<f64>,
    /// The factor by which supply is multiplied so that it meets demand on average
    pub scale_factor: f64,
    /// Supply multiplied by the scale factor
    pub scaled_supply: Vec<f64>,
    /// Scaled supply minus equivalent demand
    pub delta: Vec<f64>,
    /// The positive part of `delta`
    pub surplus: Vec<f64>,
    /// The negative part of `delta`
    pub deficit: Vec<f64>,
    /// Level of a battery which never runs empty (GWh)
    pub storage_balance: Vec<f64>,
}

impl DerivedSeries {
    /// The number of periods
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether there are no periods
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Derive a demand-matched supply profile and storage balance from raw demand and generation.
///
/// Combined wind and solar output is scaled by a single factor so that its mean equals the mean of
/// the (possibly inflated) demand. The surplus or deficit in each period is then accumulated into a
/// running storage balance; discharging to cover a deficit costs the store an extra
/// `battery_round_trip_loss` of the energy delivered. The balance is shifted so that its minimum is
/// zero, which makes its maximum the smallest battery that covers every deficit when started full.
///
/// # Arguments
///
/// * `raw` - Demand, wind and solar power on a common index
/// * `demand_multiplier` - Factor applied to demand to account for additional electrified load
/// * `battery_round_trip_loss` - Fraction of energy lost over a charge/discharge cycle, in [0, 1)
pub fn derive(
    raw: &RawSeries,
    demand_multiplier: f64,
    battery_round_trip_loss: f64,
) -> EngineResult<DerivedSeries> {
    check_demand_multiplier(demand_multiplier)?;
    check_round_trip_loss(battery_round_trip_loss)?;
    if demand_multiplier < 1.0 {
        warn!("Demand multiplier is less than 1: demand will be reduced");
    }

    let equivalent_demand = raw
        .demand()
        .iter()
        .map(|demand| demand * demand_multiplier)
        .collect::<Vec<_>>();
    let supply = raw
        .wind()
        .iter()
        .zip(raw.solar())
        .map(|(wind, solar)| wind + solar)
        .collect::<Vec<_>>();
    check_finite("equivalent demand", &equivalent_demand)?;
    check_finite("supply", &supply)?;

    let scale_factor = scale_factor(&equivalent_demand, &supply)?;
    debug!("Scaling wind and solar generation by a factor of {scale_factor:.3}");

    let scaled_supply = supply.iter().map(|s| s * scale_factor).collect::<Vec<_>>();
    check_finite("scaled supply", &scaled_supply)?;
    check_scaled_supply(&scaled_supply, &equivalent_demand)?;

    let delta = scaled_supply
        .iter()
        .zip(&equivalent_demand)
        .map(|(supply, demand)| supply - demand)
        .collect::<Vec<_>>();
    let surplus = delta.iter().map(|d| d.max(0.0)).collect::<Vec<_>>();
    let deficit = delta.iter().map(|d| d.min(0.0)).collect::<Vec<_>>();

    let storage_balance = storage_balance(
        &surplus,
        &deficit,
        raw.hours_per_period(),
        battery_round_trip_loss,
    )?;
    check_finite("storage balance", &storage_balance)?;

    Ok(DerivedSeries {
        timestamps: raw.timestamps().to_vec(),
        hours_per_period: raw.hours_per_period(),
        demand: raw.demand().to_vec(),
        equivalent_demand,
        wind: raw.wind().to_vec(),
        solar: raw.solar().to_vec(),
        supply,
        scale_factor,
        scaled_supply,
        delta,
        surplus,
        deficit,
        storage_balance,
    })
}

/// Check that a demand multiplier is finite and non-negative
pub(crate) fn check_demand_multiplier(demand_multiplier: f64) -> EngineResult<()> {
    ensure_param!(
        demand_multiplier.is_finite() && demand_multiplier >= 0.0,
        "Demand multiplier must be a finite, non-negative number, got {demand_multiplier}"
    );

    Ok(())
}

/// Check that a battery round-trip loss is in [0, 1)
pub(crate) fn check_round_trip_loss(loss: f64) -> EngineResult<()> {
    ensure_param!(
        (0.0..1.0).contains(&loss),
        "Battery round-trip loss must be at least 0 and less than 1, got {loss}"
    );

    Ok(())
}

/// The factor which brings mean supply up (or down) to mean demand
fn scale_factor(equivalent_demand: &[f64], supply: &[f64]) -> EngineResult<f64> {
    let mean_supply = mean(supply)?;
    ensure_input!(
        mean_supply.is_finite(),
        "Mean supply is too large to scale: {mean_supply} MW"
    );
    if mean_supply <= 0.0 {
        return Err(EngineError::ZeroSupply);
    }

    let factor = mean(equivalent_demand)? / mean_supply;
    if !factor.is_finite() {
        return Err(EngineError::InvalidInput(format!(
            "Scale factor is not finite (mean supply: {mean_supply} MW)"
        )));
    }

    Ok(factor)
}

/// Check that scaled supply meets demand on average
fn check_scaled_supply(scaled_supply: &[f64], equivalent_demand: &[f64]) -> EngineResult<()> {
    let mean_supply = mean(scaled_supply)?;
    let mean_demand = mean(equivalent_demand)?;

    // NB: a NaN difference is a mismatch
    let matches = (mean_supply - mean_demand).abs() < SCALING_TOLERANCE;
    ensure_input!(
        matches,
        "Mean scaled supply ({mean_supply} MW) does not match mean demand ({mean_demand} MW)"
    );

    Ok(())
}

/// Check that every value in a derived column is finite
fn check_finite(name: &str, values: &[f64]) -> EngineResult<()> {
    ensure_input!(
        values.iter().all(|value| value.is_finite()),
        "Input values are too large: {name} is not finite"
    );

    Ok(())
}

/// Accumulate surpluses and deficits into a storage level (GWh) whose minimum is zero
fn storage_balance(
    surplus: &[f64],
    deficit: &[f64],
    hours_per_period: f64,
    round_trip_loss: f64,
) -> EngineResult<Vec<f64>> {
    let net_energy = surplus
        .iter()
        .zip(deficit)
        .map(|(surplus, deficit)| {
            (surplus + deficit * (1.0 + round_trip_loss)) * hours_per_period / MWH_PER_GWH
        })
        .collect::<Vec<_>>();

    let balance = cumulative_sum(&net_energy);
    let lowest = min(&balance)?;

    Ok(balance.into_iter().map(|level| level - lowest).collect())
}
