//! Defines the `Scenario` struct, which represents the contents of `scenario.toml`.
use crate::cost::check_battery_unit_cost;
use crate::finance::LcoeParams;
use crate::input::{input_err_msg, read_time_series, read_toml};
use crate::profile::{check_demand_multiplier, check_round_trip_loss};
use crate::series::{RawSeries, resample_mean};
use crate::units::{Dimensionless, MoneyPerCapacity, MoneyPerCapacityPerYear, MoneyPerStorage};
use anyhow::{Context, Result, ensure};
use chrono::TimeDelta;
use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const SCENARIO_FILE_NAME: &str = "scenario.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_data_file, PathBuf, PathBuf::from("timeseries.csv"));
define_param_default!(default_interval_hours, u32, 24);
define_param_default!(default_demand_multiplier, f64, 1.0);
define_param_default!(default_battery_round_trip_loss, f64, 0.0);
define_param_default!(default_battery_unit_cost, MoneyPerStorage, MoneyPerStorage(200.0));
define_param_default!(
    default_wind,
    LcoeParams,
    LcoeParams {
        periods: 20,
        discount_rate: Dimensionless(0.03),
        capital_cost_per_kw: MoneyPerCapacity(1500.0),
        capacity_factor: Dimensionless(0.25),
        fixed_om_cost_per_kw_yr: MoneyPerCapacityPerYear(25.0),
    }
);
define_param_default!(
    default_solar,
    LcoeParams,
    LcoeParams {
        periods: 20,
        discount_rate: Dimensionless(0.03),
        capital_cost_per_kw: MoneyPerCapacity(1000.0),
        capacity_factor: Dimensionless(0.25),
        fixed_om_cost_per_kw_yr: MoneyPerCapacityPerYear(25.0),
    }
);

/// The assumptions for a single analysis run.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Path to the time series CSV file, relative to the scenario directory
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// The length of each period in the time series file, in hours
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u32,
    /// If given, average the time series into periods of this many hours before analysis
    #[serde(default)]
    pub resample_hours: Option<u32>,
    /// Factor applied to demand to account for additional electrified load
    #[serde(default = "default_demand_multiplier")]
    pub demand_multiplier: f64,
    /// Fraction of energy lost when cycling the batteries
    #[serde(default = "default_battery_round_trip_loss")]
    pub battery_round_trip_loss: f64,
    /// Cost of battery storage per kWh
    #[serde(default = "default_battery_unit_cost")]
    pub battery_unit_cost: MoneyPerStorage,
    /// Financial assumptions for wind
    #[serde(default = "default_wind")]
    pub wind: LcoeParams,
    /// Financial assumptions for solar
    #[serde(default = "default_solar")]
    pub solar: LcoeParams,
}

/// Check that the `interval_hours` and `resample_hours` parameters are valid
fn check_intervals(interval_hours: u32, resample_hours: Option<u32>) -> Result<()> {
    ensure!(interval_hours > 0, "interval_hours must be greater than zero");

    if let Some(resample_hours) = resample_hours {
        ensure!(
            resample_hours > 0 && resample_hours % interval_hours == 0,
            "resample_hours must be a whole multiple of interval_hours ({interval_hours})"
        );
    }

    Ok(())
}

impl Scenario {
    /// Read a scenario file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `scenario_dir` - Folder containing scenario files
    ///
    /// # Returns
    ///
    /// The scenario file contents as a [`Scenario`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(scenario_dir: P) -> Result<Scenario> {
        let file_path = scenario_dir.as_ref().join(SCENARIO_FILE_NAME);
        let scenario: Scenario = read_toml(&file_path)?;

        scenario
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(scenario)
    }

    /// Validate parameters after reading in file.
    ///
    /// Engine parameters are checked by the profile engine's and cost model's own checks.
    fn validate(&self) -> Result<()> {
        check_intervals(self.interval_hours, self.resample_hours)?;
        check_demand_multiplier(self.demand_multiplier)?;
        check_round_trip_loss(self.battery_round_trip_loss)?;
        check_battery_unit_cost(self.battery_unit_cost)?;
        self.wind.validate().context("Invalid parameters for wind")?;
        self.solar
            .validate()
            .context("Invalid parameters for solar")?;

        Ok(())
    }

    /// Load the time series for this scenario, resampling it if requested.
    ///
    /// # Arguments
    ///
    /// * `scenario_dir` - Folder containing scenario files
    pub fn load_time_series(&self, scenario_dir: &Path) -> Result<RawSeries> {
        let file_path = scenario_dir.join(&self.data_file);
        let interval = TimeDelta::hours(self.interval_hours.into());
        let raw = read_time_series(&file_path, interval)?;
        info!(
            "Read {} periods of {}h data from {}",
            raw.len(),
            self.interval_hours,
            file_path.display()
        );

        let Some(resample_hours) = self.resample_hours else {
            return Ok(raw);
        };

        let resampled = resample_mean(&raw, TimeDelta::hours(resample_hours.into()))
            .with_context(|| format!("Failed to resample to {resample_hours}h periods"))?;
        info!(
            "Resampled to {} periods of {resample_hours}h",
            resampled.len()
        );

        Ok(resampled)
    }
}
