//! Fixtures for tests

use crate::finance::LcoeParams;
use crate::profile::{DerivedSeries, derive};
use crate::series::RawSeries;
use crate::units::{Dimensionless, MoneyPerCapacity, MoneyPerCapacityPerYear};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
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

/// The start of the first period in test series
pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// A series of daily periods beginning on [`start`]
pub fn daily_series(demand: Vec<f64>, wind: Vec<f64>, solar: Vec<f64>) -> RawSeries {
    RawSeries::from_start(start(), TimeDelta::days(1), demand, wind, solar).unwrap()
}

/// Four days with a mean demand of 100 MW and a mean supply of 50 MW (35 wind, 15 solar)
#[fixture]
pub fn raw_series() -> RawSeries {
    daily_series(
        vec![120.0, 100.0, 100.0, 80.0],
        vec![30.0, 60.0, 10.0, 40.0],
        vec![10.0, 20.0, 10.0, 20.0],
    )
}

#[fixture]
pub fn derived_series(raw_series: RawSeries) -> DerivedSeries {
    derive(&raw_series, 1.0, 0.0).unwrap()
}

#[fixture]
pub fn lcoe_params() -> LcoeParams {
    LcoeParams {
        periods: 20,
        discount_rate: Dimensionless(0.03),
        capital_cost_per_kw: MoneyPerCapacity(1250.0),
        capacity_factor: Dimensionless(0.25),
        fixed_om_cost_per_kw_yr: MoneyPerCapacityPerYear(25.0),
    }
}
