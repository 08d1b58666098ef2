//! Common routines for handling input data.
use crate::series::RawSeries;
use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Formats accepted for timestamps with a time component
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Format accepted for bare dates, which are taken to start at midnight
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_internal(file_path)?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }
    Ok(vec.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::Reader::from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// A row of the time series CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct TimeSeriesRaw {
    timestamp: String,
    demand_mw: f64,
    wind_mw: f64,
    solar_mw: f64,
}

/// Parse a timestamp, which may be a full date and time or just a date
fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for format in DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(timestamp);
        }
    }

    let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
        .with_context(|| format!("Invalid timestamp: {s}"))?;
    Ok(date.and_time(NaiveTime::MIN))
}

/// Read demand, wind and solar power from raw CSV records
fn read_time_series_from_iter<I>(iter: I, interval: TimeDelta) -> Result<RawSeries>
where
    I: Iterator<Item = TimeSeriesRaw>,
{
    let mut timestamps = Vec::new();
    let mut demand = Vec::new();
    let mut wind = Vec::new();
    let mut solar = Vec::new();
    for row in iter {
        timestamps.push(parse_timestamp(&row.timestamp)?);
        demand.push(row.demand_mw);
        wind.push(row.wind_mw);
        solar.push(row.solar_mw);
    }

    Ok(RawSeries::new(timestamps, interval, demand, wind, solar)?)
}

/// Read a time series of demand, wind and solar power from a CSV file.
///
/// The file must have the columns `timestamp`, `demand_mw`, `wind_mw` and `solar_mw`, with one row
/// per period and no gaps.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
/// * `interval` - The length of each period
pub fn read_time_series(file_path: &Path, interval: TimeDelta) -> Result<RawSeries> {
    let iter = read_csv::<TimeSeriesRaw>(file_path)?;
    read_time_series_from_iter(iter, interval).with_context(|| input_err_msg(file_path))
}
