//! Estimate the wind, solar and battery storage capacity needed to meet electricity demand from
//! renewables alone, and what building it would cost.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod cost;
pub mod error;
pub mod finance;
pub mod input;
pub mod log;
pub mod output;
pub mod profile;
pub mod scenario;
pub mod series;
pub mod settings;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// Falls back to the current directory if the platform has no config dir.
pub fn get_config_dir() -> PathBuf {
    let mut dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("renewable-cost");
    dir
}
