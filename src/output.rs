//! The module responsible for writing output data to disk.
use crate::cost::CostResult;
use crate::profile::DerivedSeries;
use anyhow::{Context, Result, ensure};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The root folder in which scenario-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "renewable_cost_results";

/// The output file name for the derived profile
const PROFILE_FILE_NAME: &str = "profile.csv";

/// The output file name for the cost summary
const COSTS_FILE_NAME: &str = "costs.toml";

/// Format for timestamps in output files
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// MW in a GW
const MW_PER_GW: f64 = 1e3;

/// GWh in a TWh
const GWH_PER_TWH: f64 = 1e3;

/// Get the output directory for the scenario at the specified path
pub fn get_output_dir(scenario_dir: &Path) -> Result<PathBuf> {
    // Get the scenario name from the dir path. This ends up being convoluted because we need to
    // check for all possible errors.
    let scenario_dir = scenario_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to scenario")?;

    let scenario_name = scenario_dir
        .file_name()
        .context("Scenario cannot be in root folder")?
        .to_str()
        .context("Invalid chars in scenario dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, scenario_name].iter().collect())
}

/// Create a new output directory, optionally replacing an existing one.
///
/// # Returns
///
/// True if an existing, non-empty folder is being overwritten, false otherwise.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the profile CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ProfileRow {
    timestamp: String,
    demand_mw: f64,
    equivalent_demand_mw: f64,
    wind_mw: f64,
    solar_mw: f64,
    supply_mw: f64,
    scaled_supply_mw: f64,
    delta_mw: f64,
    surplus_mw: f64,
    deficit_mw: f64,
    storage_balance_gwh: f64,
}

impl ProfileRow {
    /// Create a new [`ProfileRow`] for the `i`th period
    fn new(timestamp: &NaiveDateTime, derived: &DerivedSeries, i: usize) -> Self {
        Self {
            timestamp: timestamp.format(TIMESTAMP_FORMAT).to_string(),
            demand_mw: derived.demand[i],
            equivalent_demand_mw: derived.equivalent_demand[i],
            wind_mw: derived.wind[i],
            solar_mw: derived.solar[i],
            supply_mw: derived.supply[i],
            scaled_supply_mw: derived.scaled_supply[i],
            delta_mw: derived.delta[i],
            surplus_mw: derived.surplus[i],
            deficit_mw: derived.deficit[i],
            storage_balance_gwh: derived.storage_balance[i],
        }
    }
}

/// Write the derived profile to a CSV file, one row per period
pub fn write_profile(output_path: &Path, derived: &DerivedSeries) -> Result<()> {
    let file_path = output_path.join(PROFILE_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Failed to create {}", file_path.display()))?;
    for (i, timestamp) in derived.timestamps.iter().enumerate() {
        writer.serialize(ProfileRow::new(timestamp, derived, i))?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the cost summary to a TOML file
pub fn write_costs(output_path: &Path, costs: &CostResult) -> Result<()> {
    let file_path = output_path.join(COSTS_FILE_NAME);
    fs::write(&file_path, toml::to_string(costs)?)
        .with_context(|| format!("Failed to write {}", file_path.display()))?;

    Ok(())
}

/// A human-readable summary of the capacity and cost needed to meet demand
pub fn report_lines(costs: &CostResult) -> Vec<String> {
    let gw = |mw: f64| mw / MW_PER_GW;
    let billions = |money: f64| money / 1e9;

    vec![
        format!(
            "Average demand {:.1} GW (baseline: {:.1} GW)",
            gw(costs.mean_equivalent_demand),
            gw(costs.mean_demand)
        ),
        format!(
            "Average supply {:.1} GW (wind: {:.1} GW / solar: {:.1} GW)",
            gw(costs.mean_supply),
            gw(costs.mean_wind),
            gw(costs.mean_solar)
        ),
        "Additional cost:".to_string(),
        format!(
            "- wind {:.1} GW / £{:.1}bn @ {:.0} £/MWh",
            gw(costs.wind_capacity.value()),
            billions(costs.wind_capital_cost.value()),
            costs.lcoe_wind.value()
        ),
        format!(
            "- solar {:.1} GW / £{:.1}bn @ {:.0} £/MWh",
            gw(costs.solar_capacity.value()),
            billions(costs.solar_capital_cost.value()),
            costs.lcoe_solar.value()
        ),
        format!(
            "- battery {:.1} TWh (peak) / £{:.1}tn",
            costs.peak_storage.value() / GWH_PER_TWH,
            costs.storage_capital_cost.value() / 1e12
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::compute_costs;
    use crate::finance::LcoeParams;
    use crate::fixture::{derived_series, lcoe_params};
    use crate::units::MoneyPerStorage;
    use itertools::Itertools;
    use rstest::{fixture, rstest};
    use tempfile::tempdir;

    #[fixture]
    fn costs(derived_series: DerivedSeries, lcoe_params: LcoeParams) -> CostResult {
        compute_costs(
            &derived_series,
            &lcoe_params,
            &lcoe_params,
            MoneyPerStorage(200.0),
        )
        .unwrap()
    }

    #[rstest]
    fn test_write_profile(derived_series: DerivedSeries) {
        let dir = tempdir().unwrap();
        write_profile(dir.path(), &derived_series).unwrap();

        let rows: Vec<ProfileRow> = csv::Reader::from_path(dir.path().join(PROFILE_FILE_NAME))
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].timestamp, "2022-01-01 00:00:00");
        assert_eq!(rows[1], ProfileRow::new(&derived_series.timestamps[1], &derived_series, 1));
        assert_eq!(rows[2].storage_balance_gwh, 0.0);
    }

    #[rstest]
    fn test_write_costs(costs: CostResult) {
        let dir = tempdir().unwrap();
        write_costs(dir.path(), &costs).unwrap();

        let contents = fs::read_to_string(dir.path().join(COSTS_FILE_NAME)).unwrap();
        let table: toml::Table = toml::from_str(&contents).unwrap();
        assert_eq!(table["lcoe_wind"].as_float(), Some(50.0));
        assert_eq!(table["mean_demand"].as_float(), Some(100.0));
    }

    #[rstest]
    fn test_report_lines(costs: CostResult) {
        let lines = report_lines(&costs);
        assert_eq!(lines[0], "Average demand 0.1 GW (baseline: 0.1 GW)");
        assert_eq!(lines[3], "- wind 0.1 GW / £0.1bn @ 50 £/MWh");
        assert_eq!(lines[5], "- battery 0.0 TWh (peak) / £0.0tn");
    }

    #[test]
    fn test_create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");

        // Create a new directory should succeed
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");

        fs::create_dir(&output_dir).unwrap();
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_with_files() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");

        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join(PROFILE_FILE_NAME), "contents").unwrap();

        // Not allowed to overwrite
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(output_dir.join(PROFILE_FILE_NAME).is_file());

        // Overwriting clears out the old files
        assert!(create_output_directory(&output_dir, true).unwrap());
        assert!(output_dir.is_dir());
        assert!(!output_dir.join(PROFILE_FILE_NAME).exists());
    }

    #[test]
    fn test_get_output_dir() {
        let temp_dir = tempdir().unwrap();
        let scenario_dir = temp_dir.path().join("uk_2022");
        fs::create_dir(&scenario_dir).unwrap();

        assert_eq!(
            get_output_dir(&scenario_dir).unwrap(),
            PathBuf::from(OUTPUT_DIRECTORY_ROOT).join("uk_2022")
        );
    }
}
