//! Time series of demand and generation, plus the numeric reductions shared by the profile engine
//! and cost model.
use crate::error::{EngineError, EngineResult, ensure_input};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use itertools::Itertools;

/// Seconds in an hour
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Raw demand, wind and solar power (MW) sampled at a uniform interval.
///
/// The three columns always share one strictly increasing, gap-free index; this is checked when
/// the series is constructed so that the profile engine never sees misaligned data.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    timestamps: Vec<NaiveDateTime>,
    interval: TimeDelta,
    demand: Vec<f64>,
    wind: Vec<f64>,
    solar: Vec<f64>,
}

impl RawSeries {
    /// Create a new [`RawSeries`], checking that the index and values are valid.
    ///
    /// # Arguments
    ///
    /// * `timestamps` - The start of each period
    /// * `interval` - The length of each period
    /// * `demand` - Demand for each period (MW)
    /// * `wind` - Wind generation for each period (MW)
    /// * `solar` - Solar generation for each period (MW)
    pub fn new(
        timestamps: Vec<NaiveDateTime>,
        interval: TimeDelta,
        demand: Vec<f64>,
        wind: Vec<f64>,
        solar: Vec<f64>,
    ) -> EngineResult<Self> {
        if timestamps.is_empty() {
            return Err(EngineError::EmptySeries);
        }
        ensure_input!(
            interval > TimeDelta::zero() && interval.subsec_nanos() == 0,
            "Sampling interval must be a positive whole number of seconds, got {interval}"
        );
        ensure_input!(
            demand.len() == timestamps.len()
                && wind.len() == timestamps.len()
                && solar.len() == timestamps.len(),
            "Demand, wind and solar series must all have {} periods (got {}, {} and {})",
            timestamps.len(),
            demand.len(),
            wind.len(),
            solar.len()
        );

        for (prev, next) in timestamps.iter().tuple_windows() {
            ensure_input!(
                *next - *prev == interval,
                "Periods must be contiguous at a uniform interval: {prev} is followed by {next}"
            );
        }

        for (name, values) in [("demand", &demand), ("wind", &wind), ("solar", &solar)] {
            check_values(name, &timestamps, values)?;
        }

        Ok(Self {
            timestamps,
            interval,
            demand,
            wind,
            solar,
        })
    }

    /// Create a new [`RawSeries`] whose periods start at `start` and follow on at `interval`
    pub fn from_start(
        start: NaiveDateTime,
        interval: TimeDelta,
        demand: Vec<f64>,
        wind: Vec<f64>,
        solar: Vec<f64>,
    ) -> EngineResult<Self> {
        let timestamps = (0..demand.len())
            .map(|i| start + interval * i32::try_from(i).unwrap_or(i32::MAX))
            .collect();
        Self::new(timestamps, interval, demand, wind, solar)
    }

    /// The start of each period
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// The length of each period
    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    /// The length of each period in hours
    pub fn hours_per_period(&self) -> f64 {
        self.interval.num_seconds() as f64 / SECONDS_PER_HOUR
    }

    /// Demand (MW)
    pub fn demand(&self) -> &[f64] {
        &self.demand
    }

    /// Wind generation (MW)
    pub fn wind(&self) -> &[f64] {
        &self.wind
    }

    /// Solar generation (MW)
    pub fn solar(&self) -> &[f64] {
        &self.solar
    }

    /// The number of periods
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the series has no periods (never true for a constructed series)
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Check that every value in a column is finite and non-negative
fn check_values(name: &str, timestamps: &[NaiveDateTime], values: &[f64]) -> EngineResult<()> {
    for (timestamp, value) in timestamps.iter().zip(values) {
        ensure_input!(
            value.is_finite(),
            "Non-finite {name} value at {timestamp}"
        );
        ensure_input!(
            *value >= 0.0,
            "Negative {name} value at {timestamp}: {value}"
        );
    }

    Ok(())
}

/// Average a series into longer periods.
///
/// Periods are grouped into consecutive windows of length `interval`, anchored at midnight on the
/// date of the first period, and each column is averaged over the periods in its window. Windows at
/// either end of the series may be only partly filled.
pub fn resample_mean(raw: &RawSeries, interval: TimeDelta) -> EngineResult<RawSeries> {
    let source_secs = raw.interval.num_seconds();
    let target_secs = interval.num_seconds();
    ensure_input!(
        target_secs > 0 && source_secs > 0 && target_secs % source_secs == 0,
        "Cannot resample from {source_secs}s periods to {target_secs}s periods: the target must be \
        a whole multiple of the source"
    );

    let origin = raw.timestamps[0].date().and_time(NaiveTime::MIN);
    let bucket_of = |i: &usize| (raw.timestamps[*i] - origin).num_seconds() / target_secs;

    let mut timestamps = Vec::new();
    let mut demand = Vec::new();
    let mut wind = Vec::new();
    let mut solar = Vec::new();
    for (bucket, indices) in &(0..raw.len()).chunk_by(bucket_of) {
        let indices = indices.collect_vec();
        let average = |values: &[f64]| {
            indices.iter().map(|i| values[*i]).sum::<f64>() / indices.len() as f64
        };

        let offset = i32::try_from(bucket).map_err(|_| {
            EngineError::InvalidInput(format!("Series is too long to resample: {bucket} periods"))
        })?;
        timestamps.push(origin + interval * offset);
        demand.push(average(&raw.demand));
        wind.push(average(&raw.wind));
        solar.push(average(&raw.solar));
    }

    RawSeries::new(timestamps, interval, demand, wind, solar)
}

/// The arithmetic mean of a series
pub fn mean(values: &[f64]) -> EngineResult<f64> {
    if values.is_empty() {
        return Err(EngineError::EmptySeries);
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// The largest value in a series
pub fn max(values: &[f64]) -> EngineResult<f64> {
    values
        .iter()
        .copied()
        .reduce(f64::max)
        .ok_or(EngineError::EmptySeries)
}

/// The smallest value in a series
pub fn min(values: &[f64]) -> EngineResult<f64> {
    values
        .iter()
        .copied()
        .reduce(f64::min)
        .ok_or(EngineError::EmptySeries)
}

/// The running total of a series
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |total, value| {
            *total += value;
            Some(*total)
        })
        .collect()
}
