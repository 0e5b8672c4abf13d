//! Rain-hour statistics from hourly observations.

use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::Serialize;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// How often it rained in a window of hourly observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainHoursSummary {
    /// Hours with a precipitation reading.
    pub total_hours: usize,
    /// Hours whose precipitation exceeded the threshold.
    pub rain_hours: usize,
    /// `total_hours / 24`.
    pub days: f64,
    /// `rain_hours / days`, `None` when there are no readings.
    pub avg_rain_hours_per_day: Option<f64>,
    /// Sum of all precipitation readings (mm).
    pub total_precipitation: f64,
    /// Mean of all temperature readings (°C).
    pub avg_temperature: Option<f64>,
}

/// Summarizes hourly observations between `start` and `end` (both inclusive).
///
/// An hour counts as a rain hour when its precipitation is strictly above
/// `threshold_mm`. Returns `None` when no observation falls in the window.
pub fn summarize_rain_hours(
    frame: LazyFrame,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    threshold_mm: f64,
) -> PolarsResult<Option<RainHoursSummary>> {
    let df = with_observation_time(frame)
        .filter(
            col("datetime")
                .gt_eq(lit(start.naive_utc()))
                .and(col("datetime").lt_eq(lit(end.naive_utc()))),
        )
        .select([
            len().cast(DataType::Int64).alias("rows"),
            col("prcp")
                .is_not_null()
                .sum()
                .cast(DataType::Int64)
                .alias("total_hours"),
            col("prcp")
                .gt(lit(threshold_mm))
                .sum()
                .cast(DataType::Int64)
                .alias("rain_hours"),
            col("prcp").sum().alias("total_precipitation"),
            col("temp").mean().alias("avg_temperature"),
        ])
        .collect()?;

    let count = |name: &str| -> PolarsResult<usize> {
        let value = df.column(name)?.i64()?.get(0).unwrap_or(0);
        Ok(usize::try_from(value).unwrap_or(0))
    };
    if count("rows")? == 0 {
        return Ok(None);
    }
    let total_hours = count("total_hours")?;
    let rain_hours = count("rain_hours")?;

    let days = total_hours as f64 / 24.0;
    Ok(Some(RainHoursSummary {
        total_hours,
        rain_hours,
        days,
        avg_rain_hours_per_day: (total_hours > 0).then(|| rain_hours as f64 / days),
        total_precipitation: df
            .column("total_precipitation")?
            .f64()?
            .get(0)
            .unwrap_or(0.0),
        avg_temperature: df.column("avg_temperature")?.f64()?.get(0),
    }))
}

/// Adds a `datetime` column built from the bulk `date` string and `hour`.
///
/// Rows whose date does not parse get a null `datetime` and drop out of
/// any window filter.
fn with_observation_time(frame: LazyFrame) -> LazyFrame {
    let midnight = col("date").cast(DataType::String).str().strptime(
        DataType::Datetime(TimeUnit::Milliseconds, None),
        StrptimeOptions {
            format: Some("%Y-%m-%d".into()),
            strict: false,
            ..Default::default()
        },
        lit("raise"),
    );
    let observed_at = midnight.cast(DataType::Int64)
        + col("hour").cast(DataType::Int64) * lit(MILLIS_PER_HOUR);

    frame.with_columns([
        observed_at
            .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
            .alias("datetime"),
        col("prcp").cast(DataType::Float64),
        col("temp").cast(DataType::Float64),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hourly_frame() -> PolarsResult<LazyFrame> {
        // Two days of readings: it rains 0.5 mm every third hour, one reading is missing.
        let mut date = Vec::new();
        let mut hour = Vec::new();
        let mut prcp = Vec::new();
        let mut temp = Vec::new();
        for day in ["2023-06-01", "2023-06-02"] {
            for h in 0..24i64 {
                date.push(day.to_string());
                hour.push(h);
                prcp.push(match (day, h) {
                    ("2023-06-02", 23) => None,
                    (_, h) if h % 3 == 0 => Some(0.5),
                    _ => Some(0.0),
                });
                temp.push(Some(if day == "2023-06-01" { 14.0 } else { 16.0 }));
            }
        }
        Ok(df!(
            "date" => date,
            "hour" => hour,
            "temp" => temp,
            "prcp" => prcp,
        )?
        .lazy())
    }

    #[test]
    fn counts_rain_hours_in_window() -> PolarsResult<()> {
        let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 6, 2, 23, 0, 0).unwrap();
        let summary = summarize_rain_hours(hourly_frame()?, start, end, 0.0)?.unwrap();

        assert_eq!(summary.total_hours, 47);
        assert_eq!(summary.rain_hours, 16);
        assert!((summary.days - 47.0 / 24.0).abs() < 1e-12);
        assert!((summary.avg_rain_hours_per_day.unwrap() - 16.0 / (47.0 / 24.0)).abs() < 1e-12);
        assert!((summary.total_precipitation - 8.0).abs() < 1e-12);
        assert_eq!(summary.avg_temperature, Some(15.0));
        Ok(())
    }

    #[test]
    fn window_bounds_are_hour_precise() -> PolarsResult<()> {
        let start = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 6, 1, 17, 0, 0).unwrap();
        let summary = summarize_rain_hours(hourly_frame()?, start, end, 0.0)?.unwrap();
        assert_eq!(summary.total_hours, 6);
        assert_eq!(summary.rain_hours, 2);
        Ok(())
    }

    #[test]
    fn window_crosses_midnight_and_skips_bad_dates() -> PolarsResult<()> {
        let garbled = df!(
            "date" => ["not-a-date"],
            "hour" => [23i64],
            "temp" => [Some(40.0f64)],
            "prcp" => [Some(9.0f64)],
        )?
        .lazy();
        let frame = concat([hourly_frame()?, garbled], UnionArgs::default())?;

        let start = Utc.with_ymd_and_hms(2023, 6, 1, 22, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 6, 2, 1, 0, 0).unwrap();
        let summary = summarize_rain_hours(frame, start, end, 0.0)?.unwrap();
        assert_eq!(summary.total_hours, 4);
        assert_eq!(summary.rain_hours, 1);
        assert!((summary.total_precipitation - 0.5).abs() < 1e-12);
        assert_eq!(summary.avg_temperature, Some(15.0));
        Ok(())
    }

    #[test]
    fn threshold_is_exclusive() -> PolarsResult<()> {
        let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 6, 1, 23, 0, 0).unwrap();
        let summary = summarize_rain_hours(hourly_frame()?, start, end, 0.5)?.unwrap();
        assert_eq!(summary.rain_hours, 0);
        Ok(())
    }

    #[test]
    fn empty_window_is_none() -> PolarsResult<()> {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2020, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(summarize_rain_hours(hourly_frame()?, start, end, 0.0)?, None);
        Ok(())
    }
}
