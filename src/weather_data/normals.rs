//! Turns Meteostat normals and monthly frames into [`MonthlyNormal`] rows.

use crate::types::monthly_normal::MonthlyNormal;
use crate::types::period::{Month, Year};
use polars::prelude::*;
use serde::Serialize;

const MINUTES_PER_HOUR: f64 = 60.0;

/// Normals of a single reference period, ordered by month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalsPeriod {
    pub start_year: i32,
    pub end_year: i32,
    pub normals: Vec<MonthlyNormal>,
}

impl NormalsPeriod {
    pub fn start_year(&self) -> Year {
        Year(self.start_year)
    }

    pub fn end_year(&self) -> Year {
        Year(self.end_year)
    }

    /// Wraps normals averaged from monthly data over `start..=end`.
    pub(crate) fn from_months(start: Month, end: Month, normals: Vec<MonthlyNormal>) -> Self {
        Self {
            start_year: start.year(),
            end_year: end.year(),
            normals,
        }
    }
}

/// Picks the most recent reference period in a normals frame.
///
/// Recency is decided by end year, then start year. Average temperature is
/// not part of Meteostat normals and is derived as the midpoint of the
/// minimum and maximum means. Returns `None` for an empty frame.
pub fn latest_normals(frame: LazyFrame) -> PolarsResult<Option<NormalsPeriod>> {
    let df = frame
        .select([
            col("start_year").cast(DataType::Int64),
            col("end_year").cast(DataType::Int64),
            col("month").cast(DataType::Int64),
            col("tmin").cast(DataType::Float64),
            col("tmax").cast(DataType::Float64),
            col("prcp").cast(DataType::Float64),
            col("tsun").cast(DataType::Float64),
        ])
        .collect()?;

    let start = df.column("start_year")?.i64()?;
    let end = df.column("end_year")?.i64()?;

    let latest = start
        .into_iter()
        .zip(end)
        .filter_map(|(s, e)| Some((e?, s?)))
        .max();
    let Some((end_year, start_year)) = latest else {
        return Ok(None);
    };

    let month = df.column("month")?.i64()?;
    let tmin = df.column("tmin")?.f64()?;
    let tmax = df.column("tmax")?.f64()?;
    let prcp = df.column("prcp")?.f64()?;
    let tsun = df.column("tsun")?.f64()?;

    let mut normals: Vec<MonthlyNormal> = (0..df.height())
        .filter(|&i| start.get(i) == Some(start_year) && end.get(i) == Some(end_year))
        .filter_map(|i| {
            let month = u32::try_from(month.get(i)?).ok()?;
            Some(MonthlyNormal {
                month,
                avg_temp: MonthlyNormal::midrange(tmin.get(i), tmax.get(i)),
                min_temp: tmin.get(i),
                max_temp: tmax.get(i),
                precipitation: prcp.get(i),
                sunshine_hours: tsun.get(i).map(|m| m / MINUTES_PER_HOUR),
            })
        })
        .collect();
    normals.sort_by_key(|n| n.month);

    Ok(Some(NormalsPeriod {
        start_year: start_year as i32,
        end_year: end_year as i32,
        normals,
    }))
}

/// Averages monthly observations in `start..=end` per calendar month.
///
/// Missing values are skipped when averaging. Calendar months without any
/// observation in the range are left out, so a short range yields fewer
/// than twelve rows. Returns `None` when the range holds no observations.
pub fn monthly_as_normal(
    frame: LazyFrame,
    start: Month,
    end: Month,
) -> PolarsResult<Option<Vec<MonthlyNormal>>> {
    let ordinal = col("year") * lit(12i64) + col("month") - lit(1i64);

    let df = frame
        .with_columns([
            col("year").cast(DataType::Int64),
            col("month").cast(DataType::Int64),
            col("tavg").cast(DataType::Float64),
            col("tmin").cast(DataType::Float64),
            col("tmax").cast(DataType::Float64),
            col("prcp").cast(DataType::Float64),
            col("tsun").cast(DataType::Float64),
        ])
        .filter(
            ordinal
                .clone()
                .gt_eq(lit(start.ordinal()))
                .and(ordinal.lt_eq(lit(end.ordinal()))),
        )
        .group_by([col("month")])
        .agg([
            col("tavg").mean(),
            col("tmin").mean(),
            col("tmax").mean(),
            col("prcp").mean(),
            col("tsun").mean(),
        ])
        .sort(["month"], SortMultipleOptions::default())
        .collect()?;

    if df.height() == 0 {
        return Ok(None);
    }

    let month = df.column("month")?.i64()?;
    let tavg = df.column("tavg")?.f64()?;
    let tmin = df.column("tmin")?.f64()?;
    let tmax = df.column("tmax")?.f64()?;
    let prcp = df.column("prcp")?.f64()?;
    let tsun = df.column("tsun")?.f64()?;

    Ok(Some(
        (0..df.height())
            .filter_map(|i| {
                Some(MonthlyNormal {
                    month: u32::try_from(month.get(i)?).ok()?,
                    avg_temp: tavg.get(i),
                    min_temp: tmin.get(i),
                    max_temp: tmax.get(i),
                    precipitation: prcp.get(i),
                    sunshine_hours: tsun.get(i).map(|m| m / MINUTES_PER_HOUR),
                })
            })
            .collect(),
    ))
}
