//! Rain-hour statistics for a location from the nearest hourly station.

use crate::error::KoppenError;
use crate::koppen::{Koppen, LatLon};
use crate::types::frequency::Frequency;
use crate::weather_data::rain_hours::{summarize_rain_hours, RainHoursSummary};
use bon::bon;
use chrono::{DateTime, Utc};
use log::info;

#[bon]
impl Koppen {
    /// Counts the hours it rained at the nearest station with hourly data in
    /// `start..=end`.
    ///
    /// * `.threshold_mm(f64)`: an hour is a rain hour when its precipitation
    ///   is strictly above this, defaults to `0.0`.
    /// * `.max_distance_km(f64)`: search radius, defaults to `100.0`.
    /// * `.station_limit(usize)`: stations to try, defaults to `10`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use chrono::{TimeZone, Utc};
    /// # use koppen::{Koppen, KoppenError, LatLon};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), KoppenError> {
    /// let client = Koppen::new().await?;
    /// let summary = client
    ///     .rain_hours()
    ///     .location(LatLon(52.0907, 5.1214))
    ///     .start(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
    ///     .end(Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap())
    ///     .call()
    ///     .await?;
    /// println!("{:?} rain hours per day", summary.avg_rain_hours_per_day);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn rain_hours(
        &self,
        location: LatLon,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        threshold_mm: Option<f64>,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
    ) -> Result<RainHoursSummary, KoppenError> {
        let threshold_mm = threshold_mm.unwrap_or(0.0);
        let (station, distance_km, summary) = self
            .first_station_with(
                location,
                Frequency::Hourly,
                max_distance_km,
                station_limit,
                None,
                |frame| Ok(summarize_rain_hours(frame, start, end, threshold_mm)?),
            )
            .await?;
        info!(
            "{} of {} hours above {} mm at station {} ({:.1} km away)",
            summary.rain_hours, summary.total_hours, threshold_mm, station.id, distance_km
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::koppen::test_support::seeded_client;
    use crate::types::station::tests::station;
    use chrono::TimeZone;
    use polars::prelude::*;

    fn hourly_df(day: &str, prcp: f64) -> PolarsResult<DataFrame> {
        df!(
            "date" => vec![day.to_string(); 24],
            "hour" => (0..24i64).collect::<Vec<_>>(),
            "temp" => vec![Some(11.0f64); 24],
            "prcp" => (0..24).map(|h| Some(if h < 6 { prcp } else { 0.0 })).collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn uses_nearest_station_with_rows_in_window() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = seeded_client(
            dir.path(),
            vec![station("06260", 52.1, 5.18), station("06348", 51.97, 4.93)],
            vec![
                // Closest station only has data for another day.
                (Frequency::Hourly, "06260", hourly_df("2022-03-01", 1.0)?),
                (Frequency::Hourly, "06348", hourly_df("2023-03-01", 0.4)?),
            ],
        )
        .await;

        let start = Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 3, 1, 23, 0, 0).unwrap();

        let summary = client
            .rain_hours()
            .location(LatLon(52.0907, 5.1214))
            .start(start)
            .end(end)
            .call()
            .await?;
        assert_eq!(summary.total_hours, 24);
        assert_eq!(summary.rain_hours, 6);
        assert_eq!(summary.avg_rain_hours_per_day, Some(6.0));
        assert_eq!(summary.avg_temperature, Some(11.0));

        let heavy = client
            .rain_hours()
            .location(LatLon(52.0907, 5.1214))
            .start(start)
            .end(end)
            .threshold_mm(0.5)
            .call()
            .await?;
        assert_eq!(heavy.rain_hours, 0);
        Ok(())
    }
}
