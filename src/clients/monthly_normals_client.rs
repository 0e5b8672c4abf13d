//! Provides the `MonthlyNormalsClient`, which averages a station's monthly
//! observations over a custom range into normals-like rows.

use crate::error::KoppenError;
use crate::koppen::Koppen;
use crate::types::frequency::Frequency;
use crate::types::monthly_normal::MonthlyNormal;
use crate::types::period::Month;
use crate::weather_data::normals::monthly_as_normal;
use bon::bon;

/// Obtained via [`Koppen::monthly_normals()`].
pub struct MonthlyNormalsClient<'a> {
    client: &'a Koppen,
}

#[bon]
impl<'a> MonthlyNormalsClient<'a> {
    pub(crate) fn new(client: &'a Koppen) -> Self {
        Self { client }
    }

    /// Per-calendar-month means of the station's monthly data in `start..=end`.
    ///
    /// Calendar months without observations in the range are absent from
    /// the result, which [`crate::classify`] then reports as missing.
    ///
    /// # Errors
    ///
    /// [`KoppenError::NoMonthlyData`] when no observation falls in the range.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use koppen::{Koppen, KoppenError, Month};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), KoppenError> {
    /// let client = Koppen::new().await?;
    /// let normals = client
    ///     .monthly_normals()
    ///     .station("10382")
    ///     .start(Month::new(1, 2001))
    ///     .end(Month::new(12, 2020))
    ///     .call()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = station)]
    #[doc(hidden)]
    pub async fn build_station(
        &self,
        #[builder(start_fn)] station: &str,
        start: Month,
        end: Month,
    ) -> Result<Vec<MonthlyNormal>, KoppenError> {
        let frame = self
            .client
            .data_from_station()
            .station(station)
            .frequency(Frequency::Monthly)
            .call()
            .await?;
        monthly_as_normal(frame, start, end)?.ok_or_else(|| KoppenError::NoMonthlyData {
            station: station.to_string(),
            start,
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::classifier::rules::DEFAULT_ISOTHERM;
    use crate::koppen::test_support::seeded_client;
    use polars::prelude::*;

    fn monthly_df() -> PolarsResult<DataFrame> {
        // 2019 and 2020, the second year two degrees warmer and twice as wet.
        let rows: Vec<(i64, i64)> = (2019..=2020)
            .flat_map(|y| (1..=12).map(move |m| (y, m)))
            .collect();
        df!(
            "year" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            "month" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
            "tavg" => rows.iter().map(|&(y, _)| Some(if y == 2019 { 24.0 } else { 26.0 })).collect::<Vec<_>>(),
            "tmin" => vec![Some(20.0f64); 24],
            "tmax" => vec![Some(30.0f64); 24],
            "prcp" => rows.iter().map(|&(y, _)| Some(if y == 2019 { 100.0 } else { 200.0 })).collect::<Vec<_>>(),
            "wspd" => vec![None::<f64>; 24],
            "pres" => vec![None::<f64>; 24],
            "tsun" => vec![None::<f64>; 24],
        )
    }

    #[tokio::test]
    async fn averages_custom_range() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = seeded_client(
            dir.path(),
            vec![],
            vec![(Frequency::Monthly, "48698", monthly_df()?)],
        )
        .await;

        let normals = client
            .monthly_normals()
            .station("48698")
            .start(Month::new(1, 2019))
            .end(Month::new(12, 2020))
            .call()
            .await?;
        assert_eq!(normals.len(), 12);
        assert_eq!(normals[5].avg_temp, Some(25.0));
        assert_eq!(normals[5].precipitation, Some(150.0));
        assert_eq!(classify(&normals, DEFAULT_ISOTHERM)?.koppen_code, "Af");
        Ok(())
    }

    #[tokio::test]
    async fn empty_range_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = seeded_client(
            dir.path(),
            vec![],
            vec![(Frequency::Monthly, "48698", monthly_df()?)],
        )
        .await;

        let result = client
            .monthly_normals()
            .station("48698")
            .start(Month::new(1, 1990))
            .end(Month::new(12, 1999))
            .call()
            .await;
        assert!(matches!(result, Err(KoppenError::NoMonthlyData { .. })));
        Ok(())
    }
}
