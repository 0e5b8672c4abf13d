//! Provides the `NormalsClient` for fetching the latest climate normals of a
//! station, either by id or by searching near a location.

use crate::error::KoppenError;
use crate::koppen::{Koppen, LatLon};
use crate::types::frequency::Frequency;
use crate::types::station::Station;
use crate::weather_data::normals::{latest_normals, NormalsPeriod};
use bon::bon;
use serde::Serialize;

/// Normals of the station closest to a requested location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationNormals {
    pub station: Station,
    /// Great-circle distance between the requested location and the station.
    pub distance_km: f64,
    pub period: NormalsPeriod,
}

/// Obtained via [`Koppen::normals()`].
pub struct NormalsClient<'a> {
    client: &'a Koppen,
}

#[bon]
impl<'a> NormalsClient<'a> {
    pub(crate) fn new(client: &'a Koppen) -> Self {
        Self { client }
    }

    /// Latest reference period of a station's normals.
    ///
    /// # Errors
    ///
    /// [`KoppenError::NoNormals`] when the station publishes no normals rows.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use koppen::{Koppen, KoppenError};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), KoppenError> {
    /// let client = Koppen::new().await?;
    /// let period = client.normals().station("10382").call().await?;
    /// println!("{}-{}: {} months", period.start_year, period.end_year, period.normals.len());
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = station)]
    #[doc(hidden)]
    pub async fn build_station(
        &self,
        #[builder(start_fn)] station: &str,
    ) -> Result<NormalsPeriod, KoppenError> {
        let frame = self
            .client
            .data_from_station()
            .station(station)
            .frequency(Frequency::Normals)
            .call()
            .await?;
        latest_normals(frame)?.ok_or_else(|| KoppenError::NoNormals {
            station: station.to_string(),
        })
    }

    /// Latest normals of the nearest station that actually has normals.
    ///
    /// * `.max_distance_km(f64)`: search radius, defaults to `100.0`.
    /// * `.station_limit(usize)`: stations to try, closest first, defaults to `10`.
    #[builder(start_fn = location)]
    #[doc(hidden)]
    pub async fn build_location(
        &self,
        #[builder(start_fn)] coordinate: LatLon,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
    ) -> Result<StationNormals, KoppenError> {
        let (station, distance_km, period) = self
            .client
            .first_station_with(
                coordinate,
                Frequency::Normals,
                max_distance_km,
                station_limit,
                None,
                |frame| Ok(latest_normals(frame)?),
            )
            .await?;
        Ok(StationNormals {
            station,
            distance_km,
            period,
        })
    }
}
