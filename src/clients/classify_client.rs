//! Provides the `ClassifyClient`, which classifies the latest normals of a
//! station, or of the nearest station with normals to a location.

use crate::classifier::classify;
use crate::classifier::result::ClassificationResult;
use crate::classifier::rules::DEFAULT_ISOTHERM;
use crate::clients::normals_client::StationNormals;
use crate::error::KoppenError;
use crate::koppen::{month_range, Koppen, LatLon};
use crate::types::frequency::Frequency;
use crate::types::period::Month;
use crate::types::station::Station;
use crate::weather_data::normals::{monthly_as_normal, NormalsPeriod};
use bon::bon;
use log::info;
use serde::Serialize;

/// Classification of a location through its nearest station with normals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationClassification {
    /// Caller supplied label for the location, e.g. a city name.
    pub target_name: Option<String>,
    pub station: Station,
    pub distance_km: f64,
    /// The normals the classification was computed from.
    pub period: NormalsPeriod,
    pub result: ClassificationResult,
}

impl LocationClassification {
    pub fn station_id(&self) -> &str {
        &self.station.id
    }

    pub fn wmo(&self) -> Option<&str> {
        self.station.identifiers.wmo.as_deref()
    }

    pub fn station_name(&self) -> &str {
        self.station.display_name()
    }
}

/// Obtained via [`Koppen::classify()`].
pub struct ClassifyClient<'a> {
    client: &'a Koppen,
}

#[bon]
impl<'a> ClassifyClient<'a> {
    pub(crate) fn new(client: &'a Koppen) -> Self {
        Self { client }
    }

    /// Classifies the latest normals of a station.
    ///
    /// * `.isotherm(f64)`: coldest-month boundary between C and D, defaults to
    ///   [`DEFAULT_ISOTHERM`].
    /// * `.start(Month)` / `.end(Month)`: classify the station's monthly data
    ///   averaged over this range instead of its published normals.
    ///
    /// # Errors
    ///
    /// [`KoppenError::NoNormals`] (or [`KoppenError::NoMonthlyData`] with a
    /// range) if there is nothing to classify, and
    /// [`KoppenError::IncompleteData`] if a month lacks its temperature or
    /// precipitation.
    #[builder(start_fn = station)]
    #[doc(hidden)]
    pub async fn build_station(
        &self,
        #[builder(start_fn)] station: &str,
        isotherm: Option<f64>,
        start: Option<Month>,
        end: Option<Month>,
    ) -> Result<ClassificationResult, KoppenError> {
        let normals = match month_range(start, end)? {
            None => self.client.normals().station(station).call().await?.normals,
            Some((start, end)) => {
                self.client
                    .monthly_normals()
                    .station(station)
                    .start(start)
                    .end(end)
                    .call()
                    .await?
            }
        };
        Ok(classify(&normals, isotherm.unwrap_or(DEFAULT_ISOTHERM))?)
    }

    /// Classifies a location using the nearest station that has normals.
    ///
    /// * `.name(String)`: label carried through to the result.
    /// * `.isotherm(f64)`: defaults to [`DEFAULT_ISOTHERM`].
    /// * `.max_distance_km(f64)`: search radius, defaults to `100.0`.
    /// * `.station_limit(usize)`: stations to try, defaults to `10`.
    /// * `.start(Month)` / `.end(Month)`: use the nearest station with monthly
    ///   data in this range, averaged per calendar month, instead of normals.
    ///
    /// The station is chosen before its normals are checked for
    /// completeness, so an incomplete nearest station is an error rather
    /// than a reason to move further away.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use koppen::{Koppen, KoppenError, LatLon, CANONICAL_ISOTHERM};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), KoppenError> {
    /// let client = Koppen::new().await?;
    /// let iquitos = client
    ///     .classify()
    ///     .location(LatLon(-3.74419, -73.25171))
    ///     .name("Iquitos")
    ///     .isotherm(CANONICAL_ISOTHERM)
    ///     .call()
    ///     .await?;
    /// println!("{}: {} via {}", iquitos.target_name.as_deref().unwrap_or("?"), iquitos.result, iquitos.station_name());
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = location)]
    #[doc(hidden)]
    pub async fn build_location(
        &self,
        #[builder(start_fn)] coordinate: LatLon,
        #[builder(into)] name: Option<String>,
        isotherm: Option<f64>,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
        start: Option<Month>,
        end: Option<Month>,
    ) -> Result<LocationClassification, KoppenError> {
        let (station, distance_km, period) = match month_range(start, end)? {
            None => {
                let StationNormals {
                    station,
                    distance_km,
                    period,
                } = self
                    .client
                    .normals()
                    .location(coordinate)
                    .maybe_max_distance_km(max_distance_km)
                    .maybe_station_limit(station_limit)
                    .call()
                    .await?;
                (station, distance_km, period)
            }
            Some((start, end)) => {
                self.client
                    .first_station_with(
                        coordinate,
                        Frequency::Monthly,
                        max_distance_km,
                        station_limit,
                        None,
                        |frame| {
                            Ok(monthly_as_normal(frame, start, end)?
                                .map(|normals| NormalsPeriod::from_months(start, end, normals)))
                        },
                    )
                    .await?
            }
        };

        let result = classify(&period.normals, isotherm.unwrap_or(DEFAULT_ISOTHERM))?;
        info!(
            "{} classified as {} using station {} ({:.1} km away, {}-{})",
            name.as_deref().unwrap_or("Location"),
            result,
            station.id,
            distance_km,
            period.start_year,
            period.end_year
        );

        Ok(LocationClassification {
            target_name: name,
            station,
            distance_km,
            period,
            result,
        })
    }
}
