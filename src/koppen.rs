//! The main entry point for classifying stations and locations.
//!
//! [`Koppen`] owns the station index and the weather data cache, and hands
//! out small clients ([`Koppen::normals`], [`Koppen::classify`], ...) that
//! turn Meteostat data into Köppen classifications.

use crate::clients::classify_client::ClassifyClient;
use crate::clients::monthly_normals_client::MonthlyNormalsClient;
use crate::clients::normals_client::NormalsClient;
use crate::error::KoppenError;
use crate::stations::locate_station::StationLocator;
use crate::types::frequency::{Frequency, RequiredData};
use crate::types::period::Month;
use crate::types::station::Station;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use crate::weather_data::data_loader::WeatherDataLoader;
use bon::bon;
use log::{debug, info};
use polars::prelude::LazyFrame;
use std::path::{Path, PathBuf};

pub(crate) const DEFAULT_MAX_DISTANCE_KM: f64 = 100.0;
pub(crate) const DEFAULT_STATION_LIMIT: usize = 10;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use koppen::LatLon;
///
/// let iquitos = LatLon(-3.74419, -73.25171);
/// assert_eq!(iquitos.0, -3.74419); // Latitude
/// assert_eq!(iquitos.1, -73.25171); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// Specifies criteria for checking station data availability (inventory).
///
/// Used with [`Koppen::find_stations`] to keep only stations that report a
/// given [`Frequency`] for a given period ([`RequiredData`]).
///
/// # Examples
///
/// ```
/// use koppen::{Frequency, InventoryRequest, RequiredData};
///
/// // Stations with any climate normals
/// let any_normals = InventoryRequest::new(Frequency::Normals, RequiredData::Any);
///
/// // Stations with monthly data for every year from 1991 to 2020
/// let monthly = InventoryRequest::new(
///     Frequency::Monthly,
///     RequiredData::YearRange { start: 1991, end: 2020 },
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventoryRequest {
    frequency: Frequency,
    required_data: RequiredData,
}

impl InventoryRequest {
    pub fn new(frequency: Frequency, required_data: RequiredData) -> Self {
        Self {
            frequency,
            required_data,
        }
    }
}

/// Pairs optional range bounds: both or neither, start not after end.
pub(crate) fn month_range(
    start: Option<Month>,
    end: Option<Month>,
) -> Result<Option<(Month, Month)>, KoppenError> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) if start > end => {
            Err(KoppenError::ReversedMonthRange { start, end })
        }
        (Some(start), Some(end)) => Ok(Some((start, end))),
        _ => Err(KoppenError::IncompleteMonthRange),
    }
}

/// Client for Köppen classification backed by Meteostat bulk data.
///
/// Station metadata and downloaded data sets are cached on disk, so only the
/// first request for a station hits the network.
///
/// # Examples
///
/// ```no_run
/// # use koppen::{Koppen, KoppenError, LatLon};
/// # #[tokio::main]
/// # async fn main() -> Result<(), KoppenError> {
/// let client = Koppen::new().await?;
/// let classification = client
///     .classify()
///     .location(LatLon(52.3676, 4.9041))
///     .name("Amsterdam")
///     .call()
///     .await?;
/// println!("{} is {}", classification.station.display_name(), classification.result);
/// # Ok(())
/// # }
/// ```
pub struct Koppen {
    loader: WeatherDataLoader,
    station_locator: StationLocator,
}

#[bon]
impl Koppen {
    /// Creates a client that caches station metadata and data sets in
    /// `cache_folder`, creating the folder if needed.
    ///
    /// # Errors
    ///
    /// Returns [`KoppenError::CacheDirCreation`] if the folder cannot be
    /// created, or a [`KoppenError::LocateStation`] variant if the station
    /// list cannot be loaded or downloaded.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, KoppenError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| KoppenError::CacheDirCreation(cache_folder.clone(), e))?;
        let station_locator = StationLocator::new(&cache_folder).await?;
        info!(
            "Koppen client ready with {} stations, cache at {}",
            station_locator.len(),
            cache_folder.display()
        );
        Ok(Self::from_parts(&cache_folder, station_locator))
    }

    /// Creates a client using the default cache folder
    /// (`<system cache dir>/koppen_rs_cache`).
    pub async fn new() -> Result<Self, KoppenError> {
        let cache_folder = get_cache_dir().map_err(KoppenError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder).await
    }

    pub(crate) fn from_parts(cache_folder: &Path, station_locator: StationLocator) -> Self {
        Self {
            loader: WeatherDataLoader::new(cache_folder),
            station_locator,
        }
    }

    /// Climate normals by station id or nearest location.
    pub fn normals(&self) -> NormalsClient<'_> {
        NormalsClient::new(self)
    }

    /// Normals computed from monthly observations over a custom range.
    pub fn monthly_normals(&self) -> MonthlyNormalsClient<'_> {
        MonthlyNormalsClient::new(self)
    }

    /// Köppen classification by station id or nearest location.
    pub fn classify(&self) -> ClassifyClient<'_> {
        ClassifyClient::new(self)
    }

    /// Finds stations near `location`, closest first.
    ///
    /// * `.max_distance_km(f64)`: search radius, defaults to `50.0`.
    /// * `.station_limit(usize)`: maximum number of stations, defaults to `5`.
    /// * `.inventory_request(InventoryRequest)`: only keep stations reporting this data.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use koppen::{Frequency, InventoryRequest, Koppen, KoppenError, LatLon, RequiredData};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), KoppenError> {
    /// let client = Koppen::new().await?;
    /// let stations = client
    ///     .find_stations()
    ///     .location(LatLon(52.52, 13.40))
    ///     .inventory_request(InventoryRequest::new(Frequency::Normals, RequiredData::Any))
    ///     .call()
    ///     .await?;
    /// assert!(stations.len() <= 5);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn find_stations(
        &self,
        location: LatLon,
        inventory_request: Option<InventoryRequest>,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
    ) -> Result<Vec<Station>, KoppenError> {
        let max_distance_km = max_distance_km.unwrap_or(50.0);
        let station_limit = station_limit.unwrap_or(5);

        let (frequency, required_data) = inventory_request
            .map(|req| (Some(req.frequency), Some(req.required_data)))
            .unwrap_or((None, None));

        Ok(self
            .station_locator
            .query(
                location.0,
                location.1,
                station_limit,
                max_distance_km,
                frequency,
                required_data,
            )
            .into_iter()
            .map(|(station, _distance)| station)
            .collect())
    }

    /// Raw Meteostat data for a station as a polars `LazyFrame`.
    ///
    /// Columns are named after the bulk CSV schema of `frequency`.
    #[builder]
    pub async fn data_from_station(
        &self,
        station: &str,
        frequency: Frequency,
    ) -> Result<LazyFrame, KoppenError> {
        self.loader
            .get_frame(frequency, station)
            .await
            .map_err(KoppenError::from)
    }

    pub(crate) fn stations_within(
        &self,
        south_west: LatLon,
        north_east: LatLon,
        limit: usize,
    ) -> Vec<Station> {
        self.station_locator
            .within_bounds(south_west, north_east, limit)
    }

    /// Walks the stations near `location` that report `frequency`, closest
    /// first, and returns the first one for which `extract` yields a value.
    ///
    /// A station is skipped when its download fails or `extract` returns
    /// `None` or an error.
    pub(crate) async fn first_station_with<T>(
        &self,
        location: LatLon,
        frequency: Frequency,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
        required_data: Option<RequiredData>,
        extract: impl Fn(LazyFrame) -> Result<Option<T>, KoppenError>,
    ) -> Result<(Station, f64, T), KoppenError> {
        let max_distance_km = max_distance_km.unwrap_or(DEFAULT_MAX_DISTANCE_KM);
        let station_limit = station_limit.unwrap_or(DEFAULT_STATION_LIMIT);

        let stations = self.station_locator.query(
            location.0,
            location.1,
            station_limit,
            max_distance_km,
            Some(frequency),
            required_data,
        );

        if stations.is_empty() {
            return Err(KoppenError::NoStationWithinRadius {
                radius: max_distance_km,
                lat: location.0,
                lon: location.1,
            });
        }

        let mut last_error: Option<KoppenError> = None;

        for (station, distance_km) in stations.iter() {
            let extracted = match self.loader.get_frame(frequency, &station.id).await {
                Ok(frame) => extract(frame),
                Err(e) => Err(KoppenError::from(e)),
            };
            match extracted {
                Ok(Some(value)) => {
                    debug!(
                        "Using station {} ({:.1} km away) for {} data",
                        station.id, distance_km, frequency
                    );
                    return Ok((station.clone(), *distance_km, value));
                }
                Ok(None) => {
                    debug!("Station {} has no usable {} rows", station.id, frequency);
                }
                Err(e) => {
                    debug!("Skipping station {}: {}", station.id, e);
                    last_error = Some(e);
                }
            }
        }

        Err(KoppenError::NoDataFoundForNearbyStations {
            radius: max_distance_km,
            lat: location.0,
            lon: location.1,
            stations_tried: stations.len(),
            last_error: last_error.map(Box::new),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::types::station::tests::station;
    use crate::weather_data::normals::latest_normals;

    #[tokio::test]
    async fn finds_closest_stations_first() -> Result<(), KoppenError> {
        let dir = tempfile::tempdir().unwrap();
        let client = seeded_client(
            dir.path(),
            vec![
                station("far", 52.9, 13.4),
                station("near", 52.55, 13.4),
                station("away", 40.0, 3.0),
            ],
            vec![],
        )
        .await;

        let stations = client
            .find_stations()
            .location(LatLon(52.52, 13.40))
            .call()
            .await?;
        let ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["near", "far"]);

        let limited = client
            .find_stations()
            .location(LatLon(52.52, 13.40))
            .station_limit(1)
            .inventory_request(InventoryRequest::new(Frequency::Normals, RequiredData::Any))
            .call()
            .await?;
        assert_eq!(limited.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn skips_stations_without_rows() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = seeded_client(
            dir.path(),
            vec![station("empty", 52.52, 13.41), station("full", 52.6, 13.4)],
            vec![
                (Frequency::Normals, "empty", empty_normals_df()?),
                (
                    Frequency::Normals,
                    "full",
                    normals_df(1991, 2020, CONTINENTAL_TEMPS, 50.0)?,
                ),
            ],
        )
        .await;

        let (station, distance_km, period) = client
            .first_station_with(
                LatLon(52.52, 13.40),
                Frequency::Normals,
                None,
                None,
                None,
                |frame| Ok(latest_normals(frame)?),
            )
            .await?;
        assert_eq!(station.id, "full");
        assert!(distance_km > 5.0 && distance_km < 15.0);
        assert_eq!(period.end_year, 2020);
        Ok(())
    }

    #[tokio::test]
    async fn reports_when_no_station_is_near() {
        let dir = tempfile::tempdir().unwrap();
        let client = seeded_client(dir.path(), vec![station("away", 40.0, 3.0)], vec![]).await;

        let result = client
            .first_station_with(
                LatLon(52.52, 13.40),
                Frequency::Normals,
                Some(25.0),
                None,
                None,
                |frame| Ok(latest_normals(frame)?),
            )
            .await;
        assert!(matches!(
            result,
            Err(KoppenError::NoStationWithinRadius { radius, .. }) if radius == 25.0
        ));
    }

    #[tokio::test]
    async fn reports_when_every_station_is_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = seeded_client(
            dir.path(),
            vec![station("empty", 52.52, 13.41)],
            vec![(Frequency::Normals, "empty", empty_normals_df()?)],
        )
        .await;

        let result = client
            .first_station_with(
                LatLon(52.52, 13.40),
                Frequency::Normals,
                None,
                None,
                None,
                |frame| Ok(latest_normals(frame)?),
            )
            .await;
        assert!(matches!(
            result,
            Err(KoppenError::NoDataFoundForNearbyStations {
                stations_tried: 1,
                last_error: None,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn month_range_needs_both_ends_in_order() {
        let jan = Month::new(1, 2001);
        let dec = Month::new(12, 2020);
        assert!(matches!(month_range(None, None), Ok(None)));
        assert!(matches!(month_range(Some(jan), Some(dec)), Ok(Some((s, e))) if s == jan && e == dec));
        assert!(matches!(
            month_range(Some(jan), None),
            Err(KoppenError::IncompleteMonthRange)
        ));
        assert!(matches!(
            month_range(Some(dec), Some(jan)),
            Err(KoppenError::ReversedMonthRange { .. })
        ));
    }

    #[tokio::test]
    #[ignore = "downloads the Meteostat station list"]
    async fn default_client_loads_stations() -> Result<(), KoppenError> {
        let client = Koppen::new().await?;
        let stations = client
            .find_stations()
            .location(LatLon(52.52, 13.40))
            .call()
            .await?;
        assert!(!stations.is_empty());
        Ok(())
    }
}
