use crate::classifier::error::IncompleteDataError;
use crate::stations::error::LocateStationError;
use crate::types::period::Month;
use crate::weather_data::error::WeatherDataError;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KoppenError {
    #[error(transparent)]
    WeatherData(#[from] WeatherDataError),

    #[error(transparent)]
    LocateStation(#[from] LocateStationError),

    #[error(transparent)]
    IncompleteData(#[from] IncompleteDataError),

    #[error("Failed processing weather data frame")]
    Polars(#[from] PolarsError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),

    #[error("No station within {radius} km of ({lat}, {lon}) reports the requested data")]
    NoStationWithinRadius { radius: f64, lat: f64, lon: f64 },

    #[error("None of the {stations_tried} stations within {radius} km of ({lat}, {lon}) returned usable data")]
    NoDataFoundForNearbyStations {
        radius: f64,
        lat: f64,
        lon: f64,
        stations_tried: usize,
        #[source]
        last_error: Option<Box<KoppenError>>,
    },

    #[error("Station {station} has no climate normals")]
    NoNormals { station: String },

    #[error("Station {station} has no monthly data between {start} and {end}")]
    NoMonthlyData {
        station: String,
        start: Month,
        end: Month,
    },

    #[error("A month range needs both a start and an end")]
    IncompleteMonthRange,

    #[error("Month range starts at {start}, after its end {end}")]
    ReversedMonthRange { start: Month, end: Month },
}
