//! Köppen climate classification for weather stations and locations.
//!
//! The core is the pure [`classify`] function, which turns twelve monthly
//! normals into a Köppen code. [`Koppen`] wraps it with Meteostat data:
//! it finds nearby stations, downloads and caches their normals, and
//! classifies single locations, single stations or whole regions.
//!
//! ```
//! use koppen::{classify, MonthlyNormal, DEFAULT_ISOTHERM};
//!
//! let temps = [26.0, 26.5, 27.0, 27.0, 26.5, 26.0, 25.5, 25.5, 26.0, 26.5, 26.5, 26.0];
//! let normals: Vec<_> = temps
//!     .iter()
//!     .zip(1..=12)
//!     .map(|(&t, m)| MonthlyNormal::new(m, t, 250.0))
//!     .collect();
//!
//! let result = classify(&normals, DEFAULT_ISOTHERM)?;
//! assert_eq!(result.koppen_code, "Af");
//! # Ok::<(), koppen::IncompleteDataError>(())
//! ```

mod classifier;
mod clients;
mod error;
mod koppen;
mod stations;
mod types;
mod utils;
mod weather_data;

pub use classifier::classify;
pub use classifier::error::IncompleteDataError;
pub use classifier::record::ClimateRecord;
pub use classifier::result::{ClassificationResult, ClimateGroup};
pub use classifier::rules::{CANONICAL_ISOTHERM, DEFAULT_ISOTHERM};

pub use error::KoppenError;
pub use koppen::*;

pub use clients::classify_client::*;
pub use clients::monthly_normals_client::*;
pub use clients::normals_client::*;
pub use clients::region_client::*;

pub use types::frequency::*;
pub use types::monthly_normal::MonthlyNormal;
pub use types::period::{Month, Year};
pub use types::station::*;

pub use stations::error::LocateStationError;
pub use stations::locate_station::StationLocator;
pub use weather_data::error::WeatherDataError;
pub use weather_data::normals::{latest_normals, monthly_as_normal, NormalsPeriod};
pub use weather_data::rain_hours::{summarize_rain_hours, RainHoursSummary};
