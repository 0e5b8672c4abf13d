//! Meteostat station metadata as found in the `stations/lite.json.gz` dump,
//! plus the `rstar` glue used for spatial lookups.

use crate::types::frequency::{Frequency, RequiredData};
use chrono::{Datelike, NaiveDate};
use rstar::{PointDistance, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A Meteostat weather station.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Meteostat station identifier (e.g. "10637").
    pub id: String,
    /// ISO country code.
    pub country: String,
    pub region: Option<String>,
    pub timezone: Option<String>,
    /// Station names keyed by language code.
    pub name: HashMap<String, String>,
    pub identifiers: Identifiers,
    pub location: Location,
    pub inventory: Inventory,
}

/// Reported availability of the data sets this crate reads.
///
/// Other inventory entries in the dump (daily, model) are ignored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Inventory {
    pub hourly: DateRange,
    pub monthly: YearRange,
    pub normals: YearRange,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct YearRange {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Identifiers {
    pub national: Option<String>,
    /// World Meteorological Organization identifier.
    pub wmo: Option<String>,
    pub icao: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level.
    pub elevation: Option<i32>,
}

impl Station {
    /// English name if present, otherwise any listed name, otherwise the id.
    pub fn display_name(&self) -> &str {
        self.name
            .get("en")
            .or_else(|| self.name.values().next())
            .map(String::as_str)
            .unwrap_or(&self.id)
    }

    /// Whether the inventory reports `frequency` data satisfying `required`.
    pub fn has_inventory(&self, frequency: Frequency, required: &RequiredData) -> bool {
        match frequency {
            Frequency::Hourly => self.inventory.hourly.covers(required),
            Frequency::Monthly => self.inventory.monthly.covers(required),
            Frequency::Normals => self.inventory.normals.covers(required),
        }
    }
}

impl DateRange {
    fn covers(&self, required: &RequiredData) -> bool {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return false;
        };
        match *required {
            RequiredData::Any => true,
            RequiredData::Year(year) => {
                let (Some(first), Some(last)) = (
                    NaiveDate::from_ymd_opt(year, 1, 1),
                    NaiveDate::from_ymd_opt(year, 12, 31),
                ) else {
                    return false;
                };
                start <= first && last <= end
            }
            RequiredData::YearRange {
                start: first_year,
                end: last_year,
            } => start.year() <= first_year && last_year <= end.year(),
            RequiredData::DateRange {
                start: first,
                end: last,
            } => start <= first && last <= end,
        }
    }
}

impl YearRange {
    fn covers(&self, required: &RequiredData) -> bool {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return false;
        };
        match *required {
            RequiredData::Any => true,
            RequiredData::Year(year) => start <= year && year <= end,
            RequiredData::YearRange {
                start: first,
                end: last,
            } => start <= first && last <= end,
            RequiredData::DateRange {
                start: first,
                end: last,
            } => start <= first.year() && last.year() <= end,
        }
    }
}

impl RTreeObject for Station {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.latitude, self.location.longitude])
    }
}

/// Squared planar distance in degrees. Only used to order R-tree candidates;
/// real distances are computed with haversine afterwards.
impl PointDistance for Station {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.location.latitude - point[0];
        let dy = self.location.longitude - point[1];
        dx * dx + dy * dy
    }
}
