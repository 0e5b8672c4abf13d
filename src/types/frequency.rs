//! Which Meteostat bulk data set to use, and inventory requirements used
//! when searching for stations that carry it.

use chrono::NaiveDate;
use std::fmt;

/// A Meteostat bulk data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    /// Hourly observations, used for rain-hour statistics.
    Hourly,
    /// Monthly aggregates, averaged per calendar month to build custom normals.
    Monthly,
    /// Climate normals over a reference period (e.g. 1991-2020), one row per month.
    Normals,
}

impl Frequency {
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            Frequency::Hourly => "hourly",
            Frequency::Monthly => "monthly",
            Frequency::Normals => "normals",
        }
    }

    pub(crate) fn cache_file_prefix(&self) -> String {
        format!("{}-", self.path_segment())
    }

    /// Column names of the headerless bulk CSV, in file order.
    pub(crate) fn schema_column_names(&self) -> &'static [&'static str] {
        match self {
            Frequency::Hourly => &[
                "date", "hour", "temp", "dwpt", "rhum", "prcp", "snow", "wdir", "wspd", "wpgt",
                "pres", "tsun", "coco",
            ],
            Frequency::Monthly => &[
                "year", "month", "tavg", "tmin", "tmax", "prcp", "wspd", "pres", "tsun",
            ],
            Frequency::Normals => &[
                "start_year",
                "end_year",
                "month",
                "tmin",
                "tmax",
                "prcp",
                "wspd",
                "pres",
                "tsun",
            ],
        }
    }
}

/// Formats a `Frequency` as its bulk path segment.
///
/// ```
/// use koppen::Frequency;
///
/// assert_eq!(Frequency::Normals.to_string(), "normals");
/// ```
impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// Data availability a station's inventory must report to be considered.
///
/// Inventory ranges come from station metadata and do not guarantee that
/// every row in the range exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredData {
    /// Any reported coverage at all.
    Any,
    /// Coverage of a whole calendar year.
    Year(i32),
    /// Coverage of every year in `start..=end`.
    YearRange { start: i32, end: i32 },
    /// Coverage of every day in `start..=end`.
    DateRange { start: NaiveDate, end: NaiveDate },
}
