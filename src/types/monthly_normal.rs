use serde::{Deserialize, Serialize};

/// One calendar month of climate normals, as delivered by a data source.
///
/// Every value may be missing. Temperatures are monthly means in °C,
/// precipitation is the monthly total in mm.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyNormal {
    /// Calendar month, 1 (January) through 12 (December).
    pub month: u32,
    /// Mean of the daily average temperatures.
    pub avg_temp: Option<f64>,
    /// Mean of the daily minimum temperatures.
    pub min_temp: Option<f64>,
    /// Mean of the daily maximum temperatures.
    pub max_temp: Option<f64>,
    /// Total precipitation.
    pub precipitation: Option<f64>,
    /// Total sunshine duration in hours.
    pub sunshine_hours: Option<f64>,
}

impl MonthlyNormal {
    /// A row carrying only the two values the classifier needs.
    ///
    /// ```
    /// use koppen::MonthlyNormal;
    ///
    /// let july = MonthlyNormal::new(7, 18.4, 72.0);
    /// assert_eq!(july.avg_temp, Some(18.4));
    /// assert_eq!(july.max_temp, None);
    /// ```
    pub fn new(month: u32, avg_temp: f64, precipitation: f64) -> Self {
        Self {
            month,
            avg_temp: Some(avg_temp),
            precipitation: Some(precipitation),
            ..Default::default()
        }
    }

    /// Average of the min/max means, used where a source reports no average temperature.
    pub(crate) fn midrange(min_temp: Option<f64>, max_temp: Option<f64>) -> Option<f64> {
        match (min_temp, max_temp) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            _ => None,
        }
    }
}
