use serde::{Deserialize, Serialize};
use std::fmt;

/// The five main Köppen groups, named after the first letter of a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimateGroup {
    /// `A`: every month averages at least 18 °C.
    Tropical,
    /// `B`: yearly precipitation below the aridity threshold.
    Arid,
    /// `C`: coldest month at or above the isotherm.
    Temperate,
    /// `D`: coldest month below the isotherm.
    Continental,
    /// `E`: warmest month below 10 °C.
    Polar,
}

impl ClimateGroup {
    pub fn letter(&self) -> char {
        match self {
            ClimateGroup::Tropical => 'A',
            ClimateGroup::Arid => 'B',
            ClimateGroup::Temperate => 'C',
            ClimateGroup::Continental => 'D',
            ClimateGroup::Polar => 'E',
        }
    }
}

/// Formats the group as its code letter.
///
/// ```
/// use koppen::ClimateGroup;
///
/// assert_eq!(ClimateGroup::Arid.to_string(), "B");
/// ```
impl fmt::Display for ClimateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Outcome of classifying twelve months of normals.
///
/// All temperatures are taken over the monthly averages, so
/// `min_monthly_temp` is the mean temperature of the coldest month, not an
/// absolute minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Two or three letter code such as `"Cfb"`, `"BWh"` or `"ET"`.
    pub koppen_code: String,
    /// Main group, always equal to the first letter of `koppen_code`.
    pub climate_group: ClimateGroup,
    pub min_monthly_temp: f64,
    pub avg_monthly_temp: f64,
    pub max_monthly_temp: f64,
    /// Yearly precipitation (mm) under which the climate counts as arid.
    pub precipitation_threshold: f64,
    pub yearly_precipitation: f64,
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.koppen_code)
    }
}
