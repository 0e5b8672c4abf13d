//! The Köppen decision procedure.
//!
//! Rules are checked in a fixed order and the first match decides the main
//! group: polar, arid, tropical, then temperate or continental as fallback.
//!
//! Tropical climates with a dry season are always labelled `w`. The full
//! scheme separates `As` from `Aw` by the timing of the dry season, which is
//! not done here because the annual temperature range in the tropics is too
//! small to tell summer from winter reliably.

use crate::classifier::record::ClimateRecord;
use crate::classifier::result::{ClassificationResult, ClimateGroup};
use log::debug;

/// Coldest-month boundary between temperate and continental climates used
/// when the caller does not choose one.
pub const DEFAULT_ISOTHERM: f64 = 0.0;

/// The -3 °C boundary from Köppen's original publication.
pub const CANONICAL_ISOTHERM: f64 = -3.0;

/// April through September, as indices into a January-first record.
const NORTHERN_SUMMER: [usize; 6] = [3, 4, 5, 6, 7, 8];
/// January through March and October through December.
const NORTHERN_WINTER: [usize; 6] = [0, 1, 2, 9, 10, 11];

/// Which six months are treated as summer and which as winter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Seasons {
    pub summer: [usize; 6],
    pub winter: [usize; 6],
}

impl Seasons {
    /// Picks the warmer half-year as summer, so southern-hemisphere records
    /// need no latitude. Equal means keep April-September as summer.
    pub fn detect(avg_temp: &[f64; 12]) -> Self {
        let north_summer = mean(NORTHERN_SUMMER.iter().map(|&i| avg_temp[i]));
        let north_winter = mean(NORTHERN_WINTER.iter().map(|&i| avg_temp[i]));

        if north_summer >= north_winter {
            Self {
                summer: NORTHERN_SUMMER,
                winter: NORTHERN_WINTER,
            }
        } else {
            Self {
                summer: NORTHERN_WINTER,
                winter: NORTHERN_SUMMER,
            }
        }
    }
}

impl ClimateRecord {
    /// Classifies this record.
    ///
    /// `isotherm` is the coldest-month temperature (°C) separating `C` from
    /// `D` climates; a coldest month exactly at the isotherm is temperate.
    /// See [`DEFAULT_ISOTHERM`] and [`CANONICAL_ISOTHERM`].
    ///
    /// # Examples
    ///
    /// ```
    /// use koppen::{ClimateRecord, MonthlyNormal, DEFAULT_ISOTHERM};
    ///
    /// let normals: Vec<_> = (1..=12).map(|m| MonthlyNormal::new(m, 25.0, 100.0)).collect();
    /// let record = ClimateRecord::try_from_normals(&normals)?;
    /// let result = record.classify(DEFAULT_ISOTHERM);
    ///
    /// assert_eq!(result.koppen_code, "Af");
    /// assert_eq!(result.yearly_precipitation, 1200.0);
    /// # Ok::<(), koppen::IncompleteDataError>(())
    /// ```
    pub fn classify(&self, isotherm: f64) -> ClassificationResult {
        let min_monthly_temp = min(self.avg_temp.iter().copied());
        let max_monthly_temp = max(self.avg_temp.iter().copied());
        let avg_monthly_temp = mean(self.avg_temp.iter().copied());
        let yearly_precipitation: f64 = self.precipitation.iter().sum();

        let seasons = Seasons::detect(&self.avg_temp);
        let summer_prcp = self.season_precipitation(&seasons.summer);
        let winter_prcp = self.season_precipitation(&seasons.winter);

        let mut precipitation_threshold = 20.0 * avg_monthly_temp;
        if summer_prcp.iter().sum::<f64>() >= 0.7 * yearly_precipitation {
            precipitation_threshold += 280.0;
        } else if winter_prcp.iter().sum::<f64>() < 0.7 * yearly_precipitation {
            precipitation_threshold += 140.0;
        }

        let (climate_group, secondary, tertiary) = if max_monthly_temp < 10.0 {
            let secondary = if max_monthly_temp >= 0.0 { 'T' } else { 'F' };
            (ClimateGroup::Polar, secondary, None)
        } else if yearly_precipitation < precipitation_threshold {
            let secondary = if yearly_precipitation < precipitation_threshold / 2.0 {
                'W'
            } else {
                'S'
            };
            let tertiary = if avg_monthly_temp >= 18.0 { 'h' } else { 'k' };
            (ClimateGroup::Arid, secondary, Some(tertiary))
        } else if min_monthly_temp >= 18.0 {
            let min_monthly_prcp = min(self.precipitation.iter().copied());
            let secondary = if min_monthly_prcp >= 60.0 {
                'f'
            } else if min_monthly_prcp >= 100.0 - 0.04 * yearly_precipitation {
                'm'
            } else {
                'w'
            };
            (ClimateGroup::Tropical, secondary, None)
        } else {
            let group = if min_monthly_temp >= isotherm {
                ClimateGroup::Temperate
            } else {
                ClimateGroup::Continental
            };

            let driest_summer = min(summer_prcp.iter().copied());
            let wettest_summer = max(summer_prcp.iter().copied());
            let driest_winter = min(winter_prcp.iter().copied());
            let wettest_winter = max(winter_prcp.iter().copied());
            let dry_summer_limit = match group {
                ClimateGroup::Temperate => 40.0,
                _ => 30.0,
            };

            let secondary = if wettest_summer >= 10.0 * driest_winter {
                'w'
            } else if wettest_winter >= 3.0 * driest_summer && driest_summer < dry_summer_limit {
                's'
            } else {
                'f'
            };

            let warm_months = self.avg_temp.iter().filter(|&&t| t > 10.0).count();
            let tertiary = if warm_months >= 4 {
                if max_monthly_temp >= 22.0 {
                    'a'
                } else {
                    'b'
                }
            } else if min_monthly_temp <= -38.0 {
                'd'
            } else {
                'c'
            };
            (group, secondary, Some(tertiary))
        };

        let mut koppen_code = String::with_capacity(3);
        koppen_code.push(climate_group.letter());
        koppen_code.push(secondary);
        koppen_code.extend(tertiary);

        debug!(
            "Classified as {} (threshold {:.1} mm, yearly {:.1} mm, isotherm {} °C)",
            koppen_code, precipitation_threshold, yearly_precipitation, isotherm
        );

        ClassificationResult {
            koppen_code,
            climate_group,
            min_monthly_temp,
            avg_monthly_temp,
            max_monthly_temp,
            precipitation_threshold,
            yearly_precipitation,
        }
    }

    fn season_precipitation(&self, months: &[usize; 6]) -> [f64; 6] {
        months.map(|i| self.precipitation[i])
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    sum / count as f64
}

fn min(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::INFINITY, f64::min)
}

fn max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}
