//! Validation of raw monthly normals into a record the classifier can work on.

use crate::classifier::error::IncompleteDataError;
use crate::types::monthly_normal::MonthlyNormal;

/// Twelve validated months, January first.
///
/// Values are stored column-wise so the rules can aggregate over them
/// directly. A `ClimateRecord` can only be built through
/// [`ClimateRecord::try_from_normals`], which guarantees every month has an
/// average temperature and a precipitation total.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateRecord {
    pub(crate) avg_temp: [f64; 12],
    pub(crate) precipitation: [f64; 12],
}

impl ClimateRecord {
    /// Validates `normals` and orders them by month.
    ///
    /// Rows may arrive in any order. NaN values count as missing.
    ///
    /// # Errors
    ///
    /// Returns an [`IncompleteDataError`] describing the first problem found:
    /// out-of-range or duplicate month numbers, a missing month, a missing
    /// temperature or precipitation value. Any input that is not exactly one
    /// row per month fails one of these checks.
    ///
    /// # Examples
    ///
    /// ```
    /// use koppen::{ClimateRecord, IncompleteDataError, MonthlyNormal};
    ///
    /// let mut normals: Vec<_> = (1..=12).map(|m| MonthlyNormal::new(m, 25.0, 100.0)).collect();
    /// assert!(ClimateRecord::try_from_normals(&normals).is_ok());
    ///
    /// normals.remove(6);
    /// assert_eq!(
    ///     ClimateRecord::try_from_normals(&normals),
    ///     Err(IncompleteDataError::MissingMonth(7))
    /// );
    /// ```
    pub fn try_from_normals(normals: &[MonthlyNormal]) -> Result<Self, IncompleteDataError> {
        let mut slots: [Option<&MonthlyNormal>; 12] = [None; 12];

        for normal in normals {
            if !(1..=12).contains(&normal.month) {
                return Err(IncompleteDataError::InvalidMonth(normal.month));
            }
            let slot = &mut slots[normal.month as usize - 1];
            if slot.is_some() {
                return Err(IncompleteDataError::DuplicateMonth(normal.month));
            }
            *slot = Some(normal);
        }

        let mut avg_temp = [0.0; 12];
        let mut precipitation = [0.0; 12];
        for (i, slot) in slots.iter().enumerate() {
            let month = i as u32 + 1;
            let normal = slot.ok_or(IncompleteDataError::MissingMonth(month))?;
            avg_temp[i] = finite(normal.avg_temp)
                .ok_or(IncompleteDataError::MissingTemperature(month))?;
            precipitation[i] = finite(normal.precipitation)
                .ok_or(IncompleteDataError::MissingPrecipitation(month))?;
        }

        Ok(Self {
            avg_temp,
            precipitation,
        })
    }

    /// Average temperature for `month` (1-12).
    pub fn avg_temp(&self, month: u32) -> Option<f64> {
        self.avg_temp.get(month.checked_sub(1)? as usize).copied()
    }

    /// Precipitation total for `month` (1-12).
    pub fn precipitation(&self, month: u32) -> Option<f64> {
        self.precipitation
            .get(month.checked_sub(1)? as usize)
            .copied()
    }
}

impl TryFrom<&[MonthlyNormal]> for ClimateRecord {
    type Error = IncompleteDataError;

    fn try_from(normals: &[MonthlyNormal]) -> Result<Self, Self::Error> {
        Self::try_from_normals(normals)
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
