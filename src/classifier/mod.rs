pub mod error;
pub mod record;
pub mod result;
pub mod rules;

use crate::classifier::error::IncompleteDataError;
use crate::classifier::record::ClimateRecord;
use crate::classifier::result::ClassificationResult;
use crate::types::monthly_normal::MonthlyNormal;

/// Validates twelve months of normals and classifies them.
///
/// This is a pure function and may be called from any number of threads at
/// once. Use [`ClimateRecord::classify`] directly when the record has already
/// been validated.
///
/// # Errors
///
/// Returns [`IncompleteDataError`] unless `normals` holds exactly one row per
/// month with both an average temperature and a precipitation total.
///
/// # Examples
///
/// ```
/// use koppen::{classify, IncompleteDataError, MonthlyNormal, DEFAULT_ISOTHERM};
///
/// let frozen: Vec<_> = (1..=12).map(|m| MonthlyNormal::new(m, -10.0, 15.0)).collect();
/// assert_eq!(classify(&frozen, DEFAULT_ISOTHERM)?.koppen_code, "EF");
///
/// let half_year = &frozen[..6];
/// assert_eq!(
///     classify(half_year, DEFAULT_ISOTHERM),
///     Err(IncompleteDataError::MissingMonth(7))
/// );
/// # Ok::<(), IncompleteDataError>(())
/// ```
pub fn classify(
    normals: &[MonthlyNormal],
    isotherm: f64,
) -> Result<ClassificationResult, IncompleteDataError> {
    Ok(ClimateRecord::try_from_normals(normals)?.classify(isotherm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::rules::DEFAULT_ISOTHERM;

    #[test]
    fn missing_precipitation_fails_before_classifying() {
        let mut normals: Vec<_> = (1..=12).map(|m| MonthlyNormal::new(m, 12.0, 50.0)).collect();
        normals[8].precipitation = None;
        assert_eq!(
            classify(&normals, DEFAULT_ISOTHERM),
            Err(IncompleteDataError::MissingPrecipitation(9))
        );
    }

    #[test]
    fn extra_columns_do_not_affect_the_code() {
        let plain: Vec<_> = (1..=12).map(|m| MonthlyNormal::new(m, 25.0, 100.0)).collect();
        let rich: Vec<_> = plain
            .iter()
            .cloned()
            .map(|n| MonthlyNormal {
                min_temp: Some(20.0),
                max_temp: Some(30.0),
                sunshine_hours: Some(180.0),
                ..n
            })
            .collect();
        assert_eq!(
            classify(&plain, DEFAULT_ISOTHERM),
            classify(&rich, DEFAULT_ISOTHERM)
        );
    }

    #[test]
    fn classify_can_run_across_threads() {
        let normals: Vec<_> = (1..=12).map(|m| MonthlyNormal::new(m, 25.0, 100.0)).collect();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let normals = normals.clone();
                std::thread::spawn(move || classify(&normals, DEFAULT_ISOTHERM))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap().koppen_code, "Af");
        }
    }
}
