use thiserror::Error;

/// Reasons a set of monthly normals cannot be classified.
///
/// Classification needs exactly one row per calendar month, each with an
/// average temperature and a precipitation total.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncompleteDataError {
    #[error("Month number {0} is outside 1..=12")]
    InvalidMonth(u32),

    #[error("Month {0} appears more than once")]
    DuplicateMonth(u32),

    #[error("Month {0} is missing")]
    MissingMonth(u32),

    #[error("Average temperature is missing for month {0}")]
    MissingTemperature(u32),

    #[error("Precipitation is missing for month {0}")]
    MissingPrecipitation(u32),
}
