use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Year(pub i32);

impl Year {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl Display for Year {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// A calendar month of a specific year. Orders chronologically.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Month(pub i32, pub u32);

impl Month {
    pub fn new(month: u32, year: i32) -> Self {
        Self(year, month)
    }

    pub fn year(self) -> i32 {
        self.0
    }

    pub fn month(self) -> u32 {
        self.1
    }

    /// Months since year 0, so ranges can be compared with a single number.
    pub(crate) fn ordinal(self) -> i64 {
        self.0 as i64 * 12 + (self.1 as i64 - 1)
    }
}

/// ```
/// use koppen::Month;
///
/// assert_eq!(Month::new(3, 2024).to_string(), "2024-03");
/// ```
impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_follows_calendar_order() {
        assert!(Month::new(12, 2022).ordinal() < Month::new(1, 2023).ordinal());
        assert_eq!(
            Month::new(1, 2023).ordinal() - Month::new(12, 2022).ordinal(),
            1
        );
        assert!(Month::new(12, 2022) < Month::new(1, 2023));
    }
}
