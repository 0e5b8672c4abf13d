pub mod frequency;
pub mod monthly_normal;
pub mod period;
pub mod station;
