pub mod data_loader;
pub mod error;
pub mod normals;
pub mod rain_hours;
