pub mod classify_client;
pub mod monthly_normals_client;
pub mod normals_client;
pub mod rain_hours_client;
pub mod region_client;
