//! Database record structures matching the table schemas.

pub mod cars;
pub mod parking_centers;
pub mod users;
