//! Repository implementations for table operations.
//!
//! - [`users`]: credential store (create, lookup by username)
//! - [`parking_centers`]: owner-scoped center registry
//! - [`cars`]: per-center car registry with a system-wide plate constraint

pub mod cars;
pub mod parking_centers;
pub mod users;

pub use cars::Cars;
pub use parking_centers::ParkingCenters;
pub use users::Users;
