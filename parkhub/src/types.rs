//! Common type definitions and the capability check.
//!
//! Entity IDs are sqlite rowids wrapped in type aliases:
//!
//! - [`UserId`]: user account identifier
//! - [`ParkingCenterId`]: parking center identifier
//! - [`CarId`]: car record identifier
//!
//! The capability check [`authorize`] is the single place ownership is
//! decided. Every route that reads or mutates the contents of a parking
//! center goes through it with the center row it loaded, rather than
//! performing its own ad hoc owner comparison.

use std::fmt;

use crate::db::models::parking_centers::ParkingCenterDBResponse;
use crate::errors::{Error, Result};
use crate::web::models::CurrentUser;

// Type aliases for IDs
pub type UserId = i64;
pub type ParkingCenterId = i64;
pub type CarId = i64;

// Operations that can be performed on resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Create,
    Delete,
}

// Resources that can be operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    ParkingCenters,
    Cars,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Create => write!(f, "create"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::ParkingCenters => write!(f, "parking centers"),
            Resource::Cars => write!(f, "cars"),
        }
    }
}

/// Check whether `user` may perform `action` on the contents of `center`.
///
/// Only the owner of a parking center may view or modify it.
pub fn authorize(user: &CurrentUser, center: &ParkingCenterDBResponse, action: Operation, resource: Resource) -> Result<()> {
    if center.user_id == user.id {
        Ok(())
    } else {
        Err(Error::InsufficientPermissions { action, resource })
    }
}
