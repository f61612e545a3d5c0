//! Persistence layer: sqlx over sqlite.
//!
//! Access goes through one repository struct per table ([`handlers`]), each
//! borrowing a pool connection for its lifetime and returning the record
//! structs in [`models`]. Constraint violations surface as the typed variants
//! in [`errors`] rather than as caught driver faults.
//!
//! ```ignore
//! let mut conn = pool.acquire().await?;
//! let mut users = Users::new(&mut conn);
//! if let Some(user) = users.get_by_username("alice").await? {
//!     println!("found {}", user.username);
//! }
//! ```
//!
//! Every operation is a single statement, so each runs as its own implicit
//! transaction. Schema migrations live in `migrations/` and are applied on
//! startup via [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
