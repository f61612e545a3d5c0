//! HTTP request handlers for all routes.
//!
//! Each handler is responsible for:
//! - Form deserialization
//! - Authentication and the ownership capability check
//! - Registry operations via the database repositories
//! - Rendering a page or redirecting with a flash
//!
//! # Handler Modules
//!
//! - [`auth`]: home page, registration, login, logout
//! - [`centers`]: dashboard plus parking center create/delete
//! - [`cars`]: a center's car list and car add/remove
//!
//! # Authentication
//!
//! Protected handlers take [`crate::web::models::CurrentUser`] as an
//! extractor argument; a missing or expired session rejects with a redirect
//! to the login form.
//!
//! # Error Handling
//!
//! Domain outcomes (duplicate username, invalid credentials, duplicate car,
//! car not in list) are recovered here and surfaced only as flash messages.
//! Handlers return [`crate::errors::Error`] for everything else.

pub mod auth;
pub mod cars;
pub mod centers;
