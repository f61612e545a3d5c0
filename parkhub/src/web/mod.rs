//! View layer: HTTP request handling, form models, and flash plumbing.
//!
//! - **[`handlers`]**: Axum route handlers for all pages and mutations
//! - **[`models`]**: Form structures and the authenticated identity
//! - **[`flash`]**: One-shot flash messages carried across a redirect

pub mod flash;
pub mod handlers;
pub mod models;
