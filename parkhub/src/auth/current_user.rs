//! Session gate: extracts the authenticated identity from the request.
//!
//! Every protected route takes [`CurrentUser`] as an argument, so the
//! identity is threaded through handler calls explicitly instead of read
//! from ambient state. Rejection is [`Error::Unauthenticated`], which the
//! error's response impl turns into a redirect to the login form.

use crate::{
    auth::session,
    config::Config,
    errors::{Error, Result},
    web::models::CurrentUser,
    AppState,
};
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header::COOKIE, request::Parts},
};
use tracing::{debug, trace};

/// Scan the Cookie header for a session cookie holding a valid token.
///
/// Anything that fails to verify is treated the same as no session at all;
/// expired tokens are routine, not errors worth surfacing.
fn session_from_cookies(parts: &Parts, config: &Config) -> Option<CurrentUser> {
    let header = parts.headers.get(COOKIE)?.to_str().ok()?;

    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == config.auth.session.cookie_name)
        .find_map(|(_, token)| session::verify_session(token, config).ok())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match session_from_cookies(parts, &state.config) {
            Some(user) => {
                debug!(user_id = user.id, "Session authenticated");
                Ok(user)
            }
            None => {
                trace!("No valid session in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

/// Optional form of the gate, for pages that render for both anonymous and
/// logged-in visitors.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>> {
        Ok(session_from_cookies(parts, &state.config))
    }
}
