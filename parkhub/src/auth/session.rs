//! Session token signing and verification.
//!
//! A session is a signed, self-contained token the browser holds in an
//! HttpOnly cookie. Nothing is stored server-side: logging out clears the
//! cookie, and one account may hold independent sessions in several browsers
//! at once.

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{config::Config, errors::Error, types::UserId, web::models::CurrentUser};

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: UserId,
    pub username: String,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Issue time, seconds since the epoch
    pub iat: i64,
}

impl SessionClaims {
    fn for_user(user: &CurrentUser, config: &Config) -> Self {
        let issued = Utc::now();

        Self {
            sub: user.id,
            username: user.username.clone(),
            exp: (issued + config.auth.session.timeout).timestamp(),
            iat: issued.timestamp(),
        }
    }
}

fn signing_secret(config: &Config) -> Result<&str, Error> {
    config.secret_key.as_deref().ok_or_else(|| Error::Internal {
        operation: "sessions: secret_key is not configured".to_string(),
    })
}

/// Sign a session token for a freshly authenticated user.
pub fn sign_session(user: &CurrentUser, config: &Config) -> Result<String, Error> {
    let claims = SessionClaims::for_user(user, config);
    let key = EncodingKey::from_secret(signing_secret(config)?.as_bytes());

    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("sign session token: {e}"),
    })
}

/// Verify a token from the session cookie and recover the identity it names.
///
/// Tampered, expired, and malformed tokens all map to
/// [`Error::Unauthenticated`]; only key-level failures are internal.
pub fn verify_session(token: &str, config: &Config) -> Result<CurrentUser, Error> {
    let key = DecodingKey::from_secret(signing_secret(config)?.as_bytes());

    let data = decode::<SessionClaims>(token, &key, &Validation::default()).map_err(|e| match e.kind() {
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::ExpiredSignature
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::ImmatureSignature
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },
        _ => Error::Internal {
            operation: format!("verify session token: {e}"),
        },
    })?;

    Ok(CurrentUser {
        id: data.claims.sub,
        username: data.claims.username,
    })
}
