//! One-shot flash messages.
//!
//! A mutation sets a flash on its redirect response; the next rendered page
//! displays it and clears the cookie. The payload is JSON wrapped in
//! base64url so it survives cookie value restrictions.

use axum::{
    extract::FromRequestParts,
    http::{header::SET_COOKIE, request::Parts, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE_NAME: &str = "parkhub_flash";

/// Severity tag, used purely for display styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    /// Set-Cookie value carrying this flash to the next rendered page.
    pub fn to_cookie(&self) -> String {
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(serde_json::to_string(self).unwrap_or_default());
        format!("{FLASH_COOKIE_NAME}={payload}; Path=/; HttpOnly; SameSite=Lax; Max-Age=60")
    }

    /// Set-Cookie value that consumes the flash.
    pub fn clear_cookie() -> String {
        format!("{FLASH_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }

    /// Parse a flash out of a Cookie request header, if one is present.
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        for cookie in header.split(';') {
            let cookie = cookie.trim();
            if let Some((name, value)) = cookie.split_once('=') {
                if name == FLASH_COOKIE_NAME && !value.is_empty() {
                    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(value).ok()?;
                    return serde_json::from_slice(&bytes).ok();
                }
            }
        }
        None
    }
}

/// The flash carried by the incoming request, if any.
#[derive(Debug, Clone)]
pub struct IncomingFlash(pub Option<Flash>);

impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let flash = parts
            .headers
            .get(axum::http::header::COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(Flash::from_cookie_header);
        Ok(IncomingFlash(flash))
    }
}

/// Redirect to a canonical follow-up view, carrying a one-shot flash.
#[derive(Debug)]
pub struct FlashRedirect {
    location: String,
    flash: Flash,
    session_cookie: Option<String>,
}

impl FlashRedirect {
    pub fn new(location: impl Into<String>, flash: Flash) -> Self {
        Self {
            location: location.into(),
            flash,
            session_cookie: None,
        }
    }

    /// Also set (or clear) the session cookie on this response.
    pub fn with_session_cookie(mut self, cookie: String) -> Self {
        self.session_cookie = Some(cookie);
        self
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(&self.location).into_response();
        if let Ok(value) = HeaderValue::from_str(&self.flash.to_cookie()) {
            response.headers_mut().append(SET_COOKIE, value);
        }
        if let Some(cookie) = self.session_cookie {
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}
