//! Server-rendered views.
//!
//! Templates are embedded in the binary and rendered through a shared
//! minijinja environment held in [`crate::AppState`].

use axum::{
    http::{header::SET_COOKIE, HeaderValue},
    response::{Html, IntoResponse, Response},
};
use minijinja::Environment;

use crate::errors::Error;
use crate::web::flash::Flash;

/// Build the template environment from the embedded templates.
pub fn build_environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("base.html", include_str!("../templates/base.html"))?;
    env.add_template("index.html", include_str!("../templates/index.html"))?;
    env.add_template("register.html", include_str!("../templates/register.html"))?;
    env.add_template("login.html", include_str!("../templates/login.html"))?;
    env.add_template("dashboard.html", include_str!("../templates/dashboard.html"))?;
    env.add_template("parking_center.html", include_str!("../templates/parking_center.html"))?;
    Ok(env)
}

/// Render a template into a page response.
///
/// `had_flash` records whether the incoming request carried a flash cookie;
/// once displayed it is one-shot, so the response clears it.
pub fn render(
    templates: &Environment<'static>,
    name: &str,
    ctx: minijinja::Value,
    had_flash: bool,
) -> Result<RenderedPage, Error> {
    let tmpl = templates.get_template(name).map_err(|e| Error::Internal {
        operation: format!("load template {name}: {e}"),
    })?;
    let html = tmpl.render(ctx).map_err(|e| Error::Internal {
        operation: format!("render template {name}: {e}"),
    })?;

    Ok(RenderedPage {
        html,
        clear_flash: had_flash,
    })
}

/// An HTML page, optionally clearing a consumed flash cookie.
pub struct RenderedPage {
    html: String,
    clear_flash: bool,
}

impl IntoResponse for RenderedPage {
    fn into_response(self) -> Response {
        let mut response = Html(self.html).into_response();
        if self.clear_flash {
            if let Ok(value) = HeaderValue::from_str(&Flash::clear_cookie()) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::flash::FlashLevel;
    use minijinja::context;

    #[test]
    fn test_environment_builds() {
        let env = build_environment().unwrap();
        assert!(env.get_template("dashboard.html").is_ok());
    }

    #[test]
    fn test_render_flash_and_user() {
        let env = build_environment().unwrap();
        let flash = Flash {
            level: FlashLevel::Success,
            message: "Login successful.".to_string(),
        };
        let user = crate::web::models::CurrentUser {
            id: 1,
            username: "alice".to_string(),
        };

        let page = render(&env, "index.html", context! { user, flash }, true).unwrap();
        assert!(page.html.contains("Login successful."));
        assert!(page.html.contains("flash-success"));
        assert!(page.html.contains("alice"));

        let response = page.into_response();
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_render_without_flash_sets_no_cookie() {
        let env = build_environment().unwrap();
        let page = render(&env, "index.html", context! {}, false).unwrap();
        let response = page.into_response();
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
