//! Home page and authentication routes.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use minijinja::context;

use crate::{
    auth::{password, session},
    config::Config,
    db::{errors::DbError, handlers::Users, models::users::UserCreateDBRequest},
    errors::Error,
    views,
    web::{
        flash::{Flash, FlashRedirect, IncomingFlash},
        models::{CurrentUser, LoginForm, RegisterForm},
    },
    AppState,
};

/// Render the landing page.
#[tracing::instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    IncomingFlash(flash): IncomingFlash,
) -> Result<views::RenderedPage, Error> {
    let had_flash = flash.is_some();
    views::render(&state.templates, "index.html", context! { user, flash }, had_flash)
}

/// Render the registration form.
#[tracing::instrument(skip_all)]
pub async fn register_form(
    State(state): State<AppState>,
    IncomingFlash(flash): IncomingFlash,
) -> Result<views::RenderedPage, Error> {
    let had_flash = flash.is_some();
    views::render(&state.templates, "register.html", context! { flash }, had_flash)
}

/// Register a new account.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    IncomingFlash(incoming): IncomingFlash,
    Form(form): Form<RegisterForm>,
) -> Result<Response, Error> {
    let had_flash = incoming.is_some();

    if !state.config.auth.allow_registration {
        let flash = Flash::error("Registration is disabled.");
        return Ok(views::render(&state.templates, "register.html", context! { flash }, had_flash)?.into_response());
    }

    if form.username.is_empty() {
        let flash = Flash::error("Username is required.");
        return Ok(views::render(&state.templates, "register.html", context! { flash }, had_flash)?.into_response());
    }

    // Argon2 is deliberately slow; keep it off the async workers
    let password_input = form.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password_input))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password hashing task: {e}"),
        })??;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    let create_request = UserCreateDBRequest {
        username: form.username,
        password_hash,
    };

    match user_repo.create(&create_request).await {
        Ok(_) => Ok(FlashRedirect::new("/login", Flash::success("Registration successful. You can log in now.")).into_response()),
        Err(DbError::UniqueViolation { .. }) => {
            let flash = Flash::error("Username already exists.");
            Ok(views::render(&state.templates, "register.html", context! { flash }, had_flash)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Render the login form.
#[tracing::instrument(skip_all)]
pub async fn login_form(
    State(state): State<AppState>,
    IncomingFlash(flash): IncomingFlash,
) -> Result<views::RenderedPage, Error> {
    let had_flash = flash.is_some();
    views::render(&state.templates, "login.html", context! { flash }, had_flash)
}

/// Login with username and password.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    IncomingFlash(incoming): IncomingFlash,
    Form(form): Form<LoginForm>,
) -> Result<Response, Error> {
    let had_flash = incoming.is_some();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    // An unknown username and a wrong password fall through to the same
    // outcome, so the form does not reveal which usernames exist.
    let Some(user) = user_repo.get_by_username(&form.username).await? else {
        return invalid_credentials(&state, had_flash);
    };

    // Argon2 verification is as slow as hashing; keep it off the async workers
    let password_input = form.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password_input, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password verification task: {e}"),
        })??;

    if !is_valid {
        return invalid_credentials(&state, had_flash);
    }

    let current_user = CurrentUser::from(user);
    let token = session::sign_session(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(FlashRedirect::new("/dashboard", Flash::success("Login successful."))
        .with_session_cookie(cookie)
        .into_response())
}

/// Logout (clear session).
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> FlashRedirect {
    let cookie = clear_session_cookie(&state.config);
    FlashRedirect::new("/login", Flash::info("You have been logged out.")).with_session_cookie(cookie)
}

fn invalid_credentials(state: &AppState, had_flash: bool) -> Result<Response, Error> {
    let flash = Flash::error("Invalid credentials.");
    Ok(views::render(&state.templates, "login.html", context! { flash }, had_flash)?.into_response())
}

/// Set-Cookie value establishing the session
fn create_session_cookie(token: &str, config: &Config) -> String {
    let session_config = &config.auth.session;
    let max_age = session_config.timeout.as_secs();

    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        session_config.cookie_name, token, session_config.cookie_same_site, max_age
    );
    if session_config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Expired cookie that clears the session
fn clear_session_cookie(config: &Config) -> String {
    let session_config = &config.auth.session;
    format!(
        "{}=; Path=/; HttpOnly; SameSite={}; Max-Age=0",
        session_config.cookie_name, session_config.cookie_same_site
    )
}
