//! # Parkhub
//!
//! A small multi-user web application for tracking named parking centers,
//! each holding a set of car records identified by license-plate number.
//!
//! The application provides account registration and login, a per-user
//! dashboard of owned parking centers, and add/remove operations on the cars
//! within a center. Pages are rendered server-side; mutations redirect to a
//! follow-up view carrying a one-shot flash message.
//!
//! ## Architecture
//!
//! - [`config`]: layered configuration (YAML file + environment)
//! - [`telemetry`]: tracing initialization
//! - [`auth`]: password hashing, session tokens, and the session gate
//! - [`db`]: sqlite persistence behind per-table repositories
//! - [`web`]: route handlers, form models, flash plumbing
//! - [`views`]: embedded minijinja templates
//!
//! ## Usage
//!
//! [`Application::new`] opens the sqlite database (creating the file if
//! absent), applies migrations, and assembles the router; [`Application::serve`]
//! binds the listener and runs until the shutdown future resolves:
//!
//! ```no_run
//! use parkhub::{Application, Config, config::Args};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(&Args::parse())?;
//!     parkhub::telemetry::init_telemetry()?;
//!
//!     Application::new(config)
//!         .await?
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await
//! }
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod telemetry;
pub mod types;
pub mod views;
pub mod web;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use bon::Builder;
pub use config::Config;
use minijinja::Environment;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{debug, info, instrument, Level};

pub use types::{CarId, ParkingCenterId, UserId};

/// State shared by every request handler: the connection pool, the loaded
/// configuration, and the template environment.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub templates: Arc<Environment<'static>>,
}

/// Migrator over the embedded schema migrations
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the sqlite database, creating the file if absent, and run migrations.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(&config.database.path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    migrator().run(&pool).await?;

    info!("Database ready at {}", config.database.path.display());

    Ok(pool)
}

/// Build the application router with all routes and middleware.
///
/// Public home/register/login routes, a session-gated dashboard and center
/// views, and POST mutations that redirect with a flash.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> Router {
    Router::new()
        .route("/", get(web::handlers::auth::home))
        .route(
            "/register",
            get(web::handlers::auth::register_form).post(web::handlers::auth::register),
        )
        .route("/login", get(web::handlers::auth::login_form).post(web::handlers::auth::login))
        .route("/logout", get(web::handlers::auth::logout))
        .route("/dashboard", get(web::handlers::centers::dashboard))
        .route("/create_parking_center", post(web::handlers::centers::create_parking_center))
        .route(
            "/delete_parking_center/{id}",
            post(web::handlers::centers::delete_parking_center),
        )
        .route("/parking_center/{id}", get(web::handlers::cars::view_parking_center))
        .route("/manage_car/{id}", post(web::handlers::cars::manage_car))
        .route("/healthz", get(|| async { "OK" }))
        .with_state(state.clone())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// The assembled application: router, configuration, and database pool.
///
/// Built with [`Application::new`], run with [`Application::serve`]. When the
/// shutdown future resolves the server drains in-flight requests and closes
/// its database connections.
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Open the database, apply migrations, and assemble the router.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Same, over an existing pool (tests inject per-test databases here).
    pub async fn new_with_pool(config: Config, pool: Option<SqlitePool>) -> anyhow::Result<Self> {
        debug!("Starting parkhub with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => {
                migrator().run(&pool).await?;
                pool
            }
            None => setup_database(&config).await?,
        };

        let templates = views::build_environment()?;

        let state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .templates(Arc::new(templates))
            .build();

        let router = build_router(&state);

        Ok(Self { router, config, pool })
    }

    /// Wrap the router in an in-process test server with a cookie jar.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> axum_test::TestServer {
        let config = axum_test::TestServerConfig::builder().save_cookies().build();
        axum_test::TestServer::new_with_config(self.router, config).expect("Failed to create test server")
    }

    /// Bind the listener and handle requests until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Parkhub listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server drained, closing database connections");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::db::handlers::{Cars, ParkingCenters, Users};
    use crate::test_utils::{create_test_app, create_test_app_with_config, create_test_center, create_test_config, create_test_user, login};
    use axum::http::StatusCode;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn test_healthz(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[sqlx::test]
    async fn test_home_renders_for_anonymous_visitors(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_text_contains("Parkhub");
        response.assert_text_contains("Register");
    }

    #[sqlx::test]
    async fn test_protected_routes_redirect_to_login(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server.get("/dashboard").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), "/login");

        let response = server.get("/parking_center/1").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), "/login");

        let response = server
            .post("/create_parking_center")
            .form(&[("center_name", "Garage")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), "/login");

        let response = server
            .post("/manage_car/1")
            .form(&[("car_number", "ABC123"), ("action", "add")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), "/login");
    }

    #[sqlx::test]
    async fn test_register_login_and_manage_cars_end_to_end(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;

        // Register
        let response = server
            .post("/register")
            .form(&[("username", "alice"), ("password", "pw1")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), "/login");

        // The flash shows once, then is consumed
        let response = server.get("/login").await;
        response.assert_status_ok();
        response.assert_text_contains("Registration successful. You can log in now.");
        let response = server.get("/login").await;
        assert!(!response.text().contains("Registration successful"));

        // Login establishes the session
        login(&server, "alice", "pw1").await;
        let response = server.get("/dashboard").await;
        response.assert_status_ok();
        response.assert_text_contains("Login successful.");

        // Create a parking center
        let response = server
            .post("/create_parking_center")
            .form(&[("center_name", "Garage A")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        let response = server.get("/dashboard").await;
        response.assert_text_contains("Garage A");
        response.assert_text_contains("Parking center created.");

        let center_id = {
            let mut conn = pool.acquire().await.unwrap();
            let mut users = Users::new(&mut conn);
            let alice = users.get_by_username("alice").await.unwrap().unwrap();
            let mut centers = ParkingCenters::new(&mut conn);
            centers.list_for_owner(alice.id).await.unwrap()[0].id
        };

        // Add a car
        let response = server
            .post(&format!("/manage_car/{center_id}"))
            .form(&[("car_number", "XYZ999"), ("action", "add")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.header("location").to_str().unwrap(),
            format!("/parking_center/{center_id}")
        );

        let response = server.get(&format!("/parking_center/{center_id}")).await;
        response.assert_status_ok();
        response.assert_text_contains("Car XYZ999 added successfully.");
        response.assert_text_contains("XYZ999");

        // Remove it again
        let response = server
            .post(&format!("/manage_car/{center_id}"))
            .form(&[("car_number", "XYZ999"), ("action", "remove")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);

        let response = server.get(&format!("/parking_center/{center_id}")).await;
        response.assert_text_contains("Car XYZ999 removed successfully.");
        response.assert_text_contains("No cars are parked here.");

        // With the flash consumed, the plate is gone from the page entirely
        let response = server.get(&format!("/parking_center/{center_id}")).await;
        assert!(!response.text().contains("XYZ999"));
    }

    #[sqlx::test]
    async fn test_duplicate_registration_keeps_first_account(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;

        let response = server
            .post("/register")
            .form(&[("username", "alice"), ("password", "pw1")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);

        // Second attempt re-renders the form with the duplicate flash
        let response = server
            .post("/register")
            .form(&[("username", "alice"), ("password", "other")])
            .await;
        response.assert_status_ok();
        response.assert_text_contains("Username already exists.");

        // The original credentials still work
        login(&server, "alice", "pw1").await;
    }

    #[sqlx::test]
    async fn test_empty_username_is_rejected(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server.post("/register").form(&[("username", ""), ("password", "pw1")]).await;
        response.assert_status_ok();
        response.assert_text_contains("Username is required.");
    }

    #[sqlx::test]
    async fn test_registration_can_be_disabled(pool: SqlitePool) {
        let mut config = create_test_config();
        config.auth.allow_registration = false;
        let server = create_test_app_with_config(pool, config).await;

        let response = server
            .post("/register")
            .form(&[("username", "alice"), ("password", "pw1")])
            .await;
        response.assert_status_ok();
        response.assert_text_contains("Registration is disabled.");
    }

    #[sqlx::test]
    async fn test_invalid_credentials_outcome_is_uniform(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        create_test_user(&pool, "alice", "pw1").await;

        // Wrong password for an existing username
        let response = server
            .post("/login")
            .form(&[("username", "alice"), ("password", "wrong")])
            .await;
        response.assert_status_ok();
        response.assert_text_contains("Invalid credentials.");

        // Nonexistent username produces the identical outcome
        let response = server
            .post("/login")
            .form(&[("username", "ghost"), ("password", "pw1")])
            .await;
        response.assert_status_ok();
        response.assert_text_contains("Invalid credentials.");
    }

    #[sqlx::test]
    async fn test_dashboard_lists_only_own_centers(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        let alice = create_test_user(&pool, "alice", "pw1").await;
        create_test_user(&pool, "bob", "pw2").await;
        create_test_center(&pool, alice.id, "Alice Garage").await;

        login(&server, "bob", "pw2").await;
        let response = server.get("/dashboard").await;
        response.assert_status_ok();
        assert!(!response.text().contains("Alice Garage"));
        response.assert_text_contains("You have no parking centers yet.");

        login(&server, "alice", "pw1").await;
        let response = server.get("/dashboard").await;
        response.assert_text_contains("Alice Garage");
    }

    #[sqlx::test]
    async fn test_non_owner_delete_is_silent_noop(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        let alice = create_test_user(&pool, "alice", "pw1").await;
        create_test_user(&pool, "bob", "pw2").await;
        let center = create_test_center(&pool, alice.id, "Garage").await;

        login(&server, "bob", "pw2").await;
        let response = server.post(&format!("/delete_parking_center/{}", center.id)).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), "/dashboard");

        // Still reports success to the caller
        let response = server.get("/dashboard").await;
        response.assert_text_contains("Parking center deleted.");

        // But the row is untouched
        let mut conn = pool.acquire().await.unwrap();
        let mut centers = ParkingCenters::new(&mut conn);
        assert!(centers.get_by_id(center.id).await.unwrap().is_some());
    }

    #[sqlx::test]
    async fn test_car_number_unique_across_centers(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        let alice = create_test_user(&pool, "alice", "pw1").await;
        let center_x = create_test_center(&pool, alice.id, "X").await;
        let center_y = create_test_center(&pool, alice.id, "Y").await;

        login(&server, "alice", "pw1").await;
        let response = server
            .post(&format!("/manage_car/{}", center_x.id))
            .form(&[("car_number", "ABC123"), ("action", "add")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);

        // The same plate under another center collides
        let response = server
            .post(&format!("/manage_car/{}", center_y.id))
            .form(&[("car_number", "ABC123"), ("action", "add")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);

        let response = server.get(&format!("/parking_center/{}", center_y.id)).await;
        response.assert_text_contains("Car ABC123 is already in the list.");
        response.assert_text_contains("No cars are parked here.");
    }

    #[sqlx::test]
    async fn test_remove_requires_matching_center(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        let alice = create_test_user(&pool, "alice", "pw1").await;
        let center_x = create_test_center(&pool, alice.id, "X").await;
        let center_y = create_test_center(&pool, alice.id, "Y").await;

        login(&server, "alice", "pw1").await;
        let response = server
            .post(&format!("/manage_car/{}", center_x.id))
            .form(&[("car_number", "ABC123"), ("action", "add")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);

        // The plate exists, but not under center Y
        let response = server
            .post(&format!("/manage_car/{}", center_y.id))
            .form(&[("car_number", "ABC123"), ("action", "remove")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);

        let response = server.get(&format!("/parking_center/{}", center_y.id)).await;
        response.assert_text_contains("Car ABC123 is not in the list.");

        let mut conn = pool.acquire().await.unwrap();
        let mut cars = Cars::new(&mut conn);
        assert_eq!(cars.list_for_center(center_x.id).await.unwrap().len(), 1);
    }

    #[sqlx::test]
    async fn test_non_owner_cannot_view_or_manage_cars(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        let alice = create_test_user(&pool, "alice", "pw1").await;
        create_test_user(&pool, "bob", "pw2").await;
        let center = create_test_center(&pool, alice.id, "Garage").await;

        login(&server, "bob", "pw2").await;

        let response = server.get(&format!("/parking_center/{}", center.id)).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), "/dashboard");
        let response = server.get("/dashboard").await;
        response.assert_text_contains("You do not own this parking center.");

        let response = server
            .post(&format!("/manage_car/{}", center.id))
            .form(&[("car_number", "ABC123"), ("action", "add")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), "/dashboard");

        let mut conn = pool.acquire().await.unwrap();
        let mut cars = Cars::new(&mut conn);
        assert!(cars.list_for_center(center.id).await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn test_missing_center_bounces_to_dashboard(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        create_test_user(&pool, "alice", "pw1").await;

        login(&server, "alice", "pw1").await;
        let response = server.get("/parking_center/4242").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), "/dashboard");

        let response = server.get("/dashboard").await;
        response.assert_text_contains("Parking center not found.");
    }

    #[sqlx::test]
    async fn test_logout_ends_the_session(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        create_test_user(&pool, "alice", "pw1").await;

        login(&server, "alice", "pw1").await;
        let response = server.get("/dashboard").await;
        response.assert_status_ok();

        let response = server.get("/logout").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), "/login");

        let response = server.get("/login").await;
        response.assert_text_contains("You have been logged out.");

        let response = server.get("/dashboard").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), "/login");
    }
}
