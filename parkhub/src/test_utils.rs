//! Test utilities for integration testing (available with `test-utils` feature).

use crate::auth::password;
use crate::config::Config;
use crate::db::handlers::{ParkingCenters, Users};
use crate::db::models::parking_centers::{ParkingCenterCreateDBRequest, ParkingCenterDBResponse};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::types::UserId;
use axum_test::TestServer;
use sqlx::SqlitePool;

pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    create_test_app_with_config(pool, create_test_config()).await
}

pub async fn create_test_app_with_config(pool: SqlitePool, config: Config) -> TestServer {
    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    }
}

pub async fn create_test_user(pool: &SqlitePool, username: &str, password_input: &str) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);

    let password_hash = password::hash_password(password_input).expect("Failed to hash password");
    users_repo
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            password_hash,
        })
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_center(pool: &SqlitePool, owner: UserId, name: &str) -> ParkingCenterDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut center_repo = ParkingCenters::new(&mut conn);

    center_repo
        .create(&ParkingCenterCreateDBRequest {
            name: name.to_string(),
            user_id: owner,
        })
        .await
        .expect("Failed to create test center")
}

/// Log the test server in as `username`, leaving the session cookie in the
/// server's cookie jar for subsequent requests.
pub async fn login(server: &TestServer, username: &str, password_input: &str) {
    let response = server
        .post("/login")
        .form(&[("username", username), ("password", password_input)])
        .await;

    response.assert_status(axum::http::StatusCode::SEE_OTHER);
    assert_eq!(response.header("location").to_str().unwrap(), "/dashboard");
}
