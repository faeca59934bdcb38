//! Shared helpers for the integration tests

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use taxi_service::auth::{PasswordHashConfig, SessionData, SessionId};
use taxi_service::config::TaxiConfig;
use taxi_service::db;
use taxi_service::models::{Car, CarInput, Driver, Manufacturer, NewDriver};
use taxi_service::routes::build_router;
use taxi_service::state::AppState;
use tower::ServiceExt;

/// Password given to every test driver
pub const PASSWORD: &str = "Secret-pass-42";

/// CSRF token stored in every session made by [`TestApp::login`]
pub const CSRF_TOKEN: &str = "test-csrf-token";

/// Router over a fresh in-memory database
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

/// Configuration with the cheapest Argon2 parameters
pub fn test_config() -> TaxiConfig {
    let mut config = TaxiConfig::default();
    config.session.secure = false;
    config.password = PasswordHashConfig {
        memory_cost: 8,
        iterations: 1,
        parallelism: 1,
        ..PasswordHashConfig::default()
    };
    config
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = db::memory_pool().await.unwrap();
        let state = AppState::new(test_config(), pool);
        let router = build_router(state.clone());
        Self { state, router }
    }

    pub async fn driver(&self, username: &str, license_number: &str) -> Driver {
        self.create_driver(username, Some(license_number), false).await
    }

    pub async fn staff(&self, username: &str) -> Driver {
        self.create_driver(username, None, true).await
    }

    async fn create_driver(
        &self,
        username: &str,
        license_number: Option<&str>,
        is_staff: bool,
    ) -> Driver {
        Driver::create(
            self.state.pool(),
            self.state.hasher(),
            &NewDriver {
                username: username.to_string(),
                password: PASSWORD.to_string(),
                first_name: "Test".to_string(),
                last_name: "Driver".to_string(),
                license_number: license_number.map(ToString::to_string),
                is_staff,
                is_superuser: is_staff,
            },
        )
        .await
        .unwrap()
    }

    pub async fn manufacturer(&self, name: &str, country: &str) -> Manufacturer {
        Manufacturer::create(self.state.pool(), name, country).await.unwrap()
    }

    pub async fn car(&self, model: &str, manufacturer: &Manufacturer, drivers: &[&Driver]) -> Car {
        Car::create(
            self.state.pool(),
            &CarInput {
                model: model.to_string(),
                manufacturer_id: manufacturer.id,
                driver_ids: drivers.iter().map(|d| d.id).collect(),
            },
        )
        .await
        .unwrap()
    }

    /// Store a logged-in session for `driver` and return its cookie header
    pub async fn login(&self, driver: &Driver) -> String {
        let id = SessionId::generate();
        let data = SessionData {
            user_id: Some(driver.id),
            csrf_token: Some(CSRF_TOKEN.to_string()),
            ..SessionData::default()
        };
        self.state.sessions().save(&id, &data).await.unwrap();
        format!("{}={id}", self.state.config().session.cookie_name)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    /// Form POST carrying [`CSRF_TOKEN`]
    pub async fn post(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response {
        let form = if form.is_empty() {
            format!("csrf_token={CSRF_TOKEN}")
        } else {
            format!("{form}&csrf_token={CSRF_TOKEN}")
        };
        self.post_without_token(uri, &form, cookie).await
    }

    /// Form POST sending exactly `form`
    pub async fn post_without_token(
        &self,
        uri: &str,
        form: &str,
        cookie: Option<&str>,
    ) -> Response {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::from(form.to_string())).unwrap())
            .await
            .unwrap()
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> &str {
    response.headers().get(LOCATION).unwrap().to_str().unwrap()
}

pub fn assert_redirect(response: &Response, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), to);
}
