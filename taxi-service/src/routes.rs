//! Router assembly
//!
//! ```rust,no_run
//! use taxi_service::prelude::*;
//!
//! # async fn example(state: AppState) -> anyhow::Result<()> {
//! let app = routes::build_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::routing::{get, post};
use axum::Router;
use axum_htmx::AutoVaryLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::handlers::{login_form, login_post, logout, logout_form};
use crate::handlers::{admin, cars, drivers, home, manufacturers};
use crate::middleware::{AuthMiddleware, CsrfLayer, SessionLayer};
use crate::state::AppState;

/// Every route, with sessions, CSRF checks, login gating, body limits and
/// request tracing
pub fn build_router(state: AppState) -> Router {
    let login_path = state.config().login_path.clone();
    let max_body_bytes = state.config().server.max_body_bytes;
    let auth = AuthMiddleware::with_login_path(login_path.clone());

    let protected = fleet_routes()
        .merge(admin_routes())
        .route_layer(middleware::from_fn(move |req: Request, next: Next| {
            auth.clone().handle(req, next)
        }));

    Router::new()
        .route(&login_path, get(login_form).post(login_post))
        .route("/accounts/logout/", get(logout_form).post(logout))
        .merge(protected)
        .layer(CsrfLayer::new(max_body_bytes))
        .layer(SessionLayer::new(&state))
        .layer(AutoVaryLayer)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Pages for logged-in drivers
fn fleet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/manufacturers/", get(manufacturers::list))
        .route(
            "/manufacturers/create/",
            get(manufacturers::create_form).post(manufacturers::create),
        )
        .route("/manufacturers/{id}/", get(manufacturers::detail))
        .route(
            "/manufacturers/{id}/update/",
            get(manufacturers::update_form).post(manufacturers::update),
        )
        .route(
            "/manufacturers/{id}/delete/",
            get(manufacturers::delete_form).post(manufacturers::delete),
        )
        .route("/cars/", get(cars::list))
        .route("/cars/create/", get(cars::create_form).post(cars::create))
        .route("/cars/{id}/", get(cars::detail))
        .route("/cars/{id}/update/", get(cars::update_form).post(cars::update))
        .route("/cars/{id}/delete/", get(cars::delete_form).post(cars::delete))
        .route("/cars/{id}/toggle-assign/", post(cars::toggle_assign))
        .route("/drivers/", get(drivers::list))
        .route("/drivers/create/", get(drivers::create_form).post(drivers::create))
        .route("/drivers/{id}/", get(drivers::detail))
        .route("/drivers/{id}/update/", get(drivers::update_form).post(drivers::update))
        .route("/drivers/{id}/delete/", get(drivers::delete_form).post(drivers::delete))
}

/// Staff-only console
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/", get(admin::index))
        .route("/admin/drivers/", get(admin::driver_list))
        .route(
            "/admin/drivers/add/",
            get(admin::driver_add_form).post(admin::driver_add),
        )
        .route(
            "/admin/drivers/{id}/change/",
            get(admin::driver_change_form).post(admin::driver_change),
        )
        .route(
            "/admin/drivers/{id}/delete/",
            get(admin::driver_delete_form).post(admin::driver_delete),
        )
        .route("/admin/cars/", get(admin::car_list))
        .route("/admin/cars/add/", get(admin::car_add_form).post(admin::car_add))
        .route(
            "/admin/cars/{id}/change/",
            get(admin::car_change_form).post(admin::car_change),
        )
        .route(
            "/admin/cars/{id}/delete/",
            get(admin::car_delete_form).post(admin::car_delete),
        )
        .route("/admin/manufacturers/", get(admin::manufacturer_list))
        .route(
            "/admin/manufacturers/add/",
            get(admin::manufacturer_add_form).post(admin::manufacturer_add),
        )
        .route(
            "/admin/manufacturers/{id}/change/",
            get(admin::manufacturer_change_form).post(admin::manufacturer_change),
        )
        .route(
            "/admin/manufacturers/{id}/delete/",
            get(admin::manufacturer_delete_form).post(admin::manufacturer_delete),
        )
}
