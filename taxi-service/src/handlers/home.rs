//! Home page with fleet totals

use askama::Template;
use axum::extract::State;
use axum::response::Response;

use crate::auth::{Authenticated, Session};
use crate::error::TaxiError;
use crate::models::{Car, Driver, Manufacturer};
use crate::state::AppState;
use crate::template::{PageContext, RenderTemplate};

/// Session key of the per-session visit counter
pub const NUM_VISITS: &str = "num_visits";

#[derive(Template)]
#[template(path = "index.html")]
struct HomePage {
    ctx: PageContext,
    num_drivers: i64,
    num_cars: i64,
    num_manufacturers: i64,
    num_visits: i64,
}

/// GET / - record counts and how often this session has visited
///
/// # Errors
///
/// Returns [`TaxiError`] if a count query fails
pub async fn index(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
) -> Result<Response, TaxiError> {
    let num_visits = session.get::<i64>(NUM_VISITS).unwrap_or(0) + 1;
    session.set(NUM_VISITS, num_visits)?;

    let page = HomePage {
        num_drivers: Driver::count(state.pool(), None).await?,
        num_cars: Car::count(state.pool(), None, None).await?,
        num_manufacturers: Manufacturer::count(state.pool(), None).await?,
        num_visits,
        ctx: PageContext::new(viewer, &session),
    };

    Ok(page.render_html())
}
