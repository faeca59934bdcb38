//! Car pages and the "assign me" toggle

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum_htmx::HxRequest;
use sqlx::SqlitePool;

use super::{done, ConfirmDeletePage, FormPage};
use crate::auth::{Authenticated, Session};
use crate::error::TaxiError;
use crate::forms::{CarForm, CarSearchForm, FormData, FormError, SearchForm, ValidationErrors};
use crate::models::{Car, Driver, Manufacturer};
use crate::pagination::{Page, PageParam, Paginator};
use crate::state::AppState;
use crate::template::{PageContext, RenderTemplate};

const LIST_URL: &str = "/cars/";

#[derive(Template)]
#[template(path = "taxi/car_list.html")]
struct CarListPage {
    ctx: PageContext,
    search_form: String,
    table: String,
}

/// Swapped into `#car-list` by the live search
#[derive(Template)]
#[template(path = "taxi/includes/car_table.html")]
struct CarTable {
    cars: Vec<Car>,
    page: Page,
}

#[derive(Template)]
#[template(path = "taxi/car_detail.html")]
struct CarDetailPage {
    ctx: PageContext,
    car: Car,
    drivers: Vec<Driver>,
    assigned: bool,
}

async fn find(pool: &SqlitePool, id: i64) -> Result<Car, TaxiError> {
    Car::find_by_id(pool, id)
        .await?
        .ok_or_else(|| TaxiError::not_found("car", id))
}

/// GET /cars/ - paginated list filtered by `?model=`
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] for a page past the end
pub async fn list(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    HxRequest(is_htmx): HxRequest,
    Query(search): Query<CarSearchForm>,
    Query(params): Query<PageParam>,
) -> Result<Response, TaxiError> {
    let term = search.term();
    let count = Car::count(state.pool(), term, None).await?;
    let page = Paginator::new(count)
        .page(params.page.as_deref())?
        .with_query([("model", term.unwrap_or_default())]);
    let cars = Car::search(state.pool(), term, None, page.limit(), page.offset()).await?;

    let table = CarTable { cars, page };
    if is_htmx {
        return Ok(table.render_html());
    }

    Ok(CarListPage {
        ctx: PageContext::new(viewer, &session),
        search_form: search.render(LIST_URL, "#car-list"),
        table: table.render()?,
    }
    .render_html())
}

/// GET /cars/{id}/ - a car, its manufacturer and drivers
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the car does not exist
pub async fn detail(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let car = find(state.pool(), id).await?;
    let drivers = Driver::for_car(state.pool(), id).await?;
    let assigned = drivers.iter().any(|d| d.id == viewer.id);

    Ok(CarDetailPage {
        ctx: PageContext::new(viewer, &session),
        car,
        drivers,
        assigned,
    }
    .render_html())
}

async fn form_page(
    pool: &SqlitePool,
    ctx: PageContext,
    title: &str,
    form: &CarForm,
    action: &str,
    errors: &ValidationErrors,
) -> Result<FormPage, TaxiError> {
    let manufacturers = Manufacturer::all(pool).await?;
    let drivers = Driver::all(pool).await?;
    let html = form.render(action, &ctx.csrf_token, errors, &manufacturers, &drivers);
    Ok(FormPage::new(ctx, title, html, LIST_URL))
}

/// GET /cars/create/
///
/// # Errors
///
/// Returns [`TaxiError`] if the choices cannot be loaded
pub async fn create_form(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
) -> Result<Response, TaxiError> {
    let ctx = PageContext::new(viewer, &session);
    let page = form_page(
        state.pool(),
        ctx,
        "Create car",
        &CarForm::default(),
        "/cars/create/",
        &ValidationErrors::new(),
    )
    .await?;
    Ok(page.render_html())
}

/// POST /cars/create/ - car and driver assignments in one transaction
///
/// # Errors
///
/// Returns [`TaxiError`] if the database fails
pub async fn create(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    data: FormData,
) -> Result<Response, TaxiError> {
    let mut form = CarForm::from_data(&data);

    match form.clean(state.pool()).await {
        Ok(input) => {
            let car = Car::create(state.pool(), &input).await?;
            tracing::info!(car_id = car.id, drivers = input.driver_ids.len(), "car created");
            Ok(done(&session, format!("Car \"{car}\" was created."), LIST_URL))
        }
        Err(FormError::Invalid(errors)) => {
            let ctx = PageContext::new(viewer, &session);
            let page =
                form_page(state.pool(), ctx, "Create car", &form, "/cars/create/", &errors).await?;
            Ok(page.rejected())
        }
        Err(FormError::Database(e)) => Err(e.into()),
    }
}

/// GET /cars/{id}/update/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the car does not exist
pub async fn update_form(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let car = find(state.pool(), id).await?;
    let driver_ids = Car::driver_ids(state.pool(), id).await?;

    let ctx = PageContext::new(viewer, &session);
    let page = form_page(
        state.pool(),
        ctx,
        "Update car",
        &CarForm::for_car(&car, &driver_ids),
        &format!("/cars/{id}/update/"),
        &ValidationErrors::new(),
    )
    .await?;
    Ok(page.render_html())
}

/// POST /cars/{id}/update/ - replaces model, manufacturer and drivers
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the car does not exist
pub async fn update(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
    data: FormData,
) -> Result<Response, TaxiError> {
    find(state.pool(), id).await?;
    let mut form = CarForm::from_data(&data);

    match form.clean(state.pool()).await {
        Ok(input) => {
            let car = Car::update(state.pool(), id, &input)
                .await?
                .ok_or_else(|| TaxiError::not_found("car", id))?;
            tracing::info!(car_id = id, "car updated");
            Ok(done(&session, format!("Car \"{car}\" was updated."), LIST_URL))
        }
        Err(FormError::Invalid(errors)) => {
            let ctx = PageContext::new(viewer, &session);
            let action = format!("/cars/{id}/update/");
            let page = form_page(state.pool(), ctx, "Update car", &form, &action, &errors).await?;
            Ok(page.rejected())
        }
        Err(FormError::Database(e)) => Err(e.into()),
    }
}

/// GET /cars/{id}/delete/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the car does not exist
pub async fn delete_form(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let car = find(state.pool(), id).await?;

    Ok(ConfirmDeletePage {
        ctx: PageContext::new(viewer, &session),
        kind: "car",
        object: car.to_string(),
        action: format!("/cars/{id}/delete/"),
        cancel_url: car.absolute_url(),
    }
    .render_html())
}

/// POST /cars/{id}/delete/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the car does not exist
pub async fn delete(
    State(state): State<AppState>,
    Authenticated(_viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let car = find(state.pool(), id).await?;
    if !Car::delete(state.pool(), id).await? {
        return Err(TaxiError::not_found("car", id));
    }

    tracing::info!(car_id = id, "car deleted");
    Ok(done(&session, format!("Car \"{car}\" was deleted."), LIST_URL))
}

/// POST /cars/{id}/toggle-assign/ - add or remove the current driver
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the car does not exist
pub async fn toggle_assign(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let car = find(state.pool(), id).await?;
    let assigned = Car::toggle_driver(state.pool(), id, viewer.id).await?;

    tracing::info!(car_id = id, driver_id = viewer.id, assigned, "car assignment toggled");
    let message = if assigned {
        format!("You now drive \"{car}\".")
    } else {
        format!("You no longer drive \"{car}\".")
    };
    Ok(done(&session, message, &car.absolute_url()))
}
