//! Driver pages

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Form;
use axum_htmx::HxRequest;
use sqlx::SqlitePool;

use super::{done, ConfirmDeletePage, FormPage};
use crate::auth::{Authenticated, Session};
use crate::error::TaxiError;
use crate::forms::{
    driver_taken_errors, DriverCreationForm, DriverLicenseUpdateForm, DriverSearchForm,
    FormError, SearchForm, ValidationErrors,
};
use crate::models::{Car, Driver};
use crate::pagination::{Page, PageParam, Paginator};
use crate::state::AppState;
use crate::template::{PageContext, RenderTemplate};

const LIST_URL: &str = "/drivers/";
const CREATE_URL: &str = "/drivers/create/";

#[derive(Template)]
#[template(path = "taxi/driver_list.html")]
struct DriverListPage {
    ctx: PageContext,
    search_form: String,
    table: String,
}

/// Swapped into `#driver-list` by the live search
#[derive(Template)]
#[template(path = "taxi/includes/driver_table.html")]
struct DriverTable {
    drivers: Vec<Driver>,
    page: Page,
}

#[derive(Template)]
#[template(path = "taxi/driver_detail.html")]
struct DriverDetailPage {
    ctx: PageContext,
    driver: Driver,
    cars: Vec<Car>,
}

async fn find(pool: &SqlitePool, id: i64) -> Result<Driver, TaxiError> {
    Driver::find_by_id(pool, id)
        .await?
        .ok_or_else(|| TaxiError::not_found("driver", id))
}

/// GET /drivers/ - paginated list filtered by `?username=`
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] for a page past the end
pub async fn list(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    HxRequest(is_htmx): HxRequest,
    Query(search): Query<DriverSearchForm>,
    Query(params): Query<PageParam>,
) -> Result<Response, TaxiError> {
    let term = search.term();
    let count = Driver::count(state.pool(), term).await?;
    let page = Paginator::new(count)
        .page(params.page.as_deref())?
        .with_query([("username", term.unwrap_or_default())]);
    let drivers = Driver::search(state.pool(), term, page.limit(), page.offset()).await?;

    let table = DriverTable { drivers, page };
    if is_htmx {
        return Ok(table.render_html());
    }

    Ok(DriverListPage {
        ctx: PageContext::new(viewer, &session),
        search_form: search.render(LIST_URL, "#driver-list"),
        table: table.render()?,
    }
    .render_html())
}

/// GET /drivers/{id}/ - a driver and the cars they drive
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the driver does not exist
pub async fn detail(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let driver = find(state.pool(), id).await?;
    let cars = Car::for_driver(state.pool(), id).await?;

    Ok(DriverDetailPage {
        ctx: PageContext::new(viewer, &session),
        driver,
        cars,
    }
    .render_html())
}

/// GET /drivers/create/
pub async fn create_form(Authenticated(viewer): Authenticated, session: Session) -> Response {
    let ctx = PageContext::new(viewer, &session);
    let form =
        DriverCreationForm::default().render(CREATE_URL, &ctx.csrf_token, &ValidationErrors::new());
    FormPage::new(ctx, "Create driver", form, LIST_URL).render_html()
}

/// POST /drivers/create/
///
/// A username or license number taken by a concurrent request re-renders
/// the form like any other validation error.
///
/// # Errors
///
/// Returns [`TaxiError`] if hashing or the database fails
pub async fn create(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Form(mut form): Form<DriverCreationForm>,
) -> Result<Response, TaxiError> {
    let errors = match form.clean(state.pool()).await {
        Ok(new_driver) => match Driver::create(state.pool(), state.hasher(), &new_driver).await {
            Ok(driver) => {
                tracing::info!(driver_id = driver.id, "driver created");
                let message = format!("Driver \"{}\" was created.", driver.username);
                return Ok(done(&session, message, LIST_URL));
            }
            Err(TaxiError::Database(e)) => driver_taken_errors(e)?,
            Err(e) => return Err(e),
        },
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Database(e)) => return Err(e.into()),
    };

    let ctx = PageContext::new(viewer, &session);
    let html = form.render(CREATE_URL, &ctx.csrf_token, &errors);
    Ok(FormPage::new(ctx, "Create driver", html, LIST_URL).rejected())
}

/// GET /drivers/{id}/update/ - the license number form
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the driver does not exist
pub async fn update_form(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let driver = find(state.pool(), id).await?;
    let action = format!("/drivers/{id}/update/");
    let ctx = PageContext::new(viewer, &session);
    let form = DriverLicenseUpdateForm::for_driver(&driver).render(
        &action,
        &ctx.csrf_token,
        &ValidationErrors::new(),
    );
    Ok(FormPage::new(ctx, "Update license number", form, driver.absolute_url()).render_html())
}

/// POST /drivers/{id}/update/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the driver does not exist
pub async fn update(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
    Form(mut form): Form<DriverLicenseUpdateForm>,
) -> Result<Response, TaxiError> {
    let driver = find(state.pool(), id).await?;

    let errors = match form.clean(state.pool(), id).await {
        Ok(license_number) => {
            match Driver::update_license(state.pool(), id, &license_number).await {
                Ok(Some(_)) => {
                    tracing::info!(driver_id = id, "driver license updated");
                    let message =
                        format!("License number of \"{}\" was updated.", driver.username);
                    return Ok(done(&session, message, LIST_URL));
                }
                Ok(None) => return Err(TaxiError::not_found("driver", id)),
                Err(e) => driver_taken_errors(e)?,
            }
        }
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Database(e)) => return Err(e.into()),
    };

    let ctx = PageContext::new(viewer, &session);
    let html = form.render(&format!("/drivers/{id}/update/"), &ctx.csrf_token, &errors);
    Ok(FormPage::new(ctx, "Update license number", html, driver.absolute_url()).rejected())
}

/// GET /drivers/{id}/delete/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the driver does not exist
pub async fn delete_form(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let driver = find(state.pool(), id).await?;

    Ok(ConfirmDeletePage {
        ctx: PageContext::new(viewer, &session),
        kind: "driver",
        object: driver.to_string(),
        action: format!("/drivers/{id}/delete/"),
        cancel_url: driver.absolute_url(),
    }
    .render_html())
}

/// POST /drivers/{id}/delete/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the driver does not exist
pub async fn delete(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let driver = find(state.pool(), id).await?;
    if !Driver::delete(state.pool(), id).await? {
        return Err(TaxiError::not_found("driver", id));
    }

    tracing::info!(driver_id = id, deleted_by = viewer.id, "driver deleted");
    Ok(done(&session, format!("Driver \"{}\" was deleted.", driver.username), LIST_URL))
}
