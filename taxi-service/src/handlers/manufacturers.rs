//! Manufacturer pages

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Form;
use axum_htmx::HxRequest;

use super::{done, ConfirmDeletePage, FormPage};
use crate::auth::{Authenticated, Session};
use crate::error::TaxiError;
use crate::forms::{
    FormError, ManufacturerForm, ManufacturerSearchForm, SearchForm, ValidationErrors,
};
use crate::models::{is_unique_violation, Car, Manufacturer};
use crate::pagination::{Page, PageParam, Paginator};
use crate::state::AppState;
use crate::template::{PageContext, RenderTemplate};

const LIST_URL: &str = "/manufacturers/";

#[derive(Template)]
#[template(path = "taxi/manufacturer_list.html")]
struct ManufacturerListPage {
    ctx: PageContext,
    search_form: String,
    table: String,
}

/// Swapped into `#manufacturer-list` by the live search
#[derive(Template)]
#[template(path = "taxi/includes/manufacturer_table.html")]
struct ManufacturerTable {
    manufacturers: Vec<Manufacturer>,
    page: Page,
}

#[derive(Template)]
#[template(path = "taxi/manufacturer_detail.html")]
struct ManufacturerDetailPage {
    ctx: PageContext,
    manufacturer: Manufacturer,
    cars: Vec<Car>,
}

async fn find(state: &AppState, id: i64) -> Result<Manufacturer, TaxiError> {
    Manufacturer::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| TaxiError::not_found("manufacturer", id))
}

/// GET /manufacturers/ - paginated list filtered by `?name=`
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] for a page past the end
pub async fn list(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    HxRequest(is_htmx): HxRequest,
    Query(search): Query<ManufacturerSearchForm>,
    Query(params): Query<PageParam>,
) -> Result<Response, TaxiError> {
    let term = search.term();
    let count = Manufacturer::count(state.pool(), term).await?;
    let page = Paginator::new(count)
        .page(params.page.as_deref())?
        .with_query([("name", term.unwrap_or_default())]);
    let manufacturers =
        Manufacturer::search(state.pool(), term, page.limit(), page.offset()).await?;

    let table = ManufacturerTable { manufacturers, page };
    if is_htmx {
        return Ok(table.render_html());
    }

    Ok(ManufacturerListPage {
        ctx: PageContext::new(viewer, &session),
        search_form: search.render(LIST_URL, "#manufacturer-list"),
        table: table.render()?,
    }
    .render_html())
}

/// GET /manufacturers/{id}/ - one manufacturer and its cars
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the manufacturer does not exist
pub async fn detail(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let manufacturer = find(&state, id).await?;
    let cars = Car::for_manufacturer(state.pool(), id).await?;

    Ok(ManufacturerDetailPage {
        ctx: PageContext::new(viewer, &session),
        manufacturer,
        cars,
    }
    .render_html())
}

fn form_page(
    ctx: PageContext,
    title: &str,
    form: &ManufacturerForm,
    action: &str,
    errors: &ValidationErrors,
) -> FormPage {
    let html = form.render(action, &ctx.csrf_token, errors);
    FormPage::new(ctx, title, html, LIST_URL)
}

/// GET /manufacturers/create/
pub async fn create_form(Authenticated(viewer): Authenticated, session: Session) -> Response {
    form_page(
        PageContext::new(viewer, &session),
        "Create manufacturer",
        &ManufacturerForm::default(),
        "/manufacturers/create/",
        &ValidationErrors::new(),
    )
    .render_html()
}

/// POST /manufacturers/create/
///
/// # Errors
///
/// Returns [`TaxiError`] if the database fails
pub async fn create(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Form(mut form): Form<ManufacturerForm>,
) -> Result<Response, TaxiError> {
    let errors = match form.clean(state.pool(), None).await {
        Ok(()) => match Manufacturer::create(state.pool(), &form.name, &form.country).await {
            Ok(manufacturer) => {
                tracing::info!(manufacturer_id = manufacturer.id, "manufacturer created");
                let message = format!("Manufacturer \"{manufacturer}\" was created.");
                return Ok(done(&session, message, LIST_URL));
            }
            Err(e) if is_unique_violation(&e) => name_taken(),
            Err(e) => return Err(e.into()),
        },
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Database(e)) => return Err(e.into()),
    };

    let ctx = PageContext::new(viewer, &session);
    Ok(form_page(ctx, "Create manufacturer", &form, "/manufacturers/create/", &errors).rejected())
}

/// GET /manufacturers/{id}/update/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the manufacturer does not exist
pub async fn update_form(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let manufacturer = find(&state, id).await?;
    Ok(form_page(
        PageContext::new(viewer, &session),
        "Update manufacturer",
        &ManufacturerForm::for_manufacturer(&manufacturer),
        &format!("/manufacturers/{id}/update/"),
        &ValidationErrors::new(),
    )
    .render_html())
}

/// POST /manufacturers/{id}/update/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the manufacturer does not exist
pub async fn update(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
    Form(mut form): Form<ManufacturerForm>,
) -> Result<Response, TaxiError> {
    find(&state, id).await?;

    let errors = match form.clean(state.pool(), Some(id)).await {
        Ok(()) => match Manufacturer::update(state.pool(), id, &form.name, &form.country).await {
            Ok(Some(manufacturer)) => {
                tracing::info!(manufacturer_id = id, "manufacturer updated");
                let message = format!("Manufacturer \"{manufacturer}\" was updated.");
                return Ok(done(&session, message, LIST_URL));
            }
            Ok(None) => return Err(TaxiError::not_found("manufacturer", id)),
            Err(e) if is_unique_violation(&e) => name_taken(),
            Err(e) => return Err(e.into()),
        },
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Database(e)) => return Err(e.into()),
    };

    let ctx = PageContext::new(viewer, &session);
    let action = format!("/manufacturers/{id}/update/");
    Ok(form_page(ctx, "Update manufacturer", &form, &action, &errors).rejected())
}

/// GET /manufacturers/{id}/delete/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the manufacturer does not exist
pub async fn delete_form(
    State(state): State<AppState>,
    Authenticated(viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let manufacturer = find(&state, id).await?;

    Ok(ConfirmDeletePage {
        ctx: PageContext::new(viewer, &session),
        kind: "manufacturer",
        object: manufacturer.to_string(),
        action: format!("/manufacturers/{id}/delete/"),
        cancel_url: manufacturer.absolute_url(),
    }
    .render_html())
}

/// POST /manufacturers/{id}/delete/ - also removes the manufacturer's cars
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the manufacturer does not exist
pub async fn delete(
    State(state): State<AppState>,
    Authenticated(_viewer): Authenticated,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let manufacturer = find(&state, id).await?;
    if !Manufacturer::delete(state.pool(), id).await? {
        return Err(TaxiError::not_found("manufacturer", id));
    }

    tracing::info!(manufacturer_id = id, "manufacturer deleted");
    Ok(done(&session, format!("Manufacturer \"{manufacturer}\" was deleted."), LIST_URL))
}

fn name_taken() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add_with_code("name", "Manufacturer with this Name already exists.", "unique");
    errors
}
