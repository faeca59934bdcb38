//! Staff-only admin console
//!
//! Read/write access to every driver, car and manufacturer regardless of the
//! fleet pages' rules: driver names and license numbers may be blank, and
//! staff and active flags are editable. Change lists take `?q=` to search
//! and, for cars, `?manufacturer=<id>` to filter.
//!
//! Every handler takes [`StaffUser`], so anonymous visitors are sent to the
//! login page and drivers without staff status get `403`.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Form;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::done;
use crate::auth::{Session, StaffUser};
use crate::error::TaxiError;
use crate::forms::{
    driver_taken_errors, AdminDriverForm, CarForm, FormData, FormError, ManufacturerForm,
    ValidationErrors,
};
use crate::models::{Car, Driver, Manufacturer};
use crate::pagination::{Page, Paginator};
use crate::state::AppState;
use crate::template::{PageContext, RenderTemplate};

/// Rows per change list page
pub const ADMIN_PAGE_SIZE: i64 = 100;

/// Change list query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeListQuery {
    /// Search term
    #[serde(default)]
    pub q: String,
    /// Manufacturer filter for cars
    pub manufacturer: Option<String>,
    /// Page number
    pub page: Option<String>,
}

impl ChangeListQuery {
    fn term(&self) -> Option<&str> {
        Some(self.q.trim()).filter(|q| !q.is_empty())
    }

    fn manufacturer_id(&self) -> Option<i64> {
        self.manufacturer.as_deref().and_then(|m| m.trim().parse().ok())
    }
}

/// One model on the admin index
struct Section {
    name: &'static str,
    list_url: &'static str,
    add_url: &'static str,
    count: i64,
}

/// One linked row of a change list
struct Row {
    change_url: String,
    cells: Vec<String>,
}

/// One choice of a change list filter
struct FilterChoice {
    label: String,
    url: String,
    selected: bool,
}

#[derive(Template)]
#[template(path = "admin/index.html")]
struct IndexPage {
    ctx: PageContext,
    sections: Vec<Section>,
}

#[derive(Template)]
#[template(path = "admin/change_list.html")]
struct ChangeListPage {
    ctx: PageContext,
    title: &'static str,
    list_url: &'static str,
    add_url: &'static str,
    q: String,
    columns: &'static [&'static str],
    rows: Vec<Row>,
    filters: Vec<FilterChoice>,
    page: Page,
}

#[derive(Template)]
#[template(path = "admin/change_form.html")]
struct ChangeFormPage {
    ctx: PageContext,
    title: String,
    form: String,
    list_url: &'static str,
    delete_url: Option<String>,
}

impl ChangeFormPage {
    fn respond(&self, errors: &ValidationErrors) -> Response {
        if errors.has_errors() {
            self.render_with_status(StatusCode::UNPROCESSABLE_ENTITY)
        } else {
            self.render_html()
        }
    }
}

#[derive(Template)]
#[template(path = "admin/delete_confirmation.html")]
struct DeleteConfirmationPage {
    ctx: PageContext,
    kind: &'static str,
    object: String,
    action: String,
    list_url: &'static str,
}

fn delete_page(
    ctx: PageContext,
    kind: &'static str,
    object: String,
    list_url: &'static str,
    id: i64,
) -> Response {
    DeleteConfirmationPage {
        ctx,
        kind,
        object,
        action: format!("{list_url}{id}/delete/"),
        list_url,
    }
    .render_html()
}

/// GET /admin/ - the three models with their record counts
///
/// # Errors
///
/// Returns [`TaxiError`] if a count query fails
pub async fn index(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
) -> Result<Response, TaxiError> {
    let pool = state.pool();
    let sections = vec![
        Section {
            name: "Cars",
            list_url: CARS,
            add_url: "/admin/cars/add/",
            count: Car::count(pool, None, None).await?,
        },
        Section {
            name: "Drivers",
            list_url: DRIVERS,
            add_url: "/admin/drivers/add/",
            count: Driver::count(pool, None).await?,
        },
        Section {
            name: "Manufacturers",
            list_url: MANUFACTURERS,
            add_url: "/admin/manufacturers/add/",
            count: Manufacturer::count(pool, None).await?,
        },
    ];

    Ok(IndexPage {
        ctx: PageContext::new(staff, &session),
        sections,
    }
    .render_html())
}

fn admin_page(
    count: i64,
    query: &ChangeListQuery,
    manufacturer_id: Option<i64>,
) -> Result<Page, TaxiError> {
    let manufacturer = manufacturer_id.map(|id| id.to_string()).unwrap_or_default();
    Ok(Paginator::with_page_size(count, ADMIN_PAGE_SIZE)
        .page(query.page.as_deref())?
        .with_query([
            ("q", query.term().unwrap_or_default()),
            ("manufacturer", manufacturer.as_str()),
        ]))
}

// Drivers

const DRIVERS: &str = "/admin/drivers/";

async fn find_driver(pool: &SqlitePool, id: i64) -> Result<Driver, TaxiError> {
    Driver::find_by_id(pool, id)
        .await?
        .ok_or_else(|| TaxiError::not_found("driver", id))
}

/// GET /admin/drivers/ - username, names, license number and flags
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] for a page past the end
pub async fn driver_list(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Query(query): Query<ChangeListQuery>,
) -> Result<Response, TaxiError> {
    let term = query.term();
    let count = Driver::count(state.pool(), term).await?;
    let page = admin_page(count, &query, None)?;
    let drivers = Driver::search(state.pool(), term, page.limit(), page.offset()).await?;

    let rows = drivers
        .into_iter()
        .map(|d| Row {
            change_url: format!("{DRIVERS}{}/change/", d.id),
            cells: vec![
                d.username.clone(),
                d.first_name.clone(),
                d.last_name.clone(),
                d.license().to_string(),
                yes_no(d.is_staff),
            ],
        })
        .collect();

    Ok(ChangeListPage {
        ctx: PageContext::new(staff, &session),
        title: "Drivers",
        list_url: DRIVERS,
        add_url: "/admin/drivers/add/",
        q: query.q.clone(),
        columns: &["Username", "First name", "Last name", "License number", "Staff status"],
        rows,
        filters: Vec::new(),
        page,
    }
    .render_html())
}

fn driver_form_page(
    ctx: PageContext,
    form: &AdminDriverForm,
    id: Option<i64>,
    errors: &ValidationErrors,
) -> ChangeFormPage {
    let (title, action) = match id {
        Some(id) => ("Change driver".to_string(), format!("{DRIVERS}{id}/change/")),
        None => ("Add driver".to_string(), format!("{DRIVERS}add/")),
    };
    let form = form.render(&action, &ctx.csrf_token, errors, id.is_none());
    ChangeFormPage {
        ctx,
        title,
        form,
        list_url: DRIVERS,
        delete_url: id.map(|id| format!("{DRIVERS}{id}/delete/")),
    }
}

/// GET /admin/drivers/add/
pub async fn driver_add_form(StaffUser(staff): StaffUser, session: Session) -> Response {
    let errors = ValidationErrors::new();
    let form = AdminDriverForm::blank();
    driver_form_page(PageContext::new(staff, &session), &form, None, &errors).respond(&errors)
}

/// POST /admin/drivers/add/
///
/// # Errors
///
/// Returns [`TaxiError`] if hashing or the database fails
pub async fn driver_add(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    data: FormData,
) -> Result<Response, TaxiError> {
    let mut form = AdminDriverForm::from_data(&data);
    let errors = match form.clean_add(state.pool()).await {
        Ok(new_driver) => match Driver::create(state.pool(), state.hasher(), &new_driver).await {
            Ok(driver) => {
                tracing::info!(
                    driver_id = driver.id,
                    staff_id = staff.id,
                    "driver added from admin"
                );
                let message =
                    format!("The driver \"{}\" was added successfully.", driver.username);
                return Ok(done(&session, message, DRIVERS));
            }
            Err(TaxiError::Database(e)) => driver_taken_errors(e)?,
            Err(e) => return Err(e),
        },
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Database(e)) => return Err(e.into()),
    };

    Ok(driver_form_page(PageContext::new(staff, &session), &form, None, &errors).respond(&errors))
}

/// GET /admin/drivers/{id}/change/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the driver does not exist
pub async fn driver_change_form(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let driver = find_driver(state.pool(), id).await?;
    let errors = ValidationErrors::new();
    let form = AdminDriverForm::for_driver(&driver);
    let ctx = PageContext::new(staff, &session);
    Ok(driver_form_page(ctx, &form, Some(id), &errors).respond(&errors))
}

/// POST /admin/drivers/{id}/change/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the driver does not exist
pub async fn driver_change(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
    data: FormData,
) -> Result<Response, TaxiError> {
    find_driver(state.pool(), id).await?;
    let mut form = AdminDriverForm::from_data(&data);

    let errors = match form.clean_change(state.pool(), id).await {
        Ok(changes) => match Driver::update(state.pool(), id, &changes).await {
            Ok(Some(driver)) => {
                tracing::info!(driver_id = id, staff_id = staff.id, "driver changed from admin");
                let message =
                    format!("The driver \"{}\" was changed successfully.", driver.username);
                return Ok(done(&session, message, DRIVERS));
            }
            Ok(None) => return Err(TaxiError::not_found("driver", id)),
            Err(e) => driver_taken_errors(e)?,
        },
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Database(e)) => return Err(e.into()),
    };

    let ctx = PageContext::new(staff, &session);
    Ok(driver_form_page(ctx, &form, Some(id), &errors).respond(&errors))
}

/// GET /admin/drivers/{id}/delete/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the driver does not exist
pub async fn driver_delete_form(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let driver = find_driver(state.pool(), id).await?;
    Ok(delete_page(PageContext::new(staff, &session), "driver", driver.to_string(), DRIVERS, id))
}

/// POST /admin/drivers/{id}/delete/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the driver does not exist
pub async fn driver_delete(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let driver = find_driver(state.pool(), id).await?;
    if !Driver::delete(state.pool(), id).await? {
        return Err(TaxiError::not_found("driver", id));
    }
    tracing::info!(driver_id = id, staff_id = staff.id, "driver deleted from admin");
    let message = format!("The driver \"{}\" was deleted successfully.", driver.username);
    Ok(done(&session, message, DRIVERS))
}

// Cars

const CARS: &str = "/admin/cars/";

async fn find_car(pool: &SqlitePool, id: i64) -> Result<Car, TaxiError> {
    Car::find_by_id(pool, id)
        .await?
        .ok_or_else(|| TaxiError::not_found("car", id))
}

/// GET /admin/cars/ - model and manufacturer, filterable by manufacturer
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] for a page past the end
pub async fn car_list(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Query(query): Query<ChangeListQuery>,
) -> Result<Response, TaxiError> {
    let term = query.term();
    let manufacturer_id = query.manufacturer_id();
    let count = Car::count(state.pool(), term, manufacturer_id).await?;
    let page = admin_page(count, &query, manufacturer_id)?;
    let cars = Car::search(state.pool(), term, manufacturer_id, page.limit(), page.offset()).await?;

    let rows = cars
        .into_iter()
        .map(|c| Row {
            change_url: format!("{CARS}{}/change/", c.id),
            cells: vec![c.model.clone(), c.manufacturer_display()],
        })
        .collect();

    let filter_url = |id: Option<i64>| {
        let id = id.map(|id| id.to_string());
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(term.map(|q| ("q", q)))
            .extend_pairs(id.as_deref().map(|id| ("manufacturer", id)))
            .finish();
        if query.is_empty() {
            CARS.to_string()
        } else {
            format!("{CARS}?{query}")
        }
    };

    let mut filters = vec![FilterChoice {
        label: "All".to_string(),
        url: filter_url(None),
        selected: manufacturer_id.is_none(),
    }];
    filters.extend(Manufacturer::all(state.pool()).await?.into_iter().map(|m| FilterChoice {
        label: m.name.clone(),
        url: filter_url(Some(m.id)),
        selected: manufacturer_id == Some(m.id),
    }));

    Ok(ChangeListPage {
        ctx: PageContext::new(staff, &session),
        title: "Cars",
        list_url: CARS,
        add_url: "/admin/cars/add/",
        q: query.q.clone(),
        columns: &["Model", "Manufacturer"],
        rows,
        filters,
        page,
    }
    .render_html())
}

async fn car_form_page(
    pool: &SqlitePool,
    ctx: PageContext,
    form: &CarForm,
    id: Option<i64>,
    errors: &ValidationErrors,
) -> Result<ChangeFormPage, TaxiError> {
    let (title, action) = match id {
        Some(id) => ("Change car".to_string(), format!("{CARS}{id}/change/")),
        None => ("Add car".to_string(), format!("{CARS}add/")),
    };
    let manufacturers = Manufacturer::all(pool).await?;
    let drivers = Driver::all(pool).await?;
    let form = form.render(&action, &ctx.csrf_token, errors, &manufacturers, &drivers);

    Ok(ChangeFormPage {
        ctx,
        title,
        form,
        list_url: CARS,
        delete_url: id.map(|id| format!("{CARS}{id}/delete/")),
    })
}

/// GET /admin/cars/add/
///
/// # Errors
///
/// Returns [`TaxiError`] if the choices cannot be loaded
pub async fn car_add_form(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
) -> Result<Response, TaxiError> {
    let errors = ValidationErrors::new();
    let ctx = PageContext::new(staff, &session);
    let page = car_form_page(state.pool(), ctx, &CarForm::default(), None, &errors).await?;
    Ok(page.respond(&errors))
}

/// POST /admin/cars/add/
///
/// # Errors
///
/// Returns [`TaxiError`] if the database fails
pub async fn car_add(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    data: FormData,
) -> Result<Response, TaxiError> {
    let mut form = CarForm::from_data(&data);
    let errors = match form.clean(state.pool()).await {
        Ok(input) => {
            let car = Car::create(state.pool(), &input).await?;
            tracing::info!(car_id = car.id, staff_id = staff.id, "car added from admin");
            return Ok(done(&session, format!("The car \"{car}\" was added successfully."), CARS));
        }
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Database(e)) => return Err(e.into()),
    };

    let ctx = PageContext::new(staff, &session);
    Ok(car_form_page(state.pool(), ctx, &form, None, &errors).await?.respond(&errors))
}

/// GET /admin/cars/{id}/change/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the car does not exist
pub async fn car_change_form(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let car = find_car(state.pool(), id).await?;
    let driver_ids = Car::driver_ids(state.pool(), id).await?;
    let errors = ValidationErrors::new();

    let ctx = PageContext::new(staff, &session);
    let form = CarForm::for_car(&car, &driver_ids);
    Ok(car_form_page(state.pool(), ctx, &form, Some(id), &errors).await?.respond(&errors))
}

/// POST /admin/cars/{id}/change/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the car does not exist
pub async fn car_change(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
    data: FormData,
) -> Result<Response, TaxiError> {
    find_car(state.pool(), id).await?;
    let mut form = CarForm::from_data(&data);

    let errors = match form.clean(state.pool()).await {
        Ok(input) => {
            let car = Car::update(state.pool(), id, &input)
                .await?
                .ok_or_else(|| TaxiError::not_found("car", id))?;
            tracing::info!(car_id = id, staff_id = staff.id, "car changed from admin");
            return Ok(done(&session, format!("The car \"{car}\" was changed successfully."), CARS));
        }
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Database(e)) => return Err(e.into()),
    };

    let ctx = PageContext::new(staff, &session);
    Ok(car_form_page(state.pool(), ctx, &form, Some(id), &errors).await?.respond(&errors))
}

/// GET /admin/cars/{id}/delete/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the car does not exist
pub async fn car_delete_form(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let car = find_car(state.pool(), id).await?;
    Ok(delete_page(PageContext::new(staff, &session), "car", car.to_string(), CARS, id))
}

/// POST /admin/cars/{id}/delete/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the car does not exist
pub async fn car_delete(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let car = find_car(state.pool(), id).await?;
    if !Car::delete(state.pool(), id).await? {
        return Err(TaxiError::not_found("car", id));
    }
    tracing::info!(car_id = id, staff_id = staff.id, "car deleted from admin");
    Ok(done(&session, format!("The car \"{car}\" was deleted successfully."), CARS))
}

// Manufacturers

const MANUFACTURERS: &str = "/admin/manufacturers/";

async fn find_manufacturer(pool: &SqlitePool, id: i64) -> Result<Manufacturer, TaxiError> {
    Manufacturer::find_by_id(pool, id)
        .await?
        .ok_or_else(|| TaxiError::not_found("manufacturer", id))
}

/// GET /admin/manufacturers/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] for a page past the end
pub async fn manufacturer_list(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Query(query): Query<ChangeListQuery>,
) -> Result<Response, TaxiError> {
    let term = query.term();
    let count = Manufacturer::count(state.pool(), term).await?;
    let page = admin_page(count, &query, None)?;
    let manufacturers =
        Manufacturer::search(state.pool(), term, page.limit(), page.offset()).await?;

    let rows = manufacturers
        .into_iter()
        .map(|m| Row {
            change_url: format!("{MANUFACTURERS}{}/change/", m.id),
            cells: vec![m.name.clone(), m.country.clone()],
        })
        .collect();

    Ok(ChangeListPage {
        ctx: PageContext::new(staff, &session),
        title: "Manufacturers",
        list_url: MANUFACTURERS,
        add_url: "/admin/manufacturers/add/",
        q: query.q.clone(),
        columns: &["Name", "Country"],
        rows,
        filters: Vec::new(),
        page,
    }
    .render_html())
}

fn manufacturer_form_page(
    ctx: PageContext,
    form: &ManufacturerForm,
    id: Option<i64>,
    errors: &ValidationErrors,
) -> ChangeFormPage {
    let (title, action) = match id {
        Some(id) => ("Change manufacturer".to_string(), format!("{MANUFACTURERS}{id}/change/")),
        None => ("Add manufacturer".to_string(), format!("{MANUFACTURERS}add/")),
    };
    let form = form.render(&action, &ctx.csrf_token, errors);
    ChangeFormPage {
        ctx,
        title,
        form,
        list_url: MANUFACTURERS,
        delete_url: id.map(|id| format!("{MANUFACTURERS}{id}/delete/")),
    }
}

/// GET /admin/manufacturers/add/
pub async fn manufacturer_add_form(StaffUser(staff): StaffUser, session: Session) -> Response {
    let errors = ValidationErrors::new();
    let ctx = PageContext::new(staff, &session);
    manufacturer_form_page(ctx, &ManufacturerForm::default(), None, &errors).respond(&errors)
}

/// POST /admin/manufacturers/add/
///
/// # Errors
///
/// Returns [`TaxiError`] if the database fails
pub async fn manufacturer_add(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Form(mut form): Form<ManufacturerForm>,
) -> Result<Response, TaxiError> {
    let errors = match form.clean(state.pool(), None).await {
        Ok(()) => {
            let manufacturer = Manufacturer::create(state.pool(), &form.name, &form.country).await?;
            tracing::info!(
                manufacturer_id = manufacturer.id,
                staff_id = staff.id,
                "manufacturer added from admin"
            );
            let message = format!("The manufacturer \"{manufacturer}\" was added successfully.");
            return Ok(done(&session, message, MANUFACTURERS));
        }
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Database(e)) => return Err(e.into()),
    };

    let ctx = PageContext::new(staff, &session);
    Ok(manufacturer_form_page(ctx, &form, None, &errors).respond(&errors))
}

/// GET /admin/manufacturers/{id}/change/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the manufacturer does not exist
pub async fn manufacturer_change_form(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let manufacturer = find_manufacturer(state.pool(), id).await?;
    let errors = ValidationErrors::new();
    let form = ManufacturerForm::for_manufacturer(&manufacturer);
    let ctx = PageContext::new(staff, &session);
    Ok(manufacturer_form_page(ctx, &form, Some(id), &errors).respond(&errors))
}

/// POST /admin/manufacturers/{id}/change/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the manufacturer does not exist
pub async fn manufacturer_change(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
    Form(mut form): Form<ManufacturerForm>,
) -> Result<Response, TaxiError> {
    find_manufacturer(state.pool(), id).await?;

    let errors = match form.clean(state.pool(), Some(id)).await {
        Ok(()) => {
            let manufacturer = Manufacturer::update(state.pool(), id, &form.name, &form.country)
                .await?
                .ok_or_else(|| TaxiError::not_found("manufacturer", id))?;
            tracing::info!(
                manufacturer_id = id,
                staff_id = staff.id,
                "manufacturer changed from admin"
            );
            let message = format!("The manufacturer \"{manufacturer}\" was changed successfully.");
            return Ok(done(&session, message, MANUFACTURERS));
        }
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Database(e)) => return Err(e.into()),
    };

    let ctx = PageContext::new(staff, &session);
    Ok(manufacturer_form_page(ctx, &form, Some(id), &errors).respond(&errors))
}

/// GET /admin/manufacturers/{id}/delete/
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the manufacturer does not exist
pub async fn manufacturer_delete_form(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let manufacturer = find_manufacturer(state.pool(), id).await?;
    let ctx = PageContext::new(staff, &session);
    Ok(delete_page(ctx, "manufacturer", manufacturer.to_string(), MANUFACTURERS, id))
}

/// POST /admin/manufacturers/{id}/delete/ - also removes its cars
///
/// # Errors
///
/// Returns [`TaxiError::NotFound`] if the manufacturer does not exist
pub async fn manufacturer_delete(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, TaxiError> {
    let manufacturer = find_manufacturer(state.pool(), id).await?;
    if !Manufacturer::delete(state.pool(), id).await? {
        return Err(TaxiError::not_found("manufacturer", id));
    }
    tracing::info!(manufacturer_id = id, staff_id = staff.id, "manufacturer deleted from admin");
    let message = format!("The manufacturer \"{manufacturer}\" was deleted successfully.");
    Ok(done(&session, message, MANUFACTURERS))
}

fn yes_no(value: bool) -> String {
    let label = if value { "Yes" } else { "No" };
    label.to_string()
}
