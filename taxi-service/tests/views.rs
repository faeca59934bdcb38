//! Fleet pages driven through the full router

mod common;

use axum::http::StatusCode;
use common::{assert_redirect, body_text, location, TestApp};
use taxi_service::models::{Car, Driver, Manufacturer};
use tower::ServiceExt;

#[tokio::test]
async fn test_protected_pages_redirect_anonymous_visitors() {
    let app = TestApp::new().await;
    let manufacturer = app.manufacturer("Toyota", "Japan").await;
    let car = app.car("Corolla", &manufacturer, &[]).await;

    for uri in [
        "/".to_string(),
        "/manufacturers/".to_string(),
        "/cars/".to_string(),
        "/drivers/".to_string(),
        format!("/manufacturers/{}/", manufacturer.id),
        format!("/cars/{}/", car.id),
        "/drivers/1/".to_string(),
    ] {
        let response = app.get(&uri, None).await;
        assert_ne!(response.status(), StatusCode::OK, "{uri} must not be public");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/accounts/login/?next="));
    }
}

#[tokio::test]
async fn test_redirect_keeps_path_and_query() {
    let app = TestApp::new().await;
    let response = app.get("/cars/?model=Golf", None).await;
    assert_redirect(&response, "/accounts/login/?next=%2Fcars%2F%3Fmodel%3DGolf");
}

#[tokio::test]
async fn test_home_page_counts_and_visits() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let manufacturer = app.manufacturer("Toyota", "Japan").await;
    app.car("Corolla", &manufacturer, &[&driver]).await;
    let cookie = app.login(&driver).await;

    let first = body_text(app.get("/", Some(&cookie)).await).await;
    assert!(first.contains("<strong>Cars:</strong> 1"));
    assert!(first.contains("<strong>Drivers:</strong> 1"));
    assert!(first.contains("<strong>Manufacturers:</strong> 1"));
    assert!(first.contains("visited this page 1 time."));

    let second = body_text(app.get("/", Some(&cookie)).await).await;
    assert!(second.contains("visited this page 2 times."));
}

#[tokio::test]
async fn test_manufacturer_list_paginates_by_five() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    for i in 0..7 {
        app.manufacturer(&format!("Maker {i}"), "Germany").await;
    }
    let cookie = app.login(&driver).await;

    let response = app.get("/manufacturers/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert_eq!(body.matches("Maker ").count(), 5);
    assert!(body.contains("Maker 4"));
    assert!(!body.contains("Maker 5"));
    assert!(body.contains(r#"name="name""#));
    assert!(body.contains("?page=2"));

    let body = body_text(app.get("/manufacturers/?page=2", Some(&cookie)).await).await;
    assert_eq!(body.matches("Maker ").count(), 2);
    assert!(body.contains("Maker 6"));
}

#[tokio::test]
async fn test_driver_list_paginates_by_five() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    for i in 0..6 {
        app.driver(&format!("driver{i}"), &format!("DRV1000{i}")).await;
    }
    let cookie = app.login(&driver).await;

    let response = app.get("/drivers/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert_eq!(body.matches(r#"<td><a href="/drivers/"#).count(), 5);
    assert!(body.contains("?page=2"));
    assert!(body.contains(r#"name="username""#));

    let body = body_text(app.get("/drivers/?page=2", Some(&cookie)).await).await;
    assert_eq!(body.matches(r#"<td><a href="/drivers/"#).count(), 2);
}

#[tokio::test]
async fn test_car_list_paginates_by_five() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let toyota = app.manufacturer("Toyota", "Japan").await;
    for i in 0..6 {
        app.car(&format!("Model {i}"), &toyota, &[]).await;
    }
    let cookie = app.login(&driver).await;

    let response = app.get("/cars/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert_eq!(body.matches("Model ").count(), 5);
    assert!(body.contains("?page=2"));
    assert!(body.contains(r#"name="model""#));

    let body = body_text(app.get("/cars/?page=2", Some(&cookie)).await).await;
    assert_eq!(body.matches("Model ").count(), 1);
}

#[tokio::test]
async fn test_page_past_the_end_is_not_found() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let cookie = app.login(&driver).await;

    let response = app.get("/drivers/?page=3", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_filters_and_keeps_term_in_links() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let toyota = app.manufacturer("Toyota", "Japan").await;
    let bmw = app.manufacturer("BMW", "Germany").await;
    for i in 0..6 {
        app.car(&format!("Corolla {i}"), &toyota, &[]).await;
    }
    app.car("X5", &bmw, &[]).await;
    let cookie = app.login(&driver).await;

    let body = body_text(app.get("/cars/?model=corolla", Some(&cookie)).await).await;
    assert!(!body.contains("X5"));
    assert_eq!(body.matches("Corolla ").count(), 5);
    assert!(body.contains("?page=2&amp;model=corolla"));
    assert!(body.contains(r#"value="corolla""#));

    let body = body_text(app.get("/manufacturers/?name=bm", Some(&cookie)).await).await;
    assert!(body.contains("BMW"));
    assert!(!body.contains("Toyota"));
}

#[tokio::test]
async fn test_overlong_search_shows_error_and_all_records() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    app.driver("bob", "XYZ54321").await;
    let cookie = app.login(&driver).await;

    let term = "a".repeat(256);
    let body = body_text(app.get(&format!("/drivers/?username={term}"), Some(&cookie)).await).await;
    assert!(body.contains("Ensure this value has at most 255 characters."));
    assert!(body.contains("alice"));
    assert!(body.contains("bob"));
}

#[tokio::test]
async fn test_live_search_returns_table_fragment() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    app.manufacturer("Toyota", "Japan").await;
    let cookie = app.login(&driver).await;

    let response = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .uri("/manufacturers/?name=toy")
                .header("HX-Request", "true")
                .header(axum::http::header::COOKIE, &cookie)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Toyota"));
    assert!(!body.contains("<html"));
}

#[tokio::test]
async fn test_create_manufacturer_persists_and_flashes() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let cookie = app.login(&driver).await;

    let response = app
        .post("/manufacturers/create/", "name=Skoda&country=Czechia", Some(&cookie))
        .await;
    assert_redirect(&response, "/manufacturers/");

    let stored = Manufacturer::find_by_name(app.state.pool(), "Skoda").await.unwrap().unwrap();
    assert_eq!(stored.country, "Czechia");

    let body = body_text(app.get("/manufacturers/", Some(&cookie)).await).await;
    assert!(body.contains("was created."));

    let body = body_text(app.get("/manufacturers/", Some(&cookie)).await).await;
    assert!(!body.contains("was created."));
}

#[tokio::test]
async fn test_duplicate_manufacturer_is_rejected() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    app.manufacturer("Skoda", "Czechia").await;
    let cookie = app.login(&driver).await;

    let response = app
        .post("/manufacturers/create/", "name=Skoda&country=Slovakia", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Manufacturer with this Name already exists."));
    assert_eq!(Manufacturer::count(app.state.pool(), None).await.unwrap(), 1);
}

#[tokio::test]
async fn test_manufacturer_detail_lists_cars() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let toyota = app.manufacturer("Toyota", "Japan").await;
    app.car("Corolla", &toyota, &[]).await;
    let cookie = app.login(&driver).await;

    let response = app.get(&format!("/manufacturers/{}/", toyota.id), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Corolla"));

    let response = app.get("/manufacturers/999/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_car_model_only() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let toyota = app.manufacturer("Toyota", "Japan").await;
    let car = app.car("Corolla", &toyota, &[&driver]).await;
    let cookie = app.login(&driver).await;

    let form = format!("model=Camry&manufacturer={}&drivers={}", toyota.id, driver.id);
    let response = app.post(&format!("/cars/{}/update/", car.id), &form, Some(&cookie)).await;
    assert_redirect(&response, "/cars/");

    let updated = Car::find_by_id(app.state.pool(), car.id).await.unwrap().unwrap();
    assert_eq!(updated.model, "Camry");
    assert_eq!(updated.manufacturer_id, toyota.id);
    assert_eq!(Car::driver_ids(app.state.pool(), car.id).await.unwrap(), vec![driver.id]);
}

#[tokio::test]
async fn test_create_car_with_several_drivers() {
    let app = TestApp::new().await;
    let alice = app.driver("alice", "ABC12345").await;
    let bob = app.driver("bob", "XYZ54321").await;
    let toyota = app.manufacturer("Toyota", "Japan").await;
    let cookie = app.login(&alice).await;

    let form = format!(
        "model=Prius&manufacturer={}&drivers={}&drivers={}",
        toyota.id, alice.id, bob.id
    );
    let response = app.post("/cars/create/", &form, Some(&cookie)).await;
    assert_redirect(&response, "/cars/");

    let cars = Car::for_manufacturer(app.state.pool(), toyota.id).await.unwrap();
    assert_eq!(cars.len(), 1);
    let mut drivers = Car::driver_ids(app.state.pool(), cars[0].id).await.unwrap();
    drivers.sort_unstable();
    assert_eq!(drivers, vec![alice.id, bob.id]);
}

#[tokio::test]
async fn test_car_with_unknown_manufacturer_is_rejected() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let cookie = app.login(&driver).await;

    let response = app.post("/cars/create/", "model=Ghost&manufacturer=42", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(Car::count(app.state.pool(), None, None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_toggle_assign_adds_then_removes() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let toyota = app.manufacturer("Toyota", "Japan").await;
    let car = app.car("Corolla", &toyota, &[]).await;
    let cookie = app.login(&driver).await;
    let detail = format!("/cars/{}/", car.id);
    let toggle = format!("/cars/{}/toggle-assign/", car.id);

    assert!(body_text(app.get(&detail, Some(&cookie)).await).await.contains("Assign me"));

    assert_redirect(&app.post(&toggle, "", Some(&cookie)).await, &detail);
    assert_eq!(Car::driver_ids(app.state.pool(), car.id).await.unwrap(), vec![driver.id]);
    assert!(body_text(app.get(&detail, Some(&cookie)).await).await.contains("Remove me"));

    assert_redirect(&app.post(&toggle, "", Some(&cookie)).await, &detail);
    assert!(Car::driver_ids(app.state.pool(), car.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_driver_validates_license() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let cookie = app.login(&driver).await;

    let form = "username=bob&password1=Unusual-pass-9&password2=Unusual-pass-9\
                &first_name=Bob&last_name=Brown&license_number=abc12345";
    let response = app.post("/drivers/create/", form, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("First 3 characters should be uppercase letters"));
    assert!(Driver::find_by_username(app.state.pool(), "bob").await.unwrap().is_none());

    let form = "username=bob&password1=Unusual-pass-9&password2=Unusual-pass-9\
                &first_name=Bob&last_name=Brown&license_number=BOB12345";
    let response = app.post("/drivers/create/", form, Some(&cookie)).await;
    assert_redirect(&response, "/drivers/");

    let bob = Driver::find_by_username(app.state.pool(), "bob").await.unwrap().unwrap();
    assert_eq!(bob.license(), "BOB12345");
    assert!(bob.check_password(app.state.hasher(), "Unusual-pass-9").unwrap());
}

#[tokio::test]
async fn test_update_driver_license() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let cookie = app.login(&driver).await;
    let uri = format!("/drivers/{}/update/", driver.id);

    let response = app.post(&uri, "license_number=ABC1234", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("License number should consist of 8 characters"));

    let response = app.post(&uri, "license_number=NEW54321", Some(&cookie)).await;
    assert_redirect(&response, "/drivers/");
    let stored = Driver::find_by_id(app.state.pool(), driver.id).await.unwrap().unwrap();
    assert_eq!(stored.license(), "NEW54321");
}

#[tokio::test]
async fn test_driver_detail_shows_cars() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let toyota = app.manufacturer("Toyota", "Japan").await;
    app.car("Corolla", &toyota, &[&driver]).await;
    let cookie = app.login(&driver).await;

    let body = body_text(app.get(&format!("/drivers/{}/", driver.id), Some(&cookie)).await).await;
    assert!(body.contains("ABC12345"));
    assert!(body.contains("Corolla"));
    assert!(body.contains("Toyota Japan"));
}

#[tokio::test]
async fn test_delete_pages_remove_records() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let other = app.driver("bob", "XYZ54321").await;
    let toyota = app.manufacturer("Toyota", "Japan").await;
    let bmw = app.manufacturer("BMW", "Germany").await;
    let car = app.car("Corolla", &toyota, &[&other]).await;
    let bmw_car = app.car("X5", &bmw, &[]).await;
    let cookie = app.login(&driver).await;

    let response = app.get(&format!("/cars/{}/delete/", car.id), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Are you sure"));

    assert_redirect(
        &app.post(&format!("/cars/{}/delete/", car.id), "", Some(&cookie)).await,
        "/cars/",
    );
    assert!(Car::find_by_id(app.state.pool(), car.id).await.unwrap().is_none());

    assert_redirect(
        &app.post(&format!("/drivers/{}/delete/", other.id), "", Some(&cookie)).await,
        "/drivers/",
    );
    assert!(Driver::find_by_id(app.state.pool(), other.id).await.unwrap().is_none());

    assert_redirect(
        &app.post(&format!("/manufacturers/{}/delete/", bmw.id), "", Some(&cookie)).await,
        "/manufacturers/",
    );
    assert!(Manufacturer::find_by_id(app.state.pool(), bmw.id).await.unwrap().is_none());
    assert!(Car::find_by_id(app.state.pool(), bmw_car.id).await.unwrap().is_none());

    let response = app.post("/cars/999/delete/", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_without_csrf_token_changes_nothing() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let bmw = app.manufacturer("BMW", "Germany").await;
    let cookie = app.login(&driver).await;
    let uri = format!("/manufacturers/{}/delete/", bmw.id);

    let response = app.post_without_token(&uri, "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.post_without_token(&uri, "csrf_token=forged", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_without_token("/manufacturers/create/", "name=Skoda&country=Czechia", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert!(Manufacturer::find_by_id(app.state.pool(), bmw.id).await.unwrap().is_some());
    assert_eq!(Manufacturer::all(app.state.pool()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_htmx_header_token_is_accepted() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let bmw = app.manufacturer("BMW", "Germany").await;
    let cookie = app.login(&driver).await;

    let response = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri(format!("/manufacturers/{}/delete/", bmw.id))
                .header("HX-Request", "true")
                .header("x-csrf-token", common::CSRF_TOKEN)
                .header(axum::http::header::COOKIE, &cookie)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::FORBIDDEN);
    assert!(Manufacturer::find_by_id(app.state.pool(), bmw.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_pages_render_session_csrf_token() {
    let app = TestApp::new().await;
    let driver = app.driver("alice", "ABC12345").await;
    let cookie = app.login(&driver).await;

    let body = body_text(app.get("/manufacturers/create/", Some(&cookie)).await).await;
    let field = format!(
        r#"<input type="hidden" name="csrf_token" value="{}">"#,
        common::CSRF_TOKEN
    );
    assert!(body.contains(&field));
    assert!(body.contains(&format!(r#""x-csrf-token": "{}""#, common::CSRF_TOKEN)));
}
