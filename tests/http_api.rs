//! HTTP-level checks of the JSON API: session resolution through the
//! middleware, auth gating, and error rendering.
//!
//! Ignored by default; set `DATABASE_URL` and run `cargo test -- --ignored`.

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use gatherly::dto::SignupDto;
use gatherly::{service, PGPool};
use uuid::Uuid;

async fn pool() -> PGPool {
    let db_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must point at a scratch database for integration tests");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .expect("failed to connect to postgres");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");
    pool
}

async fn signup_token(pool: &PGPool, name: &str) -> String {
    let email = format!("{}-{}@example.com", name, Uuid::new_v4());
    service::auth::signup(
        pool,
        SignupDto {
            name: name.to_string(),
            email,
            password: "correct horse".to_string(),
            password_confirm: "correct horse".to_string(),
        },
    )
    .await
    .expect("signup failed")
    .token
}

macro_rules! app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .wrap(service::auth::SessionMiddleware {
                    db_pool: $pool.clone(),
                })
                .configure(gatherly::routes),
        )
        .await
    };
}

#[actix_web::test]
#[ignore = "requires a running postgres (DATABASE_URL)"]
async fn protected_routes_reject_anonymous_callers() {
    let pool = pool().await;
    let app = app!(pool);

    for uri in ["/api/events/mine", "/api/rsvps/mine", "/api/users"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[actix_web::test]
#[ignore = "requires a running postgres (DATABASE_URL)"]
async fn bearer_tokens_authenticate_api_calls() {
    let pool = pool().await;
    let token = signup_token(&pool, "ada").await;
    let app = app!(pool);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/events/mine")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
#[ignore = "requires a running postgres (DATABASE_URL)"]
async fn event_lifecycle_over_http() {
    let pool = pool().await;
    let organizer = signup_token(&pool, "organizer").await;
    let attendee = signup_token(&pool, "attendee").await;
    let app = app!(pool);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/events")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", organizer)))
            .set_json(serde_json::json!({
                "name": "Rust meetup",
                "location": "Berlin",
                "date": "2026-09-01",
                "capacity": 1
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let event: serde_json::Value = test::read_body_json(resp).await;
    let event_id = event["id"].as_str().expect("event id").to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/events/{}/rsvps", event_id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", attendee)))
            .set_json(serde_json::json!({ "status": "attending" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // a second attendee hits the capacity gate
    let late = signup_token(&pool, "late").await;
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/events/{}/rsvps", event_id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", late)))
            .set_json(serde_json::json!({ "status": "attending" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "event is at full capacity");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/events/{}/rsvps", event_id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let rsvps: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(rsvps.as_array().expect("rsvp list").len(), 1);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/events/{}", Uuid::new_v4()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
