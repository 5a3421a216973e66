use actix_web::http::StatusCode;
use actix_web::middleware::from_fn;
use actix_web::{test, App};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskboard::auth::{AuthResponse, PasswordHasher};
use taskboard::config::JwtSettings;
use taskboard::correlation::correlation_id;
use taskboard::models::UserProfile;
use taskboard::notify::NotificationHub;
use taskboard::AppState;

fn test_state() -> AppState {
    let jwt = JwtSettings {
        secret: "integration-test-secret-0123456789".to_string(),
        issuer: JwtSettings::DEFAULT_ISSUER.to_string(),
        audience: JwtSettings::DEFAULT_AUDIENCE.to_string(),
        expiration_hours: 1,
    };
    AppState::in_memory(&jwt, PasswordHasher::new(4), NotificationHub::default())
}

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let state = test_state();
    let app = test::init_service(
        App::new()
            .wrap(from_fn(correlation_id))
            .configure(|cfg| state.configure(cfg)),
    )
    .await;

    let register_payload = json!({
        "email": "alice@example.com",
        "first_name": "Alice",
        "last_name": "Liddell",
        "password": "Password123!"
    });
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body_bytes = test::read_body(resp).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Registration failed. Body: {:?}",
        String::from_utf8_lossy(&body_bytes)
    );
    let registered: AuthResponse = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(registered.email, "alice@example.com");
    assert_eq!(
        state.tokens.validate(&registered.token).unwrap(),
        registered.user_id
    );

    // Registering the same email again fails.
    let req_conflict = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register_payload)
        .to_request();
    let resp_conflict = test::call_service(&app, req_conflict).await;
    assert_eq!(resp_conflict.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp_conflict).await;
    assert_eq!(body, json!({ "error": "Email already registered" }));

    let req_login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&json!({
            "email": "alice@example.com",
            "password": "Password123!"
        }))
        .to_request();
    let resp_login = test::call_service(&app, req_login).await;
    assert_eq!(resp_login.status(), StatusCode::OK);
    let login_response: AuthResponse = test::read_body_json(resp_login).await;
    assert_eq!(login_response.user_id, registered.user_id);
    assert!(!login_response.token.is_empty());

    // The token opens protected routes.
    let req_me = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", login_response.token)))
        .to_request();
    let resp_me = test::call_service(&app, req_me).await;
    assert_eq!(resp_me.status(), StatusCode::OK);
    let profile: UserProfile = test::read_body_json(resp_me).await;
    assert_eq!(profile.id, registered.user_id);
    assert_eq!(profile.first_name, "Alice");
    assert_eq!(profile.role, "User");
}

#[actix_rt::test]
async fn test_register_validation() {
    let state = test_state();
    let app = test::init_service(
        App::new()
            .wrap(from_fn(correlation_id))
            .configure(|cfg| state.configure(cfg)),
    )
    .await;

    let test_cases = vec![
        (
            json!({ "email": "invalid-email", "first_name": "Al", "last_name": "Ice", "password": "Password123!" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid email format",
        ),
        (
            json!({ "email": "v@example.com", "first_name": "Al", "last_name": "Ice", "password": "short" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "password too short",
        ),
        (
            json!({ "email": "v@example.com", "first_name": "Al", "last_name": "Ice", "password": "p".repeat(73) }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "password longer than bcrypt reads",
        ),
        (
            json!({ "email": "v@example.com", "first_name": "A", "last_name": "Ice", "password": "Password123!" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "first name too short",
        ),
        (
            json!({ "email": "v@example.com", "password": "Password123!" }),
            StatusCode::BAD_REQUEST,
            "missing names",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;

        assert_eq!(status, expected_status, "Test case failed: {}", description);
        assert!(
            body["error"].is_string(),
            "Error body missing for {}: {}",
            description,
            body
        );
    }
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let state = test_state();
    let app = test::init_service(
        App::new()
            .wrap(from_fn(correlation_id))
            .configure(|cfg| state.configure(cfg)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "email": "bob@example.com",
            "first_name": "Bob",
            "last_name": "Builder",
            "password": "Password123!"
        }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let mut bodies = Vec::new();
    for payload in [
        json!({ "email": "bob@example.com", "password": "WrongPassword123!" }),
        json!({ "email": "nobody@example.com", "password": "Password123!" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        bodies.push(body);
    }

    assert_eq!(bodies[0], json!({ "error": "Invalid credentials" }));
    assert_eq!(bodies[0], bodies[1]);
}

#[actix_rt::test]
async fn test_protected_routes_require_a_valid_token() {
    let state = test_state();
    let app = test::init_service(
        App::new()
            .wrap(from_fn(correlation_id))
            .configure(|cfg| state.configure(cfg)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key("x-correlation-id"));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Missing token" }));

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("Authorization", "Bearer invalid.jwt.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_profile_update() {
    let state = test_state();
    let app = test::init_service(
        App::new()
            .wrap(from_fn(correlation_id))
            .configure(|cfg| state.configure(cfg)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "email": "carol@example.com",
            "first_name": "Carol",
            "last_name": "Danvers",
            "password": "Password123!"
        }))
        .to_request();
    let registered: AuthResponse = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::put()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", registered.token)))
        .set_json(&json!({ "first_name": "Caroline", "last_name": "Danvers" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: UserProfile = test::read_body_json(resp).await;
    assert_eq!(profile.first_name, "Caroline");
    assert_eq!(profile.email, "carol@example.com");

    let req = test::TestRequest::put()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", registered.token)))
        .set_json(&json!({ "first_name": "C", "last_name": "Danvers" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
