mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use common::{Fixture, PASSWORD};
use registrar_server::api::{self, AppState};
use registrar_server::config::RegistrarConfig;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let fixture = Fixture::new().await;
    let config = RegistrarConfig::default();
    let state = AppState::with_hasher(fixture.db.clone(), &config, fixture.hasher.clone())
        .expect("state should build");
    api::router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request should complete");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request should build")
}

fn send_json(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        send_json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"]
        .as_str()
        .expect("token should be a string")
        .to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app().await;

    let (status, body) = send(&app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_login_with_bad_credentials_is_unauthorized() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(send_json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "cse001@college.edu", "password": "nope" }),
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).map(|v| v.as_bytes()),
        Some(&b"Bearer"[..])
    );
}

#[tokio::test]
async fn test_login_returns_role_and_token() {
    let app = app().await;

    let (status, body) = send(
        &app,
        send_json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "fac_01@college.edu", "password": PASSWORD }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "faculty");
    assert_eq!(body["user_id"], "fac_01");
    assert_eq!(body["token_type"], "bearer");
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthorized() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/student/profile/CSE001", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthenticated");

    let (status, _) = send(&app, get("/api/student/profile/CSE001", Some("not.a.jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_students_only_see_themselves() {
    let app = app().await;
    let token = login(&app, "cse001@college.edu").await;

    let (status, body) = send(&app, get("/api/student/profile/CSE001", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["year"], "UG-1");
    assert_eq!(body["dept"], "CSE");
    assert!(body.get("password_hash").is_none());

    let (status, body) = send(&app, get("/api/student/enrolled/CSE002", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, _) = send(&app, get("/api/admin/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, get("/api/course/A_CSE/students", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_enroll_through_the_api() {
    let app = app().await;
    let token = login(&app, "cse001@college.edu").await;
    let selection = |codes: &[&str]| {
        codes
            .iter()
            .map(|code| json!({ "course_id": format!("{code}_CSE"), "faculty_id": "fac_01" }))
            .collect::<Vec<_>>()
    };

    let (status, body) = send(
        &app,
        send_json(
            Method::POST,
            "/api/student/enroll",
            Some(&token),
            json!({ "student_id": "CSE001", "selected_courses": selection(&["A", "B", "C", "D", "E"]) }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
    assert_eq!(body["message"], "minimum 20 credits required, selected 19");

    let (status, body) = send(
        &app,
        send_json(
            Method::POST,
            "/api/student/enroll",
            Some(&token),
            json!({
                "student_id": "CSE001",
                "selected_courses": selection(&["A", "B", "C", "D", "E", "F"])
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Enrolled successfully");
    assert_eq!(body["total_credits"], 20);

    let (status, body) = send(&app, get("/api/student/enrolled/CSE001", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(6));

    let (status, _) = send(
        &app,
        send_json(
            Method::POST,
            "/api/student/enroll",
            Some(&token),
            json!({ "student_id": "CSE002", "selected_courses": selection(&["A"]) }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_faculty_views() {
    let app = app().await;
    let token = login(&app, "fac_02@college.edu").await;

    let (status, body) = send(&app, get("/api/faculty/courses/fac_02", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "A_CSE");

    let (status, body) = send(&app, get("/api/faculty/backlogs/fac_02", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = send(&app, get("/api/course/A_CSE/students", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/api/faculty/profile/fac_01", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_endpoints() {
    let app = app().await;
    let token = login(&app, "admin_01@college.edu").await;

    let (status, body) = send(&app, get("/api/admin/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_students"], 2);
    assert_eq!(body["capacity_percentage"], 0.0);

    let (status, body) = send(&app, get("/api/admin/degrees?type=UG", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["type"], "UG");

    let (status, _) = send(&app, get("/api/admin/degrees?type=XX", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        send(&app, get("/api/admin/degree/deg_ug_cse/history", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["avg_gpa"], 0.0);

    let (status, _) = send(&app, get("/api/admin/degree/deg_none/courses", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        send_json(
            Method::POST,
            "/api/admin/allocate",
            Some(&token),
            json!({ "faculty_id": "fac_02", "course_id": "B_CSE" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Allocation successful");
    assert_eq!(body["created"], true);

    let remove = |uri: &str| {
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request should build")
    };
    let (status, body) = send(&app, remove("/api/admin/allocate/fac_02/B_CSE")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Allocation removed");

    let (status, body) = send(&app, remove("/api/admin/allocate/fac_02/B_CSE")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}
